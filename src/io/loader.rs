//! Reads scenario tables from a directory.
//!
//! Both tables are comma-separated with a header row. Blank lines and lines
//! starting with `#` are skipped.
//!
//! ```text
//! # platforms.csv               # paths.csv
//! platform_id,capacity,kind     robot_id,path,kind
//! 1,2,A                         1,1 2,organizer
//! 2,1,B                         2,1,mover
//! ```
//!
//! An optional `dwell.csv` maps (robot kind, platform kind) to a dwell time:
//!
//! ```text
//! robot_kind,platform_kind,ticks
//! organizer,A,30
//! mover,B,35
//! ```

use crate::core::builder::simulation_builder::{PlatformSpec, RobotSpec, Simulation};
use crate::core::execution::config::DwellPolicy;
use crate::core::types::{Kind, Tick};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const PLATFORMS_FILE: &str = "platforms.csv";
pub const PATHS_FILE: &str = "paths.csv";
pub const DWELL_FILE: &str = "dwell.csv";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{} is empty, expected a header row", .path.display())]
    Empty { path: PathBuf },
}

/// Load `platforms.csv` and `paths.csv` from `dir`.
pub fn load_dir(dir: &Path) -> Result<Simulation, LoadError> {
    let platforms_path = dir.join(PLATFORMS_FILE);
    let paths_path = dir.join(PATHS_FILE);

    let platforms = parse_platforms(&read(&platforms_path)?, &platforms_path)?;
    let robots = parse_paths(&read(&paths_path)?, &paths_path)?;
    info!(
        "Loaded {} platforms and {} robots from {}",
        platforms.len(),
        robots.len(),
        dir.display()
    );

    let mut sim = Simulation::new();
    for platform in platforms {
        sim.add_platform(platform);
    }
    for robot in robots {
        sim.add_robot(robot);
    }
    Ok(sim)
}

/// Parse the platform table: `platform_id,capacity[,kind]`.
pub fn parse_platforms(text: &str, source: &Path) -> Result<Vec<PlatformSpec>, LoadError> {
    let mut platforms = Vec::new();
    for row in data_rows(text, source)? {
        let id = row.parse_field(0, "platform_id")?;
        let capacity = row.parse_field(1, "capacity")?;
        let mut spec = PlatformSpec::new(id, capacity);
        spec.kind = row.kind(2);
        platforms.push(spec);
    }
    debug!("Parsed {} platform rows from {}", platforms.len(), source.display());
    Ok(platforms)
}

/// Parse the path table: `robot_id,path[,kind]`, path ids separated by spaces or `;`.
pub fn parse_paths(text: &str, source: &Path) -> Result<Vec<RobotSpec>, LoadError> {
    let mut robots = Vec::new();
    for row in data_rows(text, source)? {
        let id = row.parse_field(0, "robot_id")?;
        let path = row
            .field(1, "path")?
            .split(|c: char| c.is_whitespace() || c == ';')
            .filter(|step| !step.is_empty())
            .map(|step| row.parse_value(step, "path"))
            .collect::<Result<Vec<u64>, _>>()?;
        let mut spec = RobotSpec::new(id, path);
        spec.kind = row.kind(2);
        robots.push(spec);
    }
    debug!("Parsed {} robot rows from {}", robots.len(), source.display());
    Ok(robots)
}

/// Parse the dwell table: `robot_kind,platform_kind,ticks`.
///
/// Pairs missing from the table dwell for `default` ticks. Zero ticks are
/// left for [`DwellPolicy::validate`] to reject.
pub fn parse_dwell_table(text: &str, source: &Path, default: Tick) -> Result<DwellPolicy, LoadError> {
    let mut policy = DwellPolicy::by_kind(default);
    let mut entries = 0;
    for row in data_rows(text, source)? {
        let robot = row.required_kind(0, "robot_kind")?;
        let platform = row.required_kind(1, "platform_kind")?;
        let ticks: Tick = row.parse_field(2, "ticks")?;
        policy = policy.with_entry(robot, platform, ticks);
        entries += 1;
    }
    debug!("Parsed {} dwell entries from {}", entries, source.display());
    Ok(policy)
}

/// Load a dwell table file, see [`parse_dwell_table`].
pub fn load_dwell_table(path: &Path, default: Tick) -> Result<DwellPolicy, LoadError> {
    let policy = parse_dwell_table(&read(path)?, path, default)?;
    info!("Loaded dwell table from {}", path.display());
    Ok(policy)
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

struct Row<'a> {
    source: &'a Path,
    line: usize,
    fields: Vec<&'a str>,
}

impl<'a> Row<'a> {
    fn error(&self, message: String) -> LoadError {
        LoadError::Parse {
            path: self.source.to_path_buf(),
            line: self.line,
            message,
        }
    }

    fn field(&self, index: usize, name: &str) -> Result<&'a str, LoadError> {
        self.fields
            .get(index)
            .copied()
            .ok_or_else(|| self.error(format!("missing column '{}'", name)))
    }

    fn parse_value<T: FromStr>(&self, value: &str, name: &str) -> Result<T, LoadError> {
        value
            .parse()
            .map_err(|_| self.error(format!("invalid {} '{}'", name, value)))
    }

    fn parse_field<T: FromStr>(&self, index: usize, name: &str) -> Result<T, LoadError> {
        let value = self.field(index, name)?;
        self.parse_value(value, name)
    }

    fn required_kind(&self, index: usize, name: &str) -> Result<Kind, LoadError> {
        match self.field(index, name)? {
            "" => Err(self.error(format!("empty column '{}'", name))),
            value => Ok(Kind::new(value)),
        }
    }

    /// Optional trailing label column; empty means no kind.
    fn kind(&self, index: usize) -> Option<Kind> {
        self.fields
            .get(index)
            .filter(|value| !value.is_empty())
            .map(|value| Kind::new(*value))
    }
}

/// Rows after the header, with 1-based line numbers.
fn data_rows<'a>(text: &'a str, source: &'a Path) -> Result<Vec<Row<'a>>, LoadError> {
    let mut rows = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, content)| Row {
            source,
            line,
            fields: content.split(',').map(str::trim).collect(),
        });

    if rows.next().is_none() {
        return Err(LoadError::Empty {
            path: source.to_path_buf(),
        });
    }
    Ok(rows.collect())
}

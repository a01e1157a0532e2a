//! Renders a finished [`SimulationReport`] to output tables.

use crate::core::report::SimulationReport;
use log::info;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ROBOT_INFO_FILE: &str = "robot_info.csv";
pub const PLATFORM_INFO_FILE: &str = "platform_info.csv";
pub const PLATFORM_VISITORS_FILE: &str = "platform_visitors.csv";

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("refusing to write tables for an unfinished run")]
    Incomplete,

    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `robot_id,total_time`, one row per robot.
pub fn render_robot_info(report: &SimulationReport) -> String {
    let mut out = String::from("robot_id,total_time\n");
    for robot in &report.robots {
        out.push_str(&format!("{},{}\n", robot.robot_id, robot.total_time));
    }
    out
}

/// `platform_id,visit_count`, one row per platform.
pub fn render_platform_info(report: &SimulationReport) -> String {
    let mut out = String::from("platform_id,visit_count\n");
    for platform in &report.platforms {
        out.push_str(&format!("{},{}\n", platform.platform_id, platform.visit_count));
    }
    out
}

/// `platform_id,visitors`, visitors in admission order separated by spaces.
pub fn render_platform_visitors(report: &SimulationReport) -> String {
    let mut out = String::from("platform_id,visitors\n");
    for platform in &report.platforms {
        let visitors: Vec<String> = platform.visitors.iter().map(ToString::to_string).collect();
        out.push_str(&format!("{},{}\n", platform.platform_id, visitors.join(" ")));
    }
    out
}

/// Console lines, one per robot.
pub fn summary_lines(report: &SimulationReport) -> Vec<String> {
    report
        .robots
        .iter()
        .map(|robot| {
            let suffix = if robot.completed { "" } else { " (incomplete)" };
            format!("Robot {} total time: {}{}", robot.robot_id, robot.total_time, suffix)
        })
        .collect()
}

/// Write all output tables into `dir`, creating it if needed.
///
/// Only complete runs are written; a deadlocked or truncated run yields
/// [`WriteError::Incomplete`] and touches nothing.
pub fn write_report(report: &SimulationReport, dir: &Path) -> Result<Vec<PathBuf>, WriteError> {
    if !report.is_complete() {
        return Err(WriteError::Incomplete);
    }
    std::fs::create_dir_all(dir).map_err(|source| WriteError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let tables = [
        (ROBOT_INFO_FILE, render_robot_info(report)),
        (PLATFORM_INFO_FILE, render_platform_info(report)),
        (PLATFORM_VISITORS_FILE, render_platform_visitors(report)),
    ];
    let mut written = Vec::with_capacity(tables.len());
    for (name, contents) in tables {
        let path = dir.join(name);
        std::fs::write(&path, contents).map_err(|source| WriteError::Io {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }
    info!("Wrote {} tables to {}", written.len(), dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::{Outcome, PlatformResult, RobotResult};

    fn report(outcome: Outcome) -> SimulationReport {
        SimulationReport {
            outcome: Some(outcome),
            final_tick: 3,
            robots: vec![
                RobotResult { robot_id: 1, total_time: 3, completed: true },
                RobotResult { robot_id: 2, total_time: 2, completed: true },
            ],
            platforms: vec![
                PlatformResult { platform_id: 1, visit_count: 2, visitors: vec![1, 2] },
                PlatformResult { platform_id: 2, visit_count: 1, visitors: vec![1] },
            ],
        }
    }

    #[test]
    fn test_render_tables() {
        let report = report(Outcome::AllDone);
        assert_eq!(render_robot_info(&report), "robot_id,total_time\n1,3\n2,2\n");
        assert_eq!(render_platform_info(&report), "platform_id,visit_count\n1,2\n2,1\n");
        assert_eq!(render_platform_visitors(&report), "platform_id,visitors\n1,1 2\n2,1\n");
    }

    #[test]
    fn test_summary_flags_incomplete_robots() {
        let mut report = report(Outcome::TickLimitReached);
        report.robots[1].completed = false;
        assert_eq!(
            summary_lines(&report),
            vec!["Robot 1 total time: 3", "Robot 2 total time: 2 (incomplete)"]
        );
    }

    #[test]
    fn test_incomplete_report_is_not_written() {
        let dir = std::env::temp_dir().join(format!("platform-sim-writer-{}", std::process::id()));
        let report = report(Outcome::Deadlock { blocked: vec![] });
        assert!(matches!(write_report(&report, &dir), Err(WriteError::Incomplete)));
        assert!(!dir.join(ROBOT_INFO_FILE).exists());
    }

    #[test]
    fn test_write_report_creates_files() {
        let dir = std::env::temp_dir().join(format!("platform-sim-writer-ok-{}", std::process::id()));
        let written = write_report(&report(Outcome::AllDone), &dir).unwrap();
        assert_eq!(written.len(), 3);
        let robot_info = std::fs::read_to_string(dir.join(ROBOT_INFO_FILE)).unwrap();
        assert_eq!(robot_info, "robot_id,total_time\n1,3\n2,2\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}

//! Platform scheduler simulation CLI.
//!
//! Loads a scenario from a directory, runs it to completion and writes the
//! output tables.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use platform_sim::core::execution::{ConcurrencyMode, DwellPolicy, SchedulerConfig};
use platform_sim::io::{load_dir, load_dwell_table, summary_lines, write_report, DWELL_FILE};
use platform_sim::{SimError, Tick};

#[derive(Parser)]
#[command(name = "platform-sim")]
#[command(about = "Robots walking fixed paths over capacity-bounded platforms")]
struct Cli {
    /// Directory holding platforms.csv, paths.csv and an optional dwell.csv
    #[arg(default_value = "input_data")]
    input_dir: PathBuf,

    /// Directory the output tables are written to, created if missing
    #[arg(default_value = "output_data")]
    output_dir: PathBuf,

    /// Ticks spent on each platform; the fallback for pairs missing from the dwell table
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
    dwell: Tick,

    /// Dwell table (robot_kind,platform_kind,ticks), overriding INPUT_DIR/dwell.csv
    #[arg(long)]
    dwell_table: Option<PathBuf>,

    /// Stop with an error after this many ticks
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    max_ticks: Option<Tick>,

    /// Prepare robots on the rayon thread pool
    #[arg(long)]
    parallel: bool,

    /// Rayon worker threads, only used with --parallel
    #[arg(long, requires = "parallel", value_parser = clap::value_parser!(u64).range(1..))]
    threads: Option<u64>,
}

impl Cli {
    /// The dwell table in effect: the flag, else `dwell.csv` beside the inputs.
    fn dwell_table_path(&self) -> Option<PathBuf> {
        self.dwell_table.clone().or_else(|| {
            let path = self.input_dir.join(DWELL_FILE);
            path.is_file().then_some(path)
        })
    }

    fn scheduler_config(&self) -> Result<SchedulerConfig, Box<dyn std::error::Error>> {
        let dwell = match self.dwell_table_path() {
            Some(path) => load_dwell_table(&path, self.dwell)?,
            None => DwellPolicy::Uniform(self.dwell),
        };

        let mut config = SchedulerConfig::new().with_dwell(dwell);
        if let Some(max_ticks) = self.max_ticks {
            config = config.with_max_ticks(max_ticks);
        }
        if self.parallel {
            config = config.with_concurrency(ConcurrencyMode::Rayon);
        }
        if let Some(threads) = self.threads {
            config = config.with_thread_pool_size(usize::try_from(threads)?);
        }
        Ok(config)
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let simulation = load_dir(&cli.input_dir)?;
    let mut scheduler = simulation.build(cli.scheduler_config()?)?;

    if let Err(err) = scheduler.run() {
        if let SimError::Deadlock { blocked, .. } = &err {
            eprintln!("Deadlock: {} robots blocked", blocked.len());
            for entry in blocked {
                eprintln!("  {entry}");
            }
        }
        for line in summary_lines(&scheduler.report()) {
            eprintln!("{line}");
        }
        return Err(err.into());
    }

    let report = scheduler.report();
    write_report(&report, &cli.output_dir)?;
    for line in summary_lines(&report) {
        println!("{line}");
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

//! Fieldmesh Case Study Runner
//!
//! Run the diameter case study and print one JSON summary line per log
//! period on stdout. Logs go to stderr (`RUST_LOG` overrides the `info`
//! default).
//!
//! ```text
//! fieldmesh-sim [CONFIG.json] [--devices N] [--end T]
//! ```

use std::env;
use std::io::Write;

use fieldmesh_sim::{case_study, Error, SimulationConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Parse command line args
    let mut config_path = None;
    let mut devices = None;
    let mut end = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--devices" {
            devices = Some(value(&arg, args.next())?);
        } else if arg == "--end" {
            end = Some(value(&arg, args.next())?);
        } else if config_path.is_none() && !arg.starts_with("--") {
            config_path = Some(arg);
        } else {
            return Err(Error::InvalidConfig(format!("unexpected argument: {arg}")).into());
        }
    }

    let mut config = match config_path {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(count) = devices {
        config = config.with_device_count(count);
    }
    if let Some(end) = end {
        config = config.with_end_time(end);
    }
    config.validate()?;

    info!(
        devices = config.device_count,
        end = config.end_time,
        discard = config.discard_threshold(),
        "running diameter case study"
    );

    let mut sim = case_study::simulation(config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut failure = None;
    sim.run(&case_study::SLOTS, |row| {
        if failure.is_some() {
            return;
        }
        let written = serde_json::to_string(row)
            .map_err(Error::from)
            .and_then(|line| writeln!(out, "{line}").map_err(Error::from));
        if let Err(e) = written {
            failure = Some(e);
        }
    });
    if let Some(e) = failure {
        return Err(e.into());
    }

    info!(rounds = sim.total_rounds(), running = sim.running_count(), "done");
    Ok(())
}

/// Parse the value following a flag.
fn value<T: std::str::FromStr>(flag: &str, raw: Option<String>) -> Result<T, Error> {
    raw.as_deref()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::InvalidConfig(format!("{flag} needs a numeric value")))
}

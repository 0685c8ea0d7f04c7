use crate::error::{CliError, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    fmt,
    prelude::*,
};

/// Both the library and the binary log under this prefix.
const APP_TARGET: &str = "pymolfold";
/// Submission and poll events of NVIDIA Cloud Functions jobs.
const NVCF_TARGET: &str = "pymolfold::engine::nvcf";
/// Extra `target=level` directives appended after the flag-derived ones.
pub const LOG_ENV: &str = "PYMOLFOLD_LOG";

/// `-q` keeps errors; each `-v` lowers the threshold by one level.
fn app_level(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Per-target levels for one output.
///
/// Accepted task ids are logged at INFO even without `-v`, since a Boltz2 job
/// can outlive the terminal session. HTTP and TLS crates stay at WARN until `-vvv`.
fn targets(verbosity: u8, quiet: bool, overrides: Option<&str>) -> Result<Targets> {
    let app = app_level(verbosity, quiet);
    let nvcf = if quiet { app } else { app.max(LevelFilter::INFO) };
    let dependencies = match (quiet, verbosity) {
        (true, _) => LevelFilter::ERROR,
        (false, 0..=2) => LevelFilter::WARN,
        (false, _) => LevelFilter::DEBUG,
    };

    let mut targets = Targets::new()
        .with_default(dependencies)
        .with_target(APP_TARGET, app)
        .with_target(NVCF_TARGET, nvcf);

    if let Some(directives) = overrides.map(str::trim).filter(|s| !s.is_empty()) {
        let extra: Targets = directives.parse().map_err(|e| {
            CliError::Config(format!("Invalid {} value '{}': {}", LOG_ENV, directives, e))
        })?;
        targets = targets.with_targets(extra);
    }
    Ok(targets)
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let overrides = std::env::var(LOG_ENV).ok();
    let console_filter = targets(verbosity, quiet, overrides.as_deref())?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(console_filter);

    // The log file records at least INFO so it stays useful after a quiet run.
    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(&path).map_err(CliError::Io)?;
            let file_filter = targets(verbosity.max(1), false, overrides.as_deref())?;
            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_filter(file_filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}

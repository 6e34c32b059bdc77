//! Logging setup built on `tracing-subscriber`.
//!
//! `RUST_LOG` wins when set. Otherwise verbosity flags pick the level:
//! default `warn`, `-v` info, `-vv` debug, `-vvv` trace, `--quiet` error.
//! Logs go to stderr so stdout stays clean for JSON output. With a log file
//! the records are written as JSON lines instead.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Map CLI verbosity flags to a filter directive.
#[must_use]
pub const fn level_for(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize the global subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a global
/// subscriber is already installed.
pub fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbose, quiet)));

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(Mutex::new(file)))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .without_time(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Install a test-friendly subscriber; later calls are no-ops.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_test_writer()
        .try_init();
}

// src/logging.rs

//! Logging setup: `tracing-subscriber` `fmt` with an `EnvFilter`.
//!
//! The filter is chosen from, in order: the `--log-level` CLI flag, the
//! `GANTRY_LOG` environment variable (full `EnvFilter` directive syntax, so
//! per-target levels like `gantry::exec=debug` work), then `info`.
//!
//! Logs go to stderr; stdout belongs to task output.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

const LOG_ENV_VAR: &str = "GANTRY_LOG";

/// Initialise the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        // An explicit CLI level overrides whatever GANTRY_LOG says.
        Some(level) => EnvFilter::new(directive(level)),
        None => EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(directive(LogLevel::Info))),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

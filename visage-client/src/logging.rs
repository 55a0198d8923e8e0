//! Logging bootstrap for embedding applications
//!
//! The engine itself only emits `tracing` events; installing a subscriber
//! is the host application's call. This helper wires up the usual one:
//! fmt output to stderr or a file, filtered by `RUST_LOG` when set and the
//! configured level otherwise.

use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use visage_common::{Error, Result};

use crate::config::LoggingConfig;

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes priority over the configured level. Returns
/// `Error::Config` if the level string is invalid, the log file cannot be
/// opened, or a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::Config(format!("Invalid log level '{}': {}", config.level, e)))?;

    match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    Error::Config(format!("Failed to open log file {:?}: {}", path, e))
                })?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e))),
    }
}

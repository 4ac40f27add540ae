//! Logging setup
//!
//! Installs a `tracing` subscriber with:
//! - a human-readable stderr layer
//! - an optional JSON file layer, rolled daily under `<data_dir>/logs`
//! - the `log` bridge, so `log::` records from the CLI and dependencies show up too
//!
//! The filter comes from `RUST_LOG` and falls back to the configured level.

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

const LOG_FILE_NAME: &str = "charforge.log";

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Initialize logging.
///
/// Returns a `WorkerGuard` when file logging is enabled; keep it alive for
/// the life of the program so buffered lines are flushed on exit.
pub fn init(config: &LoggingConfig, data_dir: &Path) -> Option<WorkerGuard> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(env_filter(config));

    let (file_layer, guard) = if config.file {
        let log_dir = data_dir.join("logs");
        if let Err(e) = fs::create_dir_all(&log_dir) {
            eprintln!("Failed to create logs directory: {}", e);
        }
        let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // JSON for easy parsing/ingestion
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .json()
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_filter(env_filter(config));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Logging already initialized: {}", e);
        return guard;
    }

    // Redirect `log` macros to tracing
    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::trace!(error = %e, "log bridge already installed");
    }

    tracing::debug!(level = %config.level, file = config.file, "Logging initialized");
    guard
}

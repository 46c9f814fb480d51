//! Log setup. The terminal belongs to the UI, so events go to a file
//! through a non-blocking writer.
//!
//! Call [`init`] once in `main` and keep the returned guard alive until exit.

use std::fs::{self, OpenOptions};
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::error::{AppError, Result};

/// Flushes buffered log lines when dropped.
#[allow(dead_code)]
pub struct LogGuard(WorkerGuard);

/// Build the filter: `RUST_LOG` wins over the configured directive.
pub fn filter_for(level: &str) -> EnvFilter {
    match std::env::var("RUST_LOG") {
        Ok(val) if !val.trim().is_empty() => EnvFilter::new(val),
        _ => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

/// Install the global subscriber writing plain lines to `file`.
pub fn init(level: &str, file: &Path) -> Result<LogGuard> {
    if let Some(dir) = file.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::Logging(format!("failed to create log directory {}: {e}", dir.display()))
        })?;
    }
    let sink = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .map_err(|e| AppError::Logging(format!("failed to open {}: {e}", file.display())))?;
    let (writer, guard) = tracing_appender::non_blocking(sink);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter_for(level))
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))?;

    Ok(LogGuard(guard))
}

/// Subscriber for the one-shot subcommands: stderr, so stdout stays clean.
pub fn init_stderr(level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(filter_for(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_directive_falls_back_to_info() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let filter = filter_for("[[not a filter");
        assert_eq!(filter.to_string(), "info");
    }
}

//! Logging setup.
//!
//! Logs go to stderr and, when a directory is configured, to a log file
//! written by a background worker. `RUST_LOG` overrides the configured level.

use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Name of the log file inside the configured directory.
pub const LOG_FILE_NAME: &str = "nbmdeploy.log";

pub type LoggingResult<T> = Result<T, LoggingError>;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log level '{level}': {reason}")]
    InvalidFilter { level: String, reason: String },

    #[error("failed to create log directory {}: {source}", path.display())]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to install logger: {0}")]
    InitFailed(String),
}

/// Keeps the file writer alive; drop it only at the end of the run.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Local RFC 3339 timestamps. The offset comes from chrono, which also works
/// once the file writer thread is running.
fn timer() -> ChronoLocal {
    ChronoLocal::rfc_3339()
}

/// Filter from `RUST_LOG`, falling back to `default_level`.
pub fn build_filter(default_level: &str) -> LoggingResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_level).map_err(|e| LoggingError::InvalidFilter {
            level: default_level.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Install the global subscriber.
pub fn init(config: &LoggingConfig) -> LoggingResult<LoggingGuard> {
    let filter = build_filter(&config.level)?;
    let console = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_timer(timer());

    let Some(directory) = &config.directory else {
        tracing_subscriber::registry()
            .with(filter)
            .with(console)
            .try_init()
            .map_err(|e| LoggingError::InitFailed(e.to_string()))?;
        return Ok(LoggingGuard { _file: None });
    };

    fs::create_dir_all(directory).map_err(|source| LoggingError::CreateDirFailed {
        path: directory.clone(),
        source,
    })?;

    let appender = tracing_appender::rolling::never(directory, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_timer(timer());

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| LoggingError::InitFailed(e.to_string()))?;

    Ok(LoggingGuard { _file: Some(guard) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::fmt::format::Writer;
    use tracing_subscriber::fmt::time::FormatTime;

    #[test]
    fn test_invalid_level_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert!(matches!(
            build_filter("nbmdeploy=loudest"),
            Err(LoggingError::InvalidFilter { .. })
        ));
        assert!(build_filter("debug").is_ok());
    }

    #[test]
    fn test_timestamps_with_background_threads() {
        let (_writer, _guard) = tracing_appender::non_blocking(io::sink());
        let worker = std::thread::spawn(|| std::thread::sleep(std::time::Duration::from_millis(50)));

        let mut stamp = String::new();
        timer().format_time(&mut Writer::new(&mut stamp)).unwrap();
        worker.join().unwrap();

        assert!(!stamp.contains("unknown"), "{}", stamp);
        assert!(chrono::DateTime::parse_from_rfc3339(stamp.trim()).is_ok(), "{}", stamp);
    }
}

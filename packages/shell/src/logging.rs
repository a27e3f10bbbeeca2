//! Structured logging for the shell binary.
//!
//! Filter precedence, highest first: the `KFS_LOG` environment variable, the
//! `--log-level` argument, then `warn`. Logs go to stderr unless a file is
//! given, in which case they are appended there without colour.

use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::error::ShellError;

/// Environment variable holding a full filter directive, e.g. `kfs_core=trace`.
pub const LOG_ENV: &str = "KFS_LOG";

/// Level used when neither the environment nor the command line sets one.
pub const DEFAULT_LEVEL: &str = "warn";

/// Install the global subscriber.
pub fn init_logging(level: Option<&str>, file: Option<&Path>) -> Result<(), ShellError> {
    let filter = build_env_filter(level)?;
    let base_subscriber = Registry::default().with(filter);

    match file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ShellError::Logging(format!("failed to create log directory: {}", e))
                })?;
            }
            let file_writer = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    ShellError::Logging(format!(
                        "failed to open log file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
            base_subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_ansi(false)
                        .with_writer(Mutex::new(file_writer)),
                )
                .try_init()
        }
        None => base_subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
    .map_err(|e| ShellError::Logging(e.to_string()))
}

/// Build the filter from `KFS_LOG`, falling back to `level`.
pub fn build_env_filter(level: Option<&str>) -> Result<EnvFilter, ShellError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }

    let level = level.unwrap_or(DEFAULT_LEVEL);
    EnvFilter::try_new(level)
        .map_err(|e| ShellError::Logging(format!("invalid log level '{}': {}", level, e)))
}

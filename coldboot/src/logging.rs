//! Tracing subscriber setup.
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default `info`). With a log
//! directory, the same events are also appended to `<dir>/coldboot.log`
//! through a blocking writer, so nothing is buffered when the process image
//! is replaced by the handler.

use crate::constants::LOG_FILE_NAME;
use coldboot_shared::errors::{BootError, BootResult};
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Call once, before the bootstrap starts.
pub fn init_logging(log_dir: Option<&Path>) -> BootResult<()> {
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                BootError::Storage(format!(
                    "failed to create log directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            Some(fmt::layer().with_writer(appender).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter())
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| BootError::Internal(format!("failed to install log subscriber: {}", e)))
}

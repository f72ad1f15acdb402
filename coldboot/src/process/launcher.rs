//! Handler handoff strategies.

use super::{Handoff, HandlerLauncher};
use crate::config::CommandSpec;
use crate::constants::VOLUME_ENV;
use async_trait::async_trait;
use coldboot_shared::errors::{BootError, BootResult};
use std::path::PathBuf;

/// Replaces the bootstrap process image with the handler (`execvp`).
///
/// On success this never returns; the handler inherits the PID, stdio and
/// environment.
#[derive(Debug, Clone)]
pub struct ExecLauncher {
    volume: PathBuf,
}

impl ExecLauncher {
    pub fn new(volume: impl Into<PathBuf>) -> Self {
        Self {
            volume: volume.into(),
        }
    }
}

#[async_trait]
impl HandlerLauncher for ExecLauncher {
    async fn launch(&self, command: &CommandSpec) -> BootResult<Handoff> {
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;

            tracing::info!(handler = %command, "Replacing bootstrap with handler");
            let err = std::process::Command::new(&command.program)
                .args(&command.args)
                .env(VOLUME_ENV, &self.volume)
                .exec();

            Err(BootError::Launch(format!(
                "failed to exec `{}`: {}",
                command, err
            )))
        }

        #[cfg(not(unix))]
        {
            let _ = (command, &self.volume);
            Err(BootError::Unsupported(
                "exec handoff requires a unix host; use --handoff child".to_string(),
            ))
        }
    }
}

/// Runs the handler as a child and waits for it.
///
/// The bootstrap does nothing else while the handler runs; its exit code
/// becomes the bootstrap's exit code.
#[derive(Debug, Clone)]
pub struct ChildLauncher {
    volume: PathBuf,
}

impl ChildLauncher {
    pub fn new(volume: impl Into<PathBuf>) -> Self {
        Self {
            volume: volume.into(),
        }
    }
}

#[async_trait]
impl HandlerLauncher for ChildLauncher {
    async fn launch(&self, command: &CommandSpec) -> BootResult<Handoff> {
        let mut child = tokio::process::Command::new(&command.program)
            .args(&command.args)
            .env(VOLUME_ENV, &self.volume)
            .spawn()
            .map_err(|e| BootError::Launch(format!("failed to spawn `{}`: {}", command, e)))?;

        tracing::info!(handler = %command, pid = ?child.id(), "Handler started");

        let status = child.wait().await.map_err(|e| {
            BootError::Launch(format!("failed to wait for `{}`: {}", command, e))
        })?;

        let code = match status.code() {
            Some(code) => code,
            None => {
                tracing::warn!(handler = %command, %status, "Handler terminated by signal");
                1
            }
        };
        Ok(Handoff::Exited { code })
    }
}

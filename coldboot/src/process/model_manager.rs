//! Model manager run as a blocking child process.

use super::{ModelManager, ProvisionOutcome};
use crate::config::CommandSpec;
use crate::constants::VOLUME_ENV;
use async_trait::async_trait;
use coldboot_shared::errors::{BootError, BootResult};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Runs the configured model manager command and waits for it to exit.
///
/// stdout/stderr are inherited so download progress lands in the instance
/// log. The volume path is exported as `RUNPOD_VOLUME_PATH` so the manager
/// sees the same volume the bootstrap checked.
#[derive(Debug, Clone)]
pub struct CommandModelManager {
    command: CommandSpec,
    volume: PathBuf,
}

impl CommandModelManager {
    pub fn new(command: CommandSpec, volume: impl Into<PathBuf>) -> Self {
        Self {
            command,
            volume: volume.into(),
        }
    }
}

#[async_trait]
impl ModelManager for CommandModelManager {
    async fn provision(&self) -> BootResult<ProvisionOutcome> {
        let mut cmd = Command::new(&self.command.program);
        cmd.args(&self.command.args)
            .env(VOLUME_ENV, &self.volume)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let status = cmd.status().await.map_err(|e| {
            BootError::Provision(format!(
                "failed to spawn model manager `{}`: {}",
                self.command, e
            ))
        })?;

        if status.success() {
            Ok(ProvisionOutcome::Succeeded)
        } else {
            Ok(ProvisionOutcome::Failed {
                code: status.code(),
            })
        }
    }

    fn describe(&self) -> String {
        self.command.to_string()
    }
}

//! Task: Volume guard.
//!
//! Confirms the persistent volume is mounted before anything is written.

use super::{BootCtx, log_task_error, task_start};
use crate::bootstrap::types::BootPhase;
use crate::fs::{HostFs, LinkState};
use crate::pipeline::PipelineTask;
use async_trait::async_trait;
use coldboot_shared::errors::{BootError, BootResult};
use std::path::Path;

pub struct VolumeGuardTask;

#[async_trait]
impl PipelineTask<BootCtx> for VolumeGuardTask {
    async fn run(self: Box<Self>, ctx: BootCtx) -> BootResult<()> {
        let task_name = self.name();
        task_start(&ctx, task_name).await;

        let mut ctx = ctx.lock().await;
        check_volume(ctx.fs.as_ref(), ctx.volume.root())
            .inspect_err(|e| log_task_error(task_name, e))?;
        ctx.phase.advance(BootPhase::VolumeChecked)
    }

    fn name(&self) -> &str {
        "volume_guard"
    }
}

/// The volume must be an accessible directory. A symlink to one is accepted.
pub fn check_volume(fs: &dyn HostFs, volume: &Path) -> BootResult<()> {
    let unavailable = |reason: &str| BootError::VolumeUnavailable {
        path: volume.to_path_buf(),
        reason: reason.to_string(),
    };

    match fs.link_state(volume)? {
        LinkState::Missing => return Err(unavailable("path does not exist")),
        _ if !fs.is_dir(volume) => return Err(unavailable("not a directory")),
        _ => {}
    }

    fs.check_access(volume)?;
    tracing::debug!(volume = %volume.display(), "Volume mounted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::SimulatedFs;

    #[test]
    fn test_missing_volume_names_path() {
        let fs = SimulatedFs::new();
        let err = check_volume(&fs, Path::new("/data")).unwrap_err();
        assert!(matches!(err, BootError::VolumeUnavailable { .. }));
        assert!(err.to_string().contains("/data"));
        assert!(fs.ops().is_empty());
    }

    #[test]
    fn test_file_is_not_a_volume() {
        let fs = SimulatedFs::new().with_file("/data");
        let err = check_volume(&fs, Path::new("/data")).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_inaccessible_volume() {
        let fs = SimulatedFs::new().with_dir("/data").deny("/data");
        let err = check_volume(&fs, Path::new("/data")).unwrap_err();
        assert!(err.to_string().contains("not accessible"));
    }

    #[test]
    fn test_symlinked_volume_is_accepted() {
        let fs = SimulatedFs::new()
            .with_dir("/mnt/disk0")
            .with_symlink("/data", "/mnt/disk0");
        check_volume(&fs, Path::new("/data")).unwrap();
    }
}

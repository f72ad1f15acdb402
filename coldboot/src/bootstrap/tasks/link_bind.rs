//! Task: Link binder.
//!
//! Points the framework's local `models` directory at the volume so every
//! later reader and writer (model manager, handler) lands on persistent
//! storage.

use super::{BootCtx, log_task_error, task_start};
use crate::bootstrap::types::{BootPhase, LinkOutput};
use crate::fs::{HostFs, LinkState};
use crate::pipeline::PipelineTask;
use async_trait::async_trait;
use coldboot_shared::errors::{BootError, BootResult};
use std::path::Path;

pub struct LinkBindTask;

#[async_trait]
impl PipelineTask<BootCtx> for LinkBindTask {
    async fn run(self: Box<Self>, ctx: BootCtx) -> BootResult<()> {
        let task_name = self.name();
        task_start(&ctx, task_name).await;

        let mut ctx = ctx.lock().await;
        let link = ctx.framework.models_link();
        let target = ctx.volume.models_dir();

        let output = bind_models_dir(ctx.fs.as_ref(), &link, &target)
            .inspect_err(|e| log_task_error(task_name, e))?;

        ctx.link_output = Some(output);
        ctx.phase.advance(BootPhase::Linked)
    }

    fn name(&self) -> &str {
        "link_bind"
    }
}

/// Replace whatever is at `link` with a symlink to `target`.
///
/// A plain directory at `link` is discarded with its contents. A link that
/// already points at `target` is kept as is. `target` must not sit at or
/// below `link`, since replacing `link` would delete it.
pub fn bind_models_dir(fs: &dyn HostFs, link: &Path, target: &Path) -> BootResult<LinkOutput> {
    if target.starts_with(link) {
        return Err(BootError::InvalidState(format!(
            "refusing to replace {}: volume models directory {} lives inside it",
            link.display(),
            target.display()
        )));
    }
    if !fs.is_dir(target) {
        return Err(BootError::InvalidState(format!(
            "volume models directory {} is missing",
            target.display()
        )));
    }

    let previous = fs.link_state(link)?;
    if previous.points_to(target) {
        tracing::debug!(link = %link.display(), target = %target.display(), "Models link already bound");
        return Ok(LinkOutput {
            previous,
            replaced: false,
        });
    }

    match &previous {
        LinkState::Directory => tracing::warn!(
            path = %link.display(),
            "Discarding local models directory in favour of the volume"
        ),
        LinkState::Symlink(stale) => tracing::info!(
            path = %link.display(),
            stale = %stale.display(),
            "Replacing stale models link"
        ),
        LinkState::File => tracing::warn!(path = %link.display(), "Removing file at models path"),
        LinkState::Missing => {}
    }

    if let Some(parent) = link.parent() {
        fs.create_dir_all(parent)?;
    }
    fs.remove_entry(link)?;
    fs.symlink(target, link)?;

    tracing::info!(link = %link.display(), target = %target.display(), "Models directory linked to volume");
    Ok(LinkOutput {
        previous,
        replaced: true,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::fs::{NativeFs, SimulatedFs};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn native_setup() -> (TempDir, PathBuf, PathBuf) {
        let root = TempDir::new().unwrap();
        let target = root.path().join("volume/models");
        std::fs::create_dir_all(&target).unwrap();
        let link = root.path().join("ComfyUI/models");
        (root, link, target)
    }

    #[test]
    fn test_binds_when_missing() {
        let (_root, link, target) = native_setup();

        let output = bind_models_dir(&NativeFs, &link, &target).unwrap();

        assert_eq!(output.previous, LinkState::Missing);
        assert!(output.replaced);
        assert_eq!(std::fs::read_link(&link).unwrap(), target);
    }

    #[test]
    fn test_replaces_plain_directory_with_content() {
        let (_root, link, target) = native_setup();
        std::fs::create_dir_all(link.join("checkpoints")).unwrap();
        std::fs::write(link.join("checkpoints/local.ckpt"), b"x").unwrap();

        let output = bind_models_dir(&NativeFs, &link, &target).unwrap();

        assert_eq!(output.previous, LinkState::Directory);
        assert_eq!(std::fs::read_link(&link).unwrap(), target);
        assert!(!target.join("checkpoints").exists());
    }

    #[test]
    fn test_replaces_stale_link_without_touching_old_target() {
        let (root, link, target) = native_setup();
        let old = root.path().join("old-models");
        std::fs::create_dir_all(&old).unwrap();
        std::fs::write(old.join("keep.safetensors"), b"x").unwrap();
        std::fs::create_dir_all(link.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(&old, &link).unwrap();

        let output = bind_models_dir(&NativeFs, &link, &target).unwrap();

        assert_eq!(output.previous, LinkState::Symlink(old.clone()));
        assert_eq!(std::fs::read_link(&link).unwrap(), target);
        assert!(old.join("keep.safetensors").exists());
    }

    #[test]
    fn test_rebinding_is_convergent() {
        let (_root, link, target) = native_setup();

        bind_models_dir(&NativeFs, &link, &target).unwrap();
        let second = bind_models_dir(&NativeFs, &link, &target).unwrap();

        assert!(!second.replaced);
        assert_eq!(std::fs::read_link(&link).unwrap(), target);
    }

    #[test]
    fn test_requires_volume_models_dir() {
        let fs = SimulatedFs::new();
        let err = bind_models_dir(
            &fs,
            Path::new("/app/ComfyUI/models"),
            Path::new("/data/models"),
        )
        .unwrap_err();
        assert!(matches!(err, BootError::InvalidState(_)));
        assert!(fs.ops().is_empty());
    }

    #[test]
    fn test_removal_failure_is_fatal() {
        let fs = SimulatedFs::new()
            .with_dir("/data/models")
            .with_dir("/app/ComfyUI/models")
            .deny("/app/ComfyUI/models");

        let err = bind_models_dir(
            &fs,
            Path::new("/app/ComfyUI/models"),
            Path::new("/data/models"),
        )
        .unwrap_err();

        assert!(matches!(err, BootError::Storage(_)));
        assert!(err.to_string().contains("/app/ComfyUI/models"));
        assert_eq!(
            fs.link_state(Path::new("/app/ComfyUI/models")).unwrap(),
            LinkState::Directory
        );
    }

    #[test]
    fn test_refuses_link_that_contains_target() {
        let root = TempDir::new().unwrap();
        let link = root.path().join("app/ComfyUI/models");
        let target = link.join("models");
        let lora = target.join("loras/mylora.safetensors");
        std::fs::create_dir_all(lora.parent().unwrap()).unwrap();
        std::fs::write(&lora, b"adapter").unwrap();

        let err = bind_models_dir(&NativeFs, &link, &target).unwrap_err();

        assert!(matches!(err, BootError::InvalidState(_)));
        assert!(link.is_dir());
        assert_eq!(std::fs::read(&lora).unwrap(), b"adapter");
    }

    #[test]
    fn test_link_creation_failure_is_fatal() {
        let fs = SimulatedFs::new()
            .with_dir("/data/models")
            .with_dir("/app/ComfyUI")
            .deny("/app/ComfyUI/models");

        let err = bind_models_dir(
            &fs,
            Path::new("/app/ComfyUI/models"),
            Path::new("/data/models"),
        )
        .unwrap_err();

        assert!(matches!(err, BootError::Storage(_)));
        assert!(err.to_string().contains("/app/ComfyUI/models"));
        assert_eq!(
            fs.link_state(Path::new("/app/ComfyUI/models")).unwrap(),
            LinkState::Missing
        );
        assert!(fs.ops().is_empty());
    }
}

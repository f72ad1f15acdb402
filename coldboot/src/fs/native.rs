//! `HostFs` backed by the real filesystem.

use coldboot_shared::errors::{BootError, BootResult};
use nix::unistd::{AccessFlags, access};
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use super::{HostFs, LinkState};

#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFs;

impl HostFs for NativeFs {
    fn link_state(&self, path: &Path) -> BootResult<LinkState> {
        match std::fs::symlink_metadata(path) {
            Ok(meta) if meta.file_type().is_symlink() => {
                let target = std::fs::read_link(path).map_err(|e| {
                    BootError::Storage(format!("failed to read link {}: {}", path.display(), e))
                })?;
                Ok(LinkState::Symlink(target))
            }
            Ok(meta) if meta.is_dir() => Ok(LinkState::Directory),
            Ok(_) => Ok(LinkState::File),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(LinkState::Missing),
            Err(e) => Err(BootError::Storage(format!(
                "failed to stat {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn check_access(&self, path: &Path) -> BootResult<()> {
        access(path, AccessFlags::R_OK | AccessFlags::W_OK | AccessFlags::X_OK).map_err(|e| {
            BootError::VolumeUnavailable {
                path: path.to_path_buf(),
                reason: format!("not accessible: {}", e),
            }
        })
    }

    fn create_dir_all(&self, path: &Path) -> BootResult<()> {
        std::fs::create_dir_all(path).map_err(|e| {
            BootError::Storage(format!(
                "failed to create directory {}: {}",
                path.display(),
                e
            ))
        })
    }

    fn remove_entry(&self, path: &Path) -> BootResult<()> {
        let result = match self.link_state(path)? {
            LinkState::Missing => return Ok(()),
            LinkState::Directory => std::fs::remove_dir_all(path),
            LinkState::Symlink(_) | LinkState::File => std::fs::remove_file(path),
        };

        result.map_err(|e| {
            BootError::Storage(format!("failed to remove {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Removed existing entry");
        Ok(())
    }

    fn symlink(&self, target: &Path, link: &Path) -> BootResult<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(target, link).map_err(|e| {
                BootError::Storage(format!(
                    "failed to link {} -> {}: {}",
                    link.display(),
                    target.display(),
                    e
                ))
            })
        }

        #[cfg(not(unix))]
        {
            let _ = (target, link);
            Err(BootError::Unsupported(
                "symbolic links are only supported on unix hosts".to_string(),
            ))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_link_state_variants() {
        let dir = TempDir::new().unwrap();
        let fs = NativeFs;

        let missing = dir.path().join("missing");
        assert_eq!(fs.link_state(&missing).unwrap(), LinkState::Missing);

        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        assert_eq!(fs.link_state(&sub).unwrap(), LinkState::Directory);

        let file = dir.path().join("file");
        std::fs::write(&file, b"x").unwrap();
        assert_eq!(fs.link_state(&file).unwrap(), LinkState::File);

        let link = dir.path().join("link");
        fs.symlink(&sub, &link).unwrap();
        assert_eq!(fs.link_state(&link).unwrap(), LinkState::Symlink(sub.clone()));
        assert!(fs.is_dir(&link));
    }

    #[test]
    fn test_remove_symlink_keeps_target_contents() {
        let dir = TempDir::new().unwrap();
        let fs = NativeFs;

        let target = dir.path().join("target");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("weights.safetensors"), b"w").unwrap();

        let link = dir.path().join("link");
        fs.symlink(&target, &link).unwrap();
        fs.remove_entry(&link).unwrap();

        assert_eq!(fs.link_state(&link).unwrap(), LinkState::Missing);
        assert!(target.join("weights.safetensors").exists());
    }

    #[test]
    fn test_remove_directory_recursively() {
        let dir = TempDir::new().unwrap();
        let fs = NativeFs;

        let models = dir.path().join("models");
        std::fs::create_dir_all(models.join("checkpoints")).unwrap();
        std::fs::write(models.join("checkpoints/old.ckpt"), b"x").unwrap();

        fs.remove_entry(&models).unwrap();
        assert!(!models.exists());

        // Second removal of a missing path is a no-op.
        fs.remove_entry(&models).unwrap();
    }

    #[test]
    fn test_check_access_on_temp_dir() {
        let dir = TempDir::new().unwrap();
        NativeFs.check_access(dir.path()).unwrap();

        let err = NativeFs
            .check_access(&dir.path().join("nope"))
            .unwrap_err();
        assert!(matches!(err, BootError::VolumeUnavailable { .. }));
    }
}

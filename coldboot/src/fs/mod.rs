//! Filesystem capability used by the bootstrap tasks.
//!
//! Tasks never call `std::fs` directly; they go through [`HostFs`] so each
//! step can be exercised against a simulated filesystem with injected
//! failures as well as against a real temporary directory.

mod native;
#[cfg(test)]
mod simulated;

use coldboot_shared::errors::BootResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use native::NativeFs;
#[cfg(test)]
pub(crate) use simulated::SimulatedFs;

/// What currently occupies a path, without following a final symlink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum LinkState {
    Missing,
    Symlink(PathBuf),
    Directory,
    File,
}

impl LinkState {
    /// True when the path is a symlink whose literal target is `target`.
    pub fn points_to(&self, target: &Path) -> bool {
        matches!(self, LinkState::Symlink(current) if current == target)
    }
}

/// Host filesystem operations needed by the bootstrap.
pub trait HostFs: Send + Sync {
    /// Inspect `path` without following a final symlink.
    fn link_state(&self, path: &Path) -> BootResult<LinkState>;

    /// True if `path` resolves (following symlinks) to a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Check that the process may read, write and traverse `path`.
    fn check_access(&self, path: &Path) -> BootResult<()>;

    /// Create `path` and any missing parents. Existing directories are left alone.
    fn create_dir_all(&self, path: &Path) -> BootResult<()>;

    /// Remove whatever occupies `path`. Symlinks are unlinked, never followed;
    /// directories are removed recursively. A missing path is not an error.
    fn remove_entry(&self, path: &Path) -> BootResult<()>;

    /// Create a symlink at `link` pointing to `target`.
    fn symlink(&self, target: &Path, link: &Path) -> BootResult<()>;
}

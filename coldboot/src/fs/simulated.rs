//! In-memory `HostFs` for tests that need failure injection.

use coldboot_shared::errors::{BootError, BootResult};
use std::collections::{BTreeMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use super::{HostFs, LinkState};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Dir,
    File,
    Symlink(PathBuf),
}

/// Absolute-path tree with per-path write denial and an operation log.
#[derive(Debug, Default)]
pub(crate) struct SimulatedFs {
    nodes: Mutex<BTreeMap<PathBuf, Node>>,
    denied: Mutex<HashSet<PathBuf>>,
    ops: Mutex<Vec<String>>,
}

impl SimulatedFs {
    pub(crate) fn new() -> Self {
        let fs = Self::default();
        fs.nodes.lock().unwrap().insert(PathBuf::from("/"), Node::Dir);
        fs
    }

    pub(crate) fn with_dir(self, path: impl AsRef<Path>) -> Self {
        let mut nodes = self.nodes.lock().unwrap();
        for ancestor in path.as_ref().ancestors() {
            nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
        drop(nodes);
        self
    }

    pub(crate) fn with_file(self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let fs = match path.parent() {
            Some(parent) => self.with_dir(parent),
            None => self,
        };
        fs.nodes
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), Node::File);
        fs
    }

    pub(crate) fn with_symlink(self, link: impl AsRef<Path>, target: impl AsRef<Path>) -> Self {
        let link = link.as_ref();
        let fs = match link.parent() {
            Some(parent) => self.with_dir(parent),
            None => self,
        };
        fs.nodes
            .lock()
            .unwrap()
            .insert(link.to_path_buf(), Node::Symlink(target.as_ref().to_path_buf()));
        fs
    }

    /// Make every mutation at or below `path` fail with permission denied.
    pub(crate) fn deny(self, path: impl AsRef<Path>) -> Self {
        self.denied
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf());
        self
    }

    pub(crate) fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.nodes.lock().unwrap().contains_key(path.as_ref())
    }

    /// Mutating operations performed so far, e.g. `mkdir /data/models`.
    pub(crate) fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    fn check_writable(&self, op: &str, path: &Path) -> BootResult<()> {
        let denied = self.denied.lock().unwrap();
        if denied.iter().any(|d| path.starts_with(d)) {
            return Err(BootError::Storage(format!(
                "failed to {} {}: Permission denied (os error 13)",
                op,
                path.display()
            )));
        }
        Ok(())
    }

    fn record(&self, op: &str, path: &Path) {
        self.ops
            .lock()
            .unwrap()
            .push(format!("{} {}", op, path.display()));
    }

    /// Resolve symlinks in every component of `path`.
    fn resolve(&self, path: &Path) -> PathBuf {
        let nodes = self.nodes.lock().unwrap();
        let mut resolved = PathBuf::from("/");
        for component in path.components() {
            if let Component::Normal(name) = component {
                resolved.push(name);
                let mut hops = 0;
                while let Some(Node::Symlink(target)) = nodes.get(&resolved) {
                    resolved = target.clone();
                    hops += 1;
                    if hops > 8 {
                        break;
                    }
                }
            }
        }
        resolved
    }
}

impl HostFs for SimulatedFs {
    fn link_state(&self, path: &Path) -> BootResult<LinkState> {
        Ok(match self.nodes.lock().unwrap().get(path) {
            None => LinkState::Missing,
            Some(Node::Dir) => LinkState::Directory,
            Some(Node::File) => LinkState::File,
            Some(Node::Symlink(target)) => LinkState::Symlink(target.clone()),
        })
    }

    fn is_dir(&self, path: &Path) -> bool {
        let resolved = self.resolve(path);
        matches!(self.nodes.lock().unwrap().get(&resolved), Some(Node::Dir))
    }

    fn check_access(&self, path: &Path) -> BootResult<()> {
        self.check_writable("access", path)
            .map_err(|_| BootError::VolumeUnavailable {
                path: path.to_path_buf(),
                reason: "not accessible: EACCES: Permission denied".to_string(),
            })
    }

    fn create_dir_all(&self, path: &Path) -> BootResult<()> {
        let resolved = self.resolve(path);
        let mut missing = Vec::new();
        {
            let nodes = self.nodes.lock().unwrap();
            for ancestor in resolved.ancestors() {
                match nodes.get(ancestor) {
                    Some(Node::Dir) => break,
                    Some(_) => {
                        return Err(BootError::Storage(format!(
                            "failed to create directory {}: File exists (os error 17)",
                            path.display()
                        )));
                    }
                    None => missing.push(ancestor.to_path_buf()),
                }
            }
        }

        for dir in missing.into_iter().rev() {
            self.check_writable("create directory", &dir)?;
            self.nodes.lock().unwrap().insert(dir.clone(), Node::Dir);
            self.record("mkdir", &dir);
        }
        Ok(())
    }

    fn remove_entry(&self, path: &Path) -> BootResult<()> {
        if !self.exists(path) {
            return Ok(());
        }
        self.check_writable("remove", path)?;
        self.nodes
            .lock()
            .unwrap()
            .retain(|p, _| !p.starts_with(path));
        self.record("remove", path);
        Ok(())
    }

    fn symlink(&self, target: &Path, link: &Path) -> BootResult<()> {
        self.check_writable("link", link)?;
        let mut nodes = self.nodes.lock().unwrap();
        if nodes.contains_key(link) {
            return Err(BootError::Storage(format!(
                "failed to link {} -> {}: File exists (os error 17)",
                link.display(),
                target.display()
            )));
        }
        nodes.insert(link.to_path_buf(), Node::Symlink(target.to_path_buf()));
        drop(nodes);
        self.record("symlink", link);
        Ok(())
    }
}

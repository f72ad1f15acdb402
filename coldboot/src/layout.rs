//! Model asset layout on the persistent volume.
//!
//! ```text
//! <volume>/
//! └── models/
//!     ├── diffusion_models/
//!     ├── loras/
//!     ├── vae/
//!     └── text_encoders/
//! ```

use crate::fs::{HostFs, LinkState};
use coldboot_shared::errors::{BootError, BootResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Directory name of the models root, both on the volume and in the framework tree.
pub const MODELS_DIR: &str = "models";

/// Functional grouping of model weight files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelCategory {
    DiffusionModels,
    Loras,
    Vae,
    TextEncoders,
}

impl ModelCategory {
    pub const ALL: [ModelCategory; 4] = [
        ModelCategory::DiffusionModels,
        ModelCategory::Loras,
        ModelCategory::Vae,
        ModelCategory::TextEncoders,
    ];

    /// On-disk directory name.
    pub fn dir_name(self) -> &'static str {
        match self {
            ModelCategory::DiffusionModels => "diffusion_models",
            ModelCategory::Loras => "loras",
            ModelCategory::Vae => "vae",
            ModelCategory::TextEncoders => "text_encoders",
        }
    }
}

impl fmt::Display for ModelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Paths derived from the volume mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeLayout {
    root: PathBuf,
}

impl VolumeLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join(MODELS_DIR)
    }

    pub fn category_dir(&self, category: ModelCategory) -> PathBuf {
        self.models_dir().join(category.dir_name())
    }

    pub fn category_dirs(&self) -> impl Iterator<Item = (ModelCategory, PathBuf)> + '_ {
        ModelCategory::ALL
            .into_iter()
            .map(|category| (category, self.category_dir(category)))
    }

    /// Create every category directory under `models/`.
    ///
    /// Existing directories and their contents are left untouched. A
    /// non-directory occupying a category path is an error, never removed.
    pub fn prepare(&self, fs: &dyn HostFs) -> BootResult<Vec<PathBuf>> {
        let mut created = Vec::new();

        for (category, dir) in self.category_dirs() {
            match fs.link_state(&dir)? {
                LinkState::Directory => continue,
                LinkState::Symlink(_) if fs.is_dir(&dir) => continue,
                LinkState::Missing => {}
                other => {
                    return Err(BootError::Storage(format!(
                        "{} path {} is occupied by {:?}, expected a directory",
                        category,
                        dir.display(),
                        other
                    )));
                }
            }

            fs.create_dir_all(&dir)?;
            created.push(dir);
        }

        Ok(created)
    }
}

/// Paths inside the inference framework install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkLayout {
    root: PathBuf,
}

impl FrameworkLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where the framework expects its local model directory.
    pub fn models_link(&self) -> PathBuf {
        self.root.join(MODELS_DIR)
    }
}

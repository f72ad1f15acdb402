//! Read-only report of the volume, model layout and framework link.
//!
//! Answers "would a cold start find everything in place?" without
//! changing anything on disk.

use crate::bootstrap::check_volume;
use crate::fs::{HostFs, LinkState};
use crate::layout::{FrameworkLayout, ModelCategory, VolumeLayout};
use chrono::{DateTime, Utc};
use coldboot_shared::errors::BootResult;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub category: ModelCategory,
    pub path: PathBuf,
    pub present: bool,
    pub files: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub checked_at: DateTime<Utc>,
    pub volume: PathBuf,
    pub volume_mounted: bool,
    /// Why the volume guard would reject the volume, if it would.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_error: Option<String>,
    pub categories: Vec<CategoryReport>,
    pub models_link: PathBuf,
    pub link: LinkState,
    /// True when the framework models path is a symlink to the volume models dir.
    pub link_bound: bool,
}

impl InspectReport {
    pub fn is_ready(&self) -> bool {
        self.volume_mounted && self.link_bound && self.categories.iter().all(|c| c.present)
    }

    /// Plain-text rendering for terminals.
    pub fn render(&self) -> String {
        let mark = |ok: bool| if ok { "ok" } else { "MISSING" };
        let mut out = String::new();

        let _ = writeln!(out, "volume       {}  [{}]", self.volume.display(), mark(self.volume_mounted));
        if let Some(err) = &self.volume_error {
            let _ = writeln!(out, "             {}", err);
        }
        for category in &self.categories {
            let _ = writeln!(
                out,
                "{:<12} {}  [{}] {} files, {:.1} MiB",
                category.category.dir_name(),
                category.path.display(),
                mark(category.present),
                category.files,
                category.bytes as f64 / (1024.0 * 1024.0)
            );
        }
        let link = match &self.link {
            LinkState::Missing => "missing".to_string(),
            LinkState::Directory => "plain directory".to_string(),
            LinkState::File => "file".to_string(),
            LinkState::Symlink(target) => format!("-> {}", target.display()),
        };
        let _ = writeln!(
            out,
            "models link  {} {}  [{}]",
            self.models_link.display(),
            link,
            if self.link_bound { "bound" } else { "UNBOUND" }
        );
        let _ = write!(out, "ready        {}", self.is_ready());
        out
    }
}

/// Build the report. Only reads; never creates or removes anything.
pub fn inspect(
    fs: &dyn HostFs,
    volume: &VolumeLayout,
    framework: &FrameworkLayout,
) -> BootResult<InspectReport> {
    let volume_error = check_volume(fs, volume.root()).err().map(|e| e.to_string());

    let categories = volume
        .category_dirs()
        .map(|(category, path)| {
            let present = fs.is_dir(&path);
            let (files, bytes) = if present { tally(&path) } else { (0, 0) };
            CategoryReport {
                category,
                path,
                present,
                files,
                bytes,
            }
        })
        .collect();

    let models_link = framework.models_link();
    let link = fs.link_state(&models_link)?;
    let link_bound = link.points_to(&volume.models_dir());

    Ok(InspectReport {
        checked_at: Utc::now(),
        volume: volume.root().to_path_buf(),
        volume_mounted: volume_error.is_none(),
        volume_error,
        categories,
        models_link,
        link,
        link_bound,
    })
}

/// Count regular files and their total size below `dir`.
fn tally(dir: &Path) -> (usize, u64) {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .fold((0, 0), |(files, bytes), entry| {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            (files + 1, bytes + size)
        })
}

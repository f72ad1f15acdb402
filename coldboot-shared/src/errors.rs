//! Error taxonomy for the bootstrap sequence.
//!
//! Every failure is fatal to the cold start. Variants describe *what kind*
//! of thing went wrong; [`BootError::Stage`] attaches *which step* it was.

use std::path::PathBuf;

use thiserror::Error;

pub type BootResult<T> = Result<T, BootError>;

#[derive(Debug, Error)]
pub enum BootError {
    /// Invalid command line or environment input.
    #[error("configuration error: {0}")]
    Config(String),

    /// The persistent volume is not usable.
    #[error("volume unavailable at {}: {reason}", .path.display())]
    VolumeUnavailable { path: PathBuf, reason: String },

    /// Filesystem operation on the volume or framework tree failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// The model manager could not run or reported failure.
    #[error("provisioning failed: {0}")]
    Provision(String),

    /// The request handler could not be started.
    #[error("handler launch failed: {0}")]
    Launch(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("internal error: {0}")]
    Internal(String),

    /// Wraps the error of the pipeline task that aborted the sequence.
    #[error("{task} failed: {source}")]
    Stage {
        task: String,
        #[source]
        source: Box<BootError>,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BootError {
    /// Attach the name of the failing task.
    pub fn in_task(self, task: impl Into<String>) -> Self {
        BootError::Stage {
            task: task.into(),
            source: Box::new(self),
        }
    }

    /// Name of the task that failed, if the error came out of the pipeline.
    pub fn task(&self) -> Option<&str> {
        match self {
            BootError::Stage { task, .. } => Some(task),
            _ => None,
        }
    }

    /// The underlying error with any task context stripped.
    pub fn root(&self) -> &BootError {
        match self {
            BootError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

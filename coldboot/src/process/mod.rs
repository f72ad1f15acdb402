//! External process boundaries: the model manager and the request handler.
//!
//! Both are traits so the bootstrap can be driven by fakes in tests:
//!
//! - **ModelManager**: runs to completion, outcome via exit status
//! - **HandlerLauncher**: takes over the instance; returns only if the
//!   handoff mode waits on a child or the launch fails

mod launcher;
mod model_manager;

use crate::config::CommandSpec;
use async_trait::async_trait;
use coldboot_shared::errors::BootResult;

pub use launcher::{ChildLauncher, ExecLauncher};
pub use model_manager::CommandModelManager;

/// Result of one model manager run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Succeeded,
    /// Non-zero exit. `code` is `None` when the process was killed by a signal.
    Failed { code: Option<i32> },
}

impl ProvisionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProvisionOutcome::Succeeded)
    }
}

/// How the handler gave control back, when it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handoff {
    /// A waited-on handler exited; the bootstrap exits with the same code.
    Exited { code: i32 },
}

/// Decides which model files are missing and downloads them.
#[async_trait]
pub trait ModelManager: Send + Sync {
    /// Run to completion. `Err` means the manager could not be run at all.
    async fn provision(&self) -> BootResult<ProvisionOutcome>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

/// Starts the long-running request handler.
#[async_trait]
pub trait HandlerLauncher: Send + Sync {
    async fn launch(&self, command: &CommandSpec) -> BootResult<Handoff>;
}

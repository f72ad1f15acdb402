//! Bootstrap tasks, one per step of the cold start.

mod handler_launch;
mod layout_ensure;
mod link_bind;
mod provision;
mod volume_guard;

pub use handler_launch::HandlerLaunchTask;
pub use layout_ensure::LayoutEnsureTask;
pub use link_bind::{LinkBindTask, bind_models_dir};
pub use provision::ProvisionTask;
pub use volume_guard::{VolumeGuardTask, check_volume};

use super::types::BootContext;
use coldboot_shared::errors::BootError;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type BootCtx = Arc<Mutex<BootContext>>;

async fn task_start(ctx: &BootCtx, task_name: &str) {
    let ctx = ctx.lock().await;
    tracing::info!(task = task_name, phase = %ctx.phase, "Task started");
}

fn log_task_error(task_name: &str, error: &BootError) {
    tracing::error!(task = task_name, error = %error, "Task failed");
}

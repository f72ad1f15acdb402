//! Task: Layout ensurer.
//!
//! Creates `<volume>/models/<category>/` for every model category.

use super::{BootCtx, log_task_error, task_start};
use crate::bootstrap::types::{BootPhase, LayoutOutput};
use crate::pipeline::PipelineTask;
use async_trait::async_trait;
use coldboot_shared::errors::BootResult;

pub struct LayoutEnsureTask;

#[async_trait]
impl PipelineTask<BootCtx> for LayoutEnsureTask {
    async fn run(self: Box<Self>, ctx: BootCtx) -> BootResult<()> {
        let task_name = self.name();
        task_start(&ctx, task_name).await;

        let mut ctx = ctx.lock().await;
        let created = ctx
            .volume
            .prepare(ctx.fs.as_ref())
            .inspect_err(|e| log_task_error(task_name, e))?;

        for dir in &created {
            tracing::info!(path = %dir.display(), "Created model directory");
        }
        tracing::debug!(
            models_dir = %ctx.volume.models_dir().display(),
            created = created.len(),
            "Model layout ready"
        );

        ctx.layout_output = Some(LayoutOutput { created });
        ctx.phase.advance(BootPhase::LayoutReady)
    }

    fn name(&self) -> &str {
        "layout_ensure"
    }
}

//! Task: Handler launcher.
//!
//! Hands the instance over to the request handler. With exec handoff this
//! task never returns on success.

use super::{BootCtx, log_task_error, task_start};
use crate::bootstrap::types::BootPhase;
use crate::pipeline::PipelineTask;
use async_trait::async_trait;
use coldboot_shared::errors::BootResult;

pub struct HandlerLaunchTask;

#[async_trait]
impl PipelineTask<BootCtx> for HandlerLaunchTask {
    async fn run(self: Box<Self>, ctx: BootCtx) -> BootResult<()> {
        let task_name = self.name();
        task_start(&ctx, task_name).await;

        let (launcher, handler) = {
            let ctx = ctx.lock().await;
            (ctx.launcher.clone(), ctx.config.handler.clone())
        };

        // A failed launch leaves the phase at Provisioned.
        let handoff = launcher
            .launch(&handler)
            .await
            .inspect_err(|e| log_task_error(task_name, e))?;

        let mut ctx = ctx.lock().await;
        ctx.handoff = Some(handoff);
        ctx.phase.advance(BootPhase::Serving)
    }

    fn name(&self) -> &str {
        "handler_launch"
    }
}

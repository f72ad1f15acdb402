//! Task: Provisioning trigger.
//!
//! Runs the model manager and blocks until it exits. Which files are missing
//! and how they are fetched is entirely the model manager's business.

use super::{BootCtx, log_task_error, task_start};
use crate::bootstrap::types::BootPhase;
use crate::config::ProvisionFailurePolicy;
use crate::pipeline::PipelineTask;
use crate::process::{ModelManager, ProvisionOutcome};
use async_trait::async_trait;
use coldboot_shared::errors::{BootError, BootResult};

pub struct ProvisionTask;

#[async_trait]
impl PipelineTask<BootCtx> for ProvisionTask {
    async fn run(self: Box<Self>, ctx: BootCtx) -> BootResult<()> {
        let task_name = self.name();
        task_start(&ctx, task_name).await;

        // Lock is released while the model manager runs.
        let (model_manager, policy) = {
            let ctx = ctx.lock().await;
            (ctx.model_manager.clone(), ctx.config.on_provision_failure)
        };

        let outcome = run_provision(model_manager.as_ref(), policy)
            .await
            .inspect_err(|e| log_task_error(task_name, e))?;

        let mut ctx = ctx.lock().await;
        ctx.provision_output = Some(outcome);
        ctx.phase.advance(BootPhase::Provisioned)
    }

    fn name(&self) -> &str {
        "provision"
    }
}

/// Invoke the model manager and apply the failure policy.
///
/// Under `Continue`, a failed run is returned as `Ok(Failed { .. })` so the
/// caller can still record it.
pub(crate) async fn run_provision(
    model_manager: &dyn ModelManager,
    policy: ProvisionFailurePolicy,
) -> BootResult<ProvisionOutcome> {
    tracing::info!(model_manager = %model_manager.describe(), "Provisioning models");

    let failure = match model_manager.provision().await {
        Ok(ProvisionOutcome::Succeeded) => {
            tracing::info!("Model provisioning complete");
            return Ok(ProvisionOutcome::Succeeded);
        }
        Ok(ProvisionOutcome::Failed { code }) => (
            ProvisionOutcome::Failed { code },
            BootError::Provision(match code {
                Some(code) => format!("model manager exited with status {}", code),
                None => "model manager was terminated by a signal".to_string(),
            }),
        ),
        Err(e) => (ProvisionOutcome::Failed { code: None }, e),
    };

    let (outcome, error) = failure;
    match policy {
        ProvisionFailurePolicy::Abort => Err(error),
        ProvisionFailurePolicy::Continue => {
            tracing::warn!(
                error = %error,
                "Model provisioning failed; continuing to handler as configured"
            );
            Ok(outcome)
        }
    }
}

//! Cold-start bootstrap orchestration.
//!
//! ## Architecture
//!
//! The cold start is a fixed, table-driven plan. Every stage holds one task
//! and each task's postcondition is the next task's precondition:
//!
//! ```text
//! 1. VolumeGuard     (volume mounted and accessible)
//! 2. LayoutEnsure    (<volume>/models/<category>/ exist)
//! 3. LinkBind        (<framework>/models → <volume>/models)
//! 4. Provision       (model manager ran to completion)
//! 5. HandlerLaunch   (control handed to the request handler)
//! ```
//!
//! The first failure aborts the plan; nothing is retried or rolled back.
//! Re-running against the same volume converges to the same layout.

mod tasks;
mod types;

pub use tasks::{bind_models_dir, check_volume};
pub use types::{BootContext, BootPhase, LayoutOutput, LinkOutput};

use crate::config::{BootConfig, HandoffMode};
use crate::fs::{HostFs, NativeFs};
use crate::pipeline::{
    BoxedTask, ExecutionPlan, PipelineBuilder, PipelineExecutor, PipelineMetrics, Stage,
};
use crate::process::{
    ChildLauncher, CommandModelManager, ExecLauncher, HandlerLauncher, Handoff, ModelManager,
    ProvisionOutcome,
};
use coldboot_shared::errors::BootResult;
use std::sync::Arc;
use tokio::sync::Mutex;

use tasks::{
    BootCtx, HandlerLaunchTask, LayoutEnsureTask, LinkBindTask, ProvisionTask, VolumeGuardTask,
};

// ============================================================================
// EXECUTION PLAN
// ============================================================================

fn get_execution_plan() -> ExecutionPlan<BootCtx> {
    let stages: Vec<Stage<BoxedTask<BootCtx>>> = vec![
        Stage::single(Box::new(VolumeGuardTask)),
        Stage::single(Box::new(LayoutEnsureTask)),
        Stage::single(Box::new(LinkBindTask)),
        Stage::single(Box::new(ProvisionTask)),
        Stage::single(Box::new(HandlerLaunchTask)),
    ];

    ExecutionPlan::new(stages)
}

/// What a bootstrap run produced when control came back to it.
///
/// Only observed with a waiting handoff (child mode or test launchers);
/// exec handoff never returns on success.
#[derive(Debug)]
pub struct BootReport {
    pub phase: BootPhase,
    pub layout: Option<LayoutOutput>,
    pub link: Option<LinkOutput>,
    pub provision: Option<ProvisionOutcome>,
    pub handoff: Option<Handoff>,
    pub metrics: PipelineMetrics,
}

impl BootReport {
    /// Exit code the bootstrap process should terminate with.
    pub fn exit_code(&self) -> i32 {
        match self.handoff {
            Some(Handoff::Exited { code }) => code,
            None => 0,
        }
    }
}

/// Runs the cold-start sequence.
///
/// # Example
///
/// ```ignore
/// let report = Bootstrapper::from_config(config).run().await?;
/// std::process::exit(report.exit_code());
/// ```
pub struct Bootstrapper {
    config: BootConfig,
    fs: Arc<dyn HostFs>,
    model_manager: Arc<dyn ModelManager>,
    launcher: Arc<dyn HandlerLauncher>,
}

impl Bootstrapper {
    /// Wire the real filesystem and processes for `config`.
    pub fn from_config(config: BootConfig) -> Self {
        let model_manager = Arc::new(CommandModelManager::new(
            config.model_manager.clone(),
            &config.volume,
        ));
        let launcher: Arc<dyn HandlerLauncher> = match config.handoff {
            HandoffMode::Exec => Arc::new(ExecLauncher::new(&config.volume)),
            HandoffMode::Child => Arc::new(ChildLauncher::new(&config.volume)),
        };
        Self::new(config, Arc::new(NativeFs), model_manager, launcher)
    }

    pub fn new(
        config: BootConfig,
        fs: Arc<dyn HostFs>,
        model_manager: Arc<dyn ModelManager>,
        launcher: Arc<dyn HandlerLauncher>,
    ) -> Self {
        Self {
            config,
            fs,
            model_manager,
            launcher,
        }
    }

    /// Execute every step in order, stopping at the first failure.
    ///
    /// The returned error names the failing task (`BootError::task`).
    pub async fn run(self) -> BootResult<BootReport> {
        let Bootstrapper {
            config,
            fs,
            model_manager,
            launcher,
        } = self;

        config.validate()?;
        tracing::info!(
            volume = %config.volume.display(),
            framework_root = %config.framework_root.display(),
            "Starting cold-start bootstrap"
        );

        let ctx = BootContext::new(config, fs, model_manager, launcher);
        let ctx: BootCtx = Arc::new(Mutex::new(ctx));

        let pipeline = PipelineBuilder::from_plan(get_execution_plan());
        let result = PipelineExecutor::execute(pipeline, Arc::clone(&ctx)).await;

        let mut ctx = ctx.lock().await;
        let metrics = match result {
            Ok(metrics) => metrics,
            Err(e) => {
                let reached = ctx.phase;
                ctx.phase.abort();
                tracing::debug!(reached = %reached, "Bootstrap aborted");
                return Err(e);
            }
        };

        metrics.log_summary();
        Ok(BootReport {
            phase: ctx.phase,
            layout: ctx.layout_output.take(),
            link: ctx.link_output.take(),
            provision: ctx.provision_output,
            handoff: ctx.handoff,
            metrics,
        })
    }
}

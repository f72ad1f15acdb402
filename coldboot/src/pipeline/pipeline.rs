//! Generic pipeline execution framework.
//!
//! Provides a table-driven pipeline executor that runs stages in order and
//! stops at the first failing task.

use super::metrics::{PipelineMetrics, StageMetrics, TaskMetrics};
use super::stage::Stage;
use super::task::BoxedTask;
use coldboot_shared::errors::BootResult;
use std::time::Instant;

pub struct ExecutionPlan<Ctx> {
    stages: Vec<Stage<BoxedTask<Ctx>>>,
}

impl<Ctx> ExecutionPlan<Ctx> {
    pub fn new(stages: Vec<Stage<BoxedTask<Ctx>>>) -> Self {
        Self { stages }
    }

    pub fn stages(self) -> Vec<Stage<BoxedTask<Ctx>>> {
        self.stages
    }

    /// Task names in execution order.
    pub fn task_names(&self) -> Vec<String> {
        self.stages
            .iter()
            .flat_map(|stage| stage.tasks.iter())
            .map(|task| task.name().to_string())
            .collect()
    }
}

pub struct Pipeline<Ctx> {
    stages: Vec<Stage<BoxedTask<Ctx>>>,
}

impl<Ctx> Pipeline<Ctx> {
    pub fn new(stages: Vec<Stage<BoxedTask<Ctx>>>) -> Self {
        Self { stages }
    }
}

pub struct PipelineBuilder;

impl PipelineBuilder {
    pub fn from_plan<Ctx>(plan: ExecutionPlan<Ctx>) -> Pipeline<Ctx> {
        Pipeline::new(plan.stages())
    }
}

/// Pipeline executor framework.
///
/// This provides the generic infrastructure for executing a table-driven pipeline.
/// The actual task execution logic is provided by task implementations.
pub struct PipelineExecutor;

impl PipelineExecutor {
    /// Execute a pipeline.
    ///
    /// Iterates through stages and runs their tasks one at a time. The first
    /// task error aborts the pipeline; it is returned wrapped with the task
    /// name and no later task runs.
    ///
    /// Generic over:
    /// - `Ctx`: Shared pipeline context (use interior mutability for writes)
    pub async fn execute<Ctx>(pipeline: Pipeline<Ctx>, ctx: Ctx) -> BootResult<PipelineMetrics>
    where
        Ctx: Clone,
    {
        let total_start = Instant::now();
        let mut stage_metrics = Vec::new();

        for stage in pipeline.stages {
            let stage_start = Instant::now();
            let mut task_metrics = Vec::new();

            for task in stage.tasks {
                let name = task.name().to_string();
                let task_start = Instant::now();
                task.run(ctx.clone()).await.map_err(|e| e.in_task(&name))?;

                let duration_ms = task_start.elapsed().as_millis();
                tracing::info!(task = %name, duration_ms = duration_ms as u64, "Task completed");
                task_metrics.push(TaskMetrics { name, duration_ms });
            }

            stage_metrics.push(StageMetrics {
                duration_ms: stage_start.elapsed().as_millis(),
                tasks: task_metrics,
            });
        }

        Ok(PipelineMetrics {
            total_duration_ms: total_start.elapsed().as_millis(),
            stages: stage_metrics,
        })
    }
}

//! Generic table-driven pipeline execution framework.
//!
//! ## Architecture
//!
//! ```text
//! Pipeline → Stages → Tasks
//!
//! - Pipeline: Orchestrates execution of all stages, in order
//! - Stage: Groups related tasks that run one after another
//! - Task: Atomic unit of work
//! ```
//!
//! Execution is fail-fast: the first task error stops the pipeline and is
//! returned wrapped with the task name (see `BootError::Stage`).
//!
//! ## Example
//!
//! ```ignore
//! use pipeline::{ExecutionPlan, PipelineBuilder, PipelineExecutor, Stage};
//!
//! let plan = ExecutionPlan::new(vec![
//!     Stage::single(Box::new(TaskA)),
//!     Stage::sequential(vec![Box::new(TaskB), Box::new(TaskC)]),
//! ]);
//!
//! let pipeline = PipelineBuilder::from_plan(plan);
//! let metrics = PipelineExecutor::execute(pipeline, ctx).await?;
//! println!("pipeline took {}ms", metrics.total_duration_ms);
//! ```

mod metrics;
#[allow(clippy::module_inception)]
mod pipeline;
mod stage;
mod task;

pub use metrics::{PipelineMetrics, StageMetrics, TaskMetrics};
pub use pipeline::{ExecutionPlan, Pipeline, PipelineBuilder, PipelineExecutor};
pub use stage::Stage;
pub use task::{BoxedTask, PipelineTask};

#[derive(Debug, Clone)]
pub struct TaskMetrics {
    pub name: String,
    pub duration_ms: u128,
}

#[derive(Debug, Clone)]
pub struct StageMetrics {
    pub duration_ms: u128,
    pub tasks: Vec<TaskMetrics>,
}

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub total_duration_ms: u128,
    pub stages: Vec<StageMetrics>,
}

impl PipelineMetrics {
    pub fn task_duration_ms(&self, name: &str) -> Option<u128> {
        self.tasks().find(|task| task.name == name).map(|task| task.duration_ms)
    }

    /// All completed tasks in execution order.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskMetrics> {
        self.stages.iter().flat_map(|stage| stage.tasks.iter())
    }

    /// Log the pipeline total, with per-task durations at debug level.
    pub fn log_summary(&self) {
        for task in self.tasks() {
            tracing::debug!(task = %task.name, duration_ms = task.duration_ms as u64, "Task timing");
        }
        tracing::info!(
            total_duration_ms = self.total_duration_ms as u64,
            "Bootstrap pipeline finished"
        );
    }
}

//! Stage definition for table-driven pipeline execution.

/// A stage groups tasks that run sequentially.
///
/// Stages are executed in order; a stage starts only after every task of
/// the previous stage has succeeded.
///
/// Generic over task type T to allow different pipeline implementations.
#[derive(Debug, Clone)]
pub struct Stage<T> {
    pub tasks: Vec<T>,
}

impl<T> Stage<T> {
    /// Create a stage whose tasks run one after another.
    pub fn sequential(tasks: Vec<T>) -> Self {
        Self { tasks }
    }

    /// Create a stage holding exactly one task.
    pub fn single(task: T) -> Self {
        Self { tasks: vec![task] }
    }
}

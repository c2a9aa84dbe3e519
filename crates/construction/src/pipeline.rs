//! First-success-wins chaining of construction tasks.
//!
//! The runner threads each task's returned outcome instead of re-reading
//! the request's result slot: the first `Resolved` stops the chain, a task
//! error aborts the run, and a fully unresolved chain is not an error.

use tracing::debug;

use crate::errors::ConstructionError;
use crate::request::{Constructed, ConstructionRequest};
use crate::tasks::{ConstructionTask, CreateConcreteTask, CreateLazyTask, TaskOutcome};

pub struct ConstructionPipeline {
    tasks: Vec<Box<dyn ConstructionTask>>,
}

impl ConstructionPipeline {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// The canonical chain: lazy strategy first, direct construction as
    /// the fallback. The lazy task passes on non-lazy requests, so the
    /// request flag selects the strategy.
    pub fn standard() -> Self {
        Self::new()
            .with_task(CreateLazyTask::new())
            .with_task(CreateConcreteTask::new())
    }

    pub fn with_task(mut self, task: impl ConstructionTask + 'static) -> Self {
        self.tasks.push(Box::new(task));
        self
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run the chain over one request. `Ok(None)` means every task passed.
    pub fn run(
        &self,
        request: &mut ConstructionRequest,
    ) -> Result<Option<Constructed>, ConstructionError> {
        for task in &self.tasks {
            match task.execute(request)? {
                TaskOutcome::Resolved(constructed) => {
                    debug!(task = task.name(), "request resolved");
                    return Ok(Some(constructed));
                }
                TaskOutcome::Unresolved => continue,
            }
        }
        Ok(None)
    }
}

impl Default for ConstructionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

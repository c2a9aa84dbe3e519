//! Construction pipeline steps.
//!
//! Each task implements `ConstructionTask` and either resolves the request
//! or leaves it untouched. The shared skip policy keeps tasks chainable:
//! an already-resolved request, a missing descriptor, or a non-constructible
//! target kind all produce a defined no-op, never an error.

mod create_concrete;
mod create_lazy;

pub use create_concrete::CreateConcreteTask;
pub use create_lazy::CreateLazyTask;

pub(crate) use create_concrete::construct;

use crate::errors::ConstructionError;
use crate::request::{Constructed, ConstructionRequest};

/// Outcome of one pipeline step.
///
/// The runner threads this value; a resolved outcome stops the chain. The
/// request's result slot mirrors it so externally pre-resolved requests
/// short-circuit the same way.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    Unresolved,
    Resolved(Constructed),
}

impl TaskOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, TaskOutcome::Resolved(_))
    }
}

/// One construction strategy in the chain.
pub trait ConstructionTask: Send + Sync {
    fn name(&self) -> &'static str;

    fn execute(
        &self,
        request: &mut ConstructionRequest,
    ) -> Result<TaskOutcome, ConstructionError>;
}

/// Skip policy shared by all construction tasks.
pub(crate) fn should_skip(request: &ConstructionRequest) -> bool {
    if request.result().is_some() {
        return true;
    }
    match request.descriptor() {
        None => true,
        Some(descriptor) => !descriptor.kind().constructible(),
    }
}

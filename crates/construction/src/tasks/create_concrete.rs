//! Direct (eager) construction task.

use std::sync::Arc;

use tracing::{debug, trace};

use super::{should_skip, ConstructionTask, TaskOutcome};
use crate::errors::ConstructionError;
use crate::request::{Constructed, ConstructionRequest, CreationContext, SharedInstance};
use crate::resolver;

/// Resolves the constructor, invokes it, and runs the property-mapping
/// callback, all on the calling thread.
#[derive(Debug, Default)]
pub struct CreateConcreteTask;

impl CreateConcreteTask {
    pub fn new() -> Self {
        Self
    }
}

impl ConstructionTask for CreateConcreteTask {
    fn name(&self) -> &'static str {
        "CreateConcreteTask"
    }

    fn execute(
        &self,
        request: &mut ConstructionRequest,
    ) -> Result<TaskOutcome, ConstructionError> {
        if should_skip(request) {
            trace!(task = self.name(), ?request, "skipping request");
            return Ok(TaskOutcome::Unresolved);
        }
        let Some(context) = request.creation_context() else {
            return Ok(TaskOutcome::Unresolved);
        };

        let instance = construct(&context)?;
        debug!(
            type_name = context.descriptor.type_name(),
            arity = context.arguments.len(),
            "constructed instance"
        );

        let constructed = Constructed::Direct(instance);
        request.set_result(constructed.clone());
        Ok(TaskOutcome::Resolved(constructed))
    }
}

/// The full direct-construction routine: resolve, invoke, map.
///
/// Also the deferred materializer behind `LazyProxy`; any raw failure from
/// the constructor or the mapping callback leaves here wrapped as
/// `ConstructionFailed` carrying the target type name.
pub(crate) fn construct(context: &CreationContext) -> Result<SharedInstance, ConstructionError> {
    let invoker = resolver::resolve(&context.descriptor, &context.arguments)?;
    let mut instance = invoker.invoke(&context.arguments)?;

    if let Some(map) = context.descriptor.map_properties() {
        map(&mut *instance, &context.service, context)
            .map_err(|source| ConstructionError::failed(context.descriptor.type_name(), source))?;
    }

    Ok(Arc::from(instance))
}

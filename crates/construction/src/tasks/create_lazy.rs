//! Lazy (proxy) construction task.

use std::sync::Arc;

use tracing::{debug, trace};

use super::{should_skip, ConstructionTask, TaskOutcome};
use crate::errors::ConstructionError;
use crate::proxy::LazyProxy;
use crate::request::{Constructed, ConstructionRequest};

/// Resolves the request with a `LazyProxy` instead of a real instance;
/// actual construction is deferred to the proxy's first access.
///
/// Passes on non-lazy requests, so chaining it ahead of
/// `CreateConcreteTask` selects the strategy by the request flag.
#[derive(Debug, Default)]
pub struct CreateLazyTask;

impl CreateLazyTask {
    pub fn new() -> Self {
        Self
    }
}

impl ConstructionTask for CreateLazyTask {
    fn name(&self) -> &'static str {
        "CreateLazyTask"
    }

    fn execute(
        &self,
        request: &mut ConstructionRequest,
    ) -> Result<TaskOutcome, ConstructionError> {
        if should_skip(request) {
            trace!(task = self.name(), ?request, "skipping request");
            return Ok(TaskOutcome::Unresolved);
        }
        if !request.is_lazy() {
            trace!(task = self.name(), "request is not lazy, passing");
            return Ok(TaskOutcome::Unresolved);
        }
        let Some(context) = request.creation_context() else {
            return Ok(TaskOutcome::Unresolved);
        };

        let proxy = Arc::new(LazyProxy::new(context));
        debug!(type_name = proxy.target_type_name(), "created lazy proxy");

        let constructed = Constructed::Lazy(proxy);
        request.set_result(constructed.clone());
        Ok(TaskOutcome::Resolved(constructed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptor;
    use crate::request::ServiceContext;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Gadget {
        id: u32,
    }

    fn service() -> ServiceContext {
        Arc::new(())
    }

    fn gadget_descriptor(constructions: Arc<AtomicUsize>) -> Arc<TypeDescriptor> {
        Arc::new(
            TypeDescriptor::builder::<Gadget>()
                .constructor(Vec::new(), move |_| {
                    constructions.fetch_add(1, Ordering::SeqCst);
                    Ok(Gadget { id: 99 })
                })
                .build(),
        )
    }

    #[test]
    fn passes_on_non_lazy_requests() -> anyhow::Result<()> {
        let descriptor = gadget_descriptor(Arc::new(AtomicUsize::new(0)));
        let mut request = ConstructionRequest::new(descriptor, service());

        let outcome = CreateLazyTask::new().execute(&mut request)?;
        assert!(!outcome.is_resolved());
        assert!(request.result().is_none());
        Ok(())
    }

    #[test]
    fn resolves_with_unmaterialized_proxy() -> anyhow::Result<()> {
        let constructions = Arc::new(AtomicUsize::new(0));
        let descriptor = gadget_descriptor(Arc::clone(&constructions));
        let mut request = ConstructionRequest::new(descriptor, service()).lazy(true);

        let outcome = CreateLazyTask::new().execute(&mut request)?;
        assert!(outcome.is_resolved());

        // Proxy exists, but nothing has been constructed yet.
        let Some(Constructed::Lazy(proxy)) = request.result() else {
            panic!("expected lazy result");
        };
        assert!(!proxy.is_materialized());
        assert_eq!(constructions.load(Ordering::SeqCst), 0);

        // First access constructs; later accesses reuse the instance.
        let first = proxy.downcast::<Gadget>()?;
        let second = proxy.downcast::<Gadget>()?;
        assert_eq!(first.id, 99);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(constructions.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[test]
    fn deferred_failure_surfaces_at_first_access() -> anyhow::Result<()> {
        let descriptor = Arc::new(
            TypeDescriptor::builder::<Gadget>()
                .constructor(Vec::new(), |_| anyhow::bail!("deferred boom"))
                .build(),
        );
        let mut request = ConstructionRequest::new(descriptor, service()).lazy(true);

        // Proxy creation itself does not fail.
        let outcome = CreateLazyTask::new().execute(&mut request)?;
        assert!(outcome.is_resolved());

        let Some(Constructed::Lazy(proxy)) = request.result() else {
            panic!("expected lazy result");
        };
        let err = proxy.materialize().unwrap_err();
        assert!(matches!(err, ConstructionError::ConstructionFailed { .. }));
        assert!(err.to_string().contains("deferred boom"));
        assert!(!proxy.is_materialized());
        Ok(())
    }
}

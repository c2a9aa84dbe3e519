//! Per-attempt construction request and the pipeline product.
//!
//! A `ConstructionRequest` is created by the orchestrator for one attempt,
//! flows through the task chain, and is discarded afterwards. Its result
//! slot enforces first-successful-task-wins: once set it is never
//! overwritten, and every task treats a set result as a skip condition.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::arguments::ArgumentValue;
use crate::descriptor::TypeDescriptor;
use crate::errors::ConstructionError;
use crate::proxy::LazyProxy;

/// A fully constructed (and mapped) instance, shared across callers.
pub type SharedInstance = Arc<dyn Any + Send + Sync>;

/// Opaque handle to the owning service, passed through to the mapping
/// callback untouched.
pub type ServiceContext = Arc<dyn Any + Send + Sync>;

/// The sharable slice of a request needed to perform construction, possibly
/// deferred: unmaterialized proxies own one, and the mapping callback
/// receives one.
#[derive(Clone)]
pub struct CreationContext {
    pub descriptor: Arc<TypeDescriptor>,
    pub arguments: Vec<ArgumentValue>,
    pub service: ServiceContext,
    pub is_lazy: bool,
}

impl fmt::Debug for CreationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreationContext")
            .field("type_name", &self.descriptor.type_name())
            .field("arguments", &self.arguments.len())
            .field("is_lazy", &self.is_lazy)
            .finish()
    }
}

/// One construction attempt flowing through the task chain.
pub struct ConstructionRequest {
    descriptor: Option<Arc<TypeDescriptor>>,
    arguments: Vec<ArgumentValue>,
    is_lazy: bool,
    service: ServiceContext,
    result: Option<Constructed>,
}

impl ConstructionRequest {
    pub fn new(descriptor: Arc<TypeDescriptor>, service: ServiceContext) -> Self {
        Self {
            descriptor: Some(descriptor),
            arguments: Vec::new(),
            is_lazy: false,
            service,
            result: None,
        }
    }

    /// A request whose target type was never resolved; every task skips it.
    pub fn unresolved_target(service: ServiceContext) -> Self {
        Self {
            descriptor: None,
            arguments: Vec::new(),
            is_lazy: false,
            service,
            result: None,
        }
    }

    pub fn with_arguments(mut self, arguments: Vec<ArgumentValue>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Request lazy (proxy) construction instead of direct construction.
    pub fn lazy(mut self, is_lazy: bool) -> Self {
        self.is_lazy = is_lazy;
        self
    }

    pub fn descriptor(&self) -> Option<&Arc<TypeDescriptor>> {
        self.descriptor.as_ref()
    }

    pub fn arguments(&self) -> &[ArgumentValue] {
        &self.arguments
    }

    pub fn is_lazy(&self) -> bool {
        self.is_lazy
    }

    pub fn service(&self) -> &ServiceContext {
        &self.service
    }

    pub fn result(&self) -> Option<&Constructed> {
        self.result.as_ref()
    }

    pub fn take_result(&mut self) -> Option<Constructed> {
        self.result.take()
    }

    /// Record a result. A result that is already present stays; later
    /// writes are ignored rather than overwriting it.
    pub fn set_result(&mut self, constructed: Constructed) {
        if self.result.is_none() {
            self.result = Some(constructed);
        }
    }

    /// Snapshot the context a (possibly deferred) construction needs.
    /// `None` when the target type was never resolved.
    pub fn creation_context(&self) -> Option<CreationContext> {
        self.descriptor.as_ref().map(|descriptor| CreationContext {
            descriptor: Arc::clone(descriptor),
            arguments: self.arguments.clone(),
            service: Arc::clone(&self.service),
            is_lazy: self.is_lazy,
        })
    }
}

impl fmt::Debug for ConstructionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructionRequest")
            .field(
                "type_name",
                &self.descriptor.as_ref().map(|d| d.type_name()),
            )
            .field("arguments", &self.arguments.len())
            .field("is_lazy", &self.is_lazy)
            .field("resolved", &self.result.is_some())
            .finish()
    }
}

/// What a construction task produced: a ready instance, or a proxy that
/// materializes one on first access.
#[derive(Clone)]
pub enum Constructed {
    Direct(SharedInstance),
    Lazy(Arc<LazyProxy>),
}

impl Constructed {
    /// The underlying instance, forcing materialization for lazy results.
    pub fn instance(&self) -> Result<SharedInstance, ConstructionError> {
        match self {
            Constructed::Direct(instance) => Ok(Arc::clone(instance)),
            Constructed::Lazy(proxy) => proxy.materialize(),
        }
    }

    /// Typed access to the underlying instance, forcing materialization.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Result<Arc<T>, ConstructionError> {
        let expected = std::any::type_name::<T>();
        self.instance()?.downcast::<T>().map_err(|_| {
            ConstructionError::failed(
                expected,
                anyhow::anyhow!("constructed instance is not of type {expected}"),
            )
        })
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, Constructed::Lazy(_))
    }
}

impl fmt::Debug for Constructed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constructed::Direct(_) => f.write_str("Constructed::Direct"),
            Constructed::Lazy(proxy) => f
                .debug_tuple("Constructed::Lazy")
                .field(&proxy.target_type_name())
                .finish(),
        }
    }
}

//! Object construction stage of a configuration-driven mapping pipeline.
//!
//! Given a `TypeDescriptor` and a list of runtime arguments, the tasks here
//! produce a fully-initialized instance, either eagerly
//! (`CreateConcreteTask`) or behind a lazily-materializing proxy
//! (`CreateLazyTask`). Constructor lookups are compiled once per argument
//! signature and cached on the descriptor, so repeated constructions of the
//! same shape are a single closure call.
//!
//! The core is synchronous and in-process: it runs on whatever thread the
//! outer pipeline uses and introduces no threads or queues of its own.
//! Which concrete type to construct, and what values get mapped onto it
//! afterwards, belong to the neighbouring pipeline stages; this crate only
//! invokes the descriptor's mapping callback.

mod arguments;
mod descriptor;
mod errors;
mod pipeline;
mod proxy;
mod request;
mod resolver;
pub mod tasks;

pub use arguments::{describe_arguments, signature_of, ArgumentValue, Signature};
pub use descriptor::{param, ParamType, TypeDescriptor, TypeDescriptorBuilder, TypeKind};
pub use errors::ConstructionError;
pub use pipeline::ConstructionPipeline;
pub use proxy::LazyProxy;
pub use request::{
    Constructed, ConstructionRequest, CreationContext, ServiceContext, SharedInstance,
};
pub use resolver::{resolve, ConstructorInvoker, DEFAULT_MAX_CONSTRUCTOR_ARGS};
pub use tasks::{ConstructionTask, CreateConcreteTask, CreateLazyTask, TaskOutcome};

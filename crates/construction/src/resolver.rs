//! Constructor resolution and the signature-keyed invoker cache.
//!
//! First resolution for a given (descriptor, signature) pair matches the
//! runtime argument types against the registered constructors and compiles
//! a reusable invoker; every later resolution for the same shape is a cache
//! read. Cache population is at-least-once and idempotent, so concurrent
//! resolvers need no coordination beyond the descriptor's lock.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::arguments::{describe_arguments, signature_of, ArgumentValue, Signature};
use crate::descriptor::{ConstructorFn, TypeDescriptor};
use crate::errors::ConstructionError;

/// Default ceiling on constructor arguments, bounding invoker-cache growth.
/// Override per descriptor via `TypeDescriptorBuilder::max_constructor_args`.
pub const DEFAULT_MAX_CONSTRUCTOR_ARGS: usize = 10;

/// A compiled, reusable constructor invocation bound to one signature.
///
/// Lives as long as its owning `TypeDescriptor`; invocation is a single
/// closure call, no per-call constructor lookup.
pub struct ConstructorInvoker {
    type_name: &'static str,
    signature: Signature,
    factory: ConstructorFn,
}

impl ConstructorInvoker {
    pub(crate) fn new(type_name: &'static str, signature: Signature, factory: ConstructorFn) -> Self {
        Self {
            type_name,
            signature,
            factory,
        }
    }

    pub fn signature(&self) -> &[TypeId] {
        &self.signature
    }

    /// Produce a fresh instance. Factory failures come back wrapped as
    /// `ConstructionFailed` with the target type name attached.
    pub fn invoke(
        &self,
        arguments: &[ArgumentValue],
    ) -> Result<Box<dyn Any + Send + Sync>, ConstructionError> {
        (self.factory)(arguments).map_err(|source| ConstructionError::failed(self.type_name, source))
    }
}

impl fmt::Debug for ConstructorInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInvoker")
            .field("type_name", &self.type_name)
            .field("arity", &self.signature.len())
            .finish()
    }
}

/// Resolve the invoker for the given argument list, caching on the descriptor.
pub fn resolve(
    descriptor: &TypeDescriptor,
    arguments: &[ArgumentValue],
) -> Result<Arc<ConstructorInvoker>, ConstructionError> {
    if arguments.is_empty() {
        return descriptor
            .default_invoker_cell()
            .get_or_try_init(|| build_default_invoker(descriptor))
            .cloned();
    }

    let limit = descriptor.max_constructor_args();
    if arguments.len() > limit {
        return Err(ConstructionError::TooManyArguments {
            count: arguments.len(),
            limit,
        });
    }

    let signature = signature_of(arguments);

    // Fast path: repeated constructions of the same shape skip matching.
    if let Some(invoker) = descriptor.cached_invoker(&signature) {
        debug!(type_name = descriptor.type_name(), "invoker cache hit");
        return Ok(invoker);
    }

    let spec = descriptor
        .constructors()
        .iter()
        .find(|candidate| candidate.matches(&signature))
        .ok_or_else(|| ConstructionError::NoMatchingConstructor {
            type_name: descriptor.type_name().to_string(),
            signature: describe_arguments(arguments),
        })?;

    let invoker = Arc::new(ConstructorInvoker::new(
        descriptor.type_name(),
        signature.clone(),
        spec.factory(),
    ));
    debug!(
        type_name = descriptor.type_name(),
        arity = arguments.len(),
        "compiled constructor invoker"
    );
    Ok(descriptor.publish_invoker(signature, invoker))
}

fn build_default_invoker(
    descriptor: &TypeDescriptor,
) -> Result<Arc<ConstructorInvoker>, ConstructionError> {
    // Multiple parameterless constructors are a configuration error caught
    // upstream; the first registered one applies.
    let spec = descriptor
        .constructors()
        .iter()
        .find(|candidate| candidate.is_parameterless())
        .ok_or_else(|| ConstructionError::NoMatchingConstructor {
            type_name: descriptor.type_name().to_string(),
            signature: String::new(),
        })?;

    debug!(type_name = descriptor.type_name(), "compiled zero-argument invoker");
    Ok(Arc::new(ConstructorInvoker::new(
        descriptor.type_name(),
        Signature::default(),
        spec.factory(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::param;

    #[derive(Debug, Default, PartialEq)]
    struct Pair {
        a: i32,
        b: i32,
    }

    fn pair_descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Pair>()
            .constructor(Vec::new(), |_| Ok(Pair::default()))
            .constructor(vec![param::<i32>(), param::<i32>()], |args| {
                Ok(Pair {
                    a: args[0].cloned::<i32>().unwrap_or_default(),
                    b: args[1].cloned::<i32>().unwrap_or_default(),
                })
            })
            .build()
    }

    #[test]
    fn second_resolution_hits_the_cache() -> anyhow::Result<()> {
        let descriptor = pair_descriptor();
        let args = [ArgumentValue::new(1i32), ArgumentValue::new(2i32)];

        let first = resolve(&descriptor, &args)?;
        let second = resolve(&descriptor, &args)?;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(descriptor.cached_signature_count(), 1);
        Ok(())
    }

    #[test]
    fn zero_argument_invoker_is_built_once() -> anyhow::Result<()> {
        let descriptor = pair_descriptor();

        let first = resolve(&descriptor, &[])?;
        let second = resolve(&descriptor, &[])?;

        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.signature().is_empty());

        let pair = first.invoke(&[])?;
        assert_eq!(pair.downcast_ref::<Pair>(), Some(&Pair::default()));
        Ok(())
    }

    #[test]
    fn unmatched_signature_is_rejected() {
        let descriptor = pair_descriptor();
        let args = [ArgumentValue::new(1.0f64)];

        let err = resolve(&descriptor, &args).unwrap_err();
        assert!(matches!(err, ConstructionError::NoMatchingConstructor { .. }));
        assert!(err.to_string().contains("f64"));
    }

    #[test]
    fn argument_count_above_limit_is_rejected() {
        let descriptor = pair_descriptor();
        let args: Vec<ArgumentValue> = (0..11).map(ArgumentValue::new).collect();

        let err = resolve(&descriptor, &args).unwrap_err();
        assert!(matches!(
            err,
            ConstructionError::TooManyArguments { count: 11, limit: 10 }
        ));
    }

    #[test]
    fn limit_is_configurable_per_descriptor() {
        let descriptor = TypeDescriptor::builder::<Pair>()
            .max_constructor_args(2)
            .constructor(vec![param::<i32>(), param::<i32>()], |args| {
                Ok(Pair {
                    a: args[0].cloned::<i32>().unwrap_or_default(),
                    b: args[1].cloned::<i32>().unwrap_or_default(),
                })
            })
            .build();

        let within: Vec<ArgumentValue> = (0..2).map(ArgumentValue::new).collect();
        assert!(resolve(&descriptor, &within).is_ok());

        let above: Vec<ArgumentValue> = (0..3).map(ArgumentValue::new).collect();
        let err = resolve(&descriptor, &above).unwrap_err();
        assert!(matches!(
            err,
            ConstructionError::TooManyArguments { count: 3, limit: 2 }
        ));
    }

    #[test]
    fn zero_arg_resolution_without_parameterless_constructor_fails() {
        let descriptor = TypeDescriptor::builder::<Pair>()
            .constructor(vec![param::<i32>(), param::<i32>()], |args| {
                Ok(Pair {
                    a: args[0].cloned::<i32>().unwrap_or_default(),
                    b: args[1].cloned::<i32>().unwrap_or_default(),
                })
            })
            .build();

        let err = resolve(&descriptor, &[]).unwrap_err();
        assert!(matches!(err, ConstructionError::NoMatchingConstructor { .. }));
    }
}

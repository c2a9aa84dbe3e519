//! Type-erased constructor arguments and ordered type signatures.
//!
//! Arguments cross the pipeline boundary without compile-time types, so each
//! value carries its `TypeId` and type name alongside an `Arc<dyn Any>`.
//! The ordered list of argument `TypeId`s forms the signature that keys the
//! constructor-invoker cache.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A single runtime constructor argument.
///
/// Cheap to clone: the payload is shared behind an `Arc`. The captured
/// `TypeId` is the one used for signature matching, so an argument built
/// from a `Box<dyn Any>` would match as the box type, not the payload;
/// always construct from the concrete value.
#[derive(Clone)]
pub struct ArgumentValue {
    value: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl ArgumentValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the payload as `T`, or `None` on type mismatch.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Extract an owned copy of the payload.
    pub fn cloned<T: Any + Clone>(&self) -> Option<T> {
        self.value.downcast_ref::<T>().cloned()
    }
}

impl fmt::Debug for ArgumentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentValue")
            .field("type", &self.type_name)
            .finish()
    }
}

/// Ordered parameter-type signature used as the invoker cache key.
pub type Signature = Box<[TypeId]>;

/// Compute the ordered runtime-type signature of an argument list.
pub fn signature_of(arguments: &[ArgumentValue]) -> Signature {
    arguments.iter().map(ArgumentValue::type_id).collect()
}

/// Human-readable rendering of an argument list's types, for error messages.
pub fn describe_arguments(arguments: &[ArgumentValue]) -> String {
    arguments
        .iter()
        .map(|a| a.type_name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_preserves_type_identity() {
        let arg = ArgumentValue::new(42i32);
        assert_eq!(arg.type_id(), TypeId::of::<i32>());
        assert_eq!(arg.downcast_ref::<i32>(), Some(&42));
        assert!(arg.downcast_ref::<u32>().is_none());
    }

    #[test]
    fn cloned_extracts_owned_value() {
        let arg = ArgumentValue::new(String::from("hello"));
        assert_eq!(arg.cloned::<String>().as_deref(), Some("hello"));
        assert_eq!(arg.cloned::<i32>(), None);
    }

    #[test]
    fn signature_is_ordered() {
        let args = [ArgumentValue::new(1i32), ArgumentValue::new("s".to_string())];
        let sig = signature_of(&args);
        assert_eq!(sig.len(), 2);
        assert_eq!(sig[0], TypeId::of::<i32>());
        assert_eq!(sig[1], TypeId::of::<String>());

        let swapped = [ArgumentValue::new("s".to_string()), ArgumentValue::new(1i32)];
        assert_ne!(sig, signature_of(&swapped));
    }

    #[test]
    fn describe_joins_type_names() {
        let args = [ArgumentValue::new(1i32), ArgumentValue::new(2i64)];
        assert_eq!(describe_arguments(&args), "i32, i64");
    }
}

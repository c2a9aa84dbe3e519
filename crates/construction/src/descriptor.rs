//! Target-type descriptors and their constructor registry.
//!
//! A `TypeDescriptor` is owned by the configuration layer and read by the
//! construction core. Rust has no runtime constructor discovery, so the
//! configuration layer registers each constructor up front as a formal
//! parameter list plus a factory closure; the resolver then matches runtime
//! argument signatures against the registered lists and caches compiled
//! invokers directly on the descriptor.
//!
//! Cache discipline: both cache slots are write-once per key. Concurrent
//! populators for the same signature all produce equivalent invokers, so a
//! lost publication race is resolved by adopting the winner's entry.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::Result;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::arguments::{ArgumentValue, Signature};
use crate::request::{CreationContext, ServiceContext};
use crate::resolver::{ConstructorInvoker, DEFAULT_MAX_CONSTRUCTOR_ARGS};

/// What category of type the descriptor targets.
///
/// Interface and sealed types must be resolved to a concrete type by an
/// earlier pipeline stage; construction tasks skip them without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Concrete,
    Interface,
    Sealed,
}

impl TypeKind {
    pub fn constructible(&self) -> bool {
        matches!(self, TypeKind::Concrete)
    }
}

/// One formal constructor parameter: its `TypeId` plus a name for messages.
#[derive(Debug, Clone, Copy)]
pub struct ParamType {
    pub(crate) id: TypeId,
    pub(crate) name: &'static str,
}

/// Describe a formal parameter of type `T`.
pub fn param<T: Any>() -> ParamType {
    ParamType {
        id: TypeId::of::<T>(),
        name: std::any::type_name::<T>(),
    }
}

/// Type-erased factory: arguments in, freshly constructed instance out.
pub(crate) type ConstructorFn =
    Arc<dyn Fn(&[ArgumentValue]) -> Result<Box<dyn Any + Send + Sync>> + Send + Sync>;

/// Post-construction property-mapping callback (owned by the mapping stage).
pub(crate) type MapPropertiesFn = Arc<
    dyn Fn(&mut (dyn Any + Send + Sync), &ServiceContext, &CreationContext) -> Result<()>
        + Send
        + Sync,
>;

/// A registered constructor: ordered formal parameters and its factory.
pub(crate) struct ConstructorSpec {
    params: Box<[ParamType]>,
    factory: ConstructorFn,
}

impl ConstructorSpec {
    pub(crate) fn matches(&self, signature: &[TypeId]) -> bool {
        self.params.len() == signature.len()
            && self.params.iter().zip(signature).all(|(p, id)| p.id == *id)
    }

    pub(crate) fn is_parameterless(&self) -> bool {
        self.params.is_empty()
    }

    pub(crate) fn factory(&self) -> ConstructorFn {
        Arc::clone(&self.factory)
    }
}

/// Immutable-after-build descriptor of a constructible type.
///
/// The two invoker cache slots are the only interior mutability: a
/// `OnceCell` for the zero-argument invoker and a signature-keyed map for
/// parameterized ones. Once populated for a signature, an entry is never
/// replaced by a different invoker.
pub struct TypeDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    kind: TypeKind,
    max_constructor_args: usize,
    constructors: Vec<ConstructorSpec>,
    map_properties: Option<MapPropertiesFn>,
    default_invoker: OnceCell<Arc<ConstructorInvoker>>,
    invokers: RwLock<HashMap<Signature, Arc<ConstructorInvoker>>>,
}

impl TypeDescriptor {
    pub fn builder<T: Any + Send + Sync>() -> TypeDescriptorBuilder<T> {
        TypeDescriptorBuilder {
            kind: TypeKind::Concrete,
            max_constructor_args: DEFAULT_MAX_CONSTRUCTOR_ARGS,
            constructors: Vec::new(),
            map_properties: None,
            _marker: PhantomData,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn max_constructor_args(&self) -> usize {
        self.max_constructor_args
    }

    pub(crate) fn constructors(&self) -> &[ConstructorSpec] {
        &self.constructors
    }

    pub(crate) fn map_properties(&self) -> Option<MapPropertiesFn> {
        self.map_properties.as_ref().map(Arc::clone)
    }

    pub(crate) fn default_invoker_cell(&self) -> &OnceCell<Arc<ConstructorInvoker>> {
        &self.default_invoker
    }

    pub(crate) fn cached_invoker(&self, signature: &[TypeId]) -> Option<Arc<ConstructorInvoker>> {
        self.invokers.read().get(signature).cloned()
    }

    /// Publish an invoker for a signature, adopting an already-published
    /// equivalent if another thread won the race.
    pub(crate) fn publish_invoker(
        &self,
        signature: Signature,
        invoker: Arc<ConstructorInvoker>,
    ) -> Arc<ConstructorInvoker> {
        let mut invokers = self.invokers.write();
        Arc::clone(invokers.entry(signature).or_insert(invoker))
    }

    #[cfg(test)]
    pub(crate) fn cached_signature_count(&self) -> usize {
        self.invokers.read().len()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .field("constructors", &self.constructors.len())
            .finish()
    }
}

/// Builder for `TypeDescriptor`, typed to the target `T` so registered
/// factories and the mapping callback stay statically checked.
pub struct TypeDescriptorBuilder<T> {
    kind: TypeKind,
    max_constructor_args: usize,
    constructors: Vec<ConstructorSpec>,
    map_properties: Option<MapPropertiesFn>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> TypeDescriptorBuilder<T> {
    pub fn kind(mut self, kind: TypeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Override the constructor-argument ceiling (default 10).
    pub fn max_constructor_args(mut self, limit: usize) -> Self {
        self.max_constructor_args = limit;
        self
    }

    /// Register a constructor with the given formal parameter list.
    ///
    /// An empty `params` list registers the zero-argument constructor.
    pub fn constructor<F>(mut self, params: Vec<ParamType>, factory: F) -> Self
    where
        F: Fn(&[ArgumentValue]) -> Result<T> + Send + Sync + 'static,
    {
        let erased: ConstructorFn = Arc::new(move |args| {
            factory(args).map(|value| Box::new(value) as Box<dyn Any + Send + Sync>)
        });
        self.constructors.push(ConstructorSpec {
            params: params.into_boxed_slice(),
            factory: erased,
        });
        self
    }

    /// Attach the property-mapping callback run after every construction.
    pub fn with_mapping<F>(mut self, map: F) -> Self
    where
        F: Fn(&mut T, &ServiceContext, &CreationContext) -> Result<()> + Send + Sync + 'static,
    {
        self.map_properties = Some(Arc::new(move |instance, service, context| {
            let typed = instance
                .downcast_mut::<T>()
                .ok_or_else(|| anyhow::anyhow!("mapping callback received unexpected instance type"))?;
            map(typed, service, context)
        }));
        self
    }

    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            kind: self.kind,
            max_constructor_args: self.max_constructor_args,
            constructors: self.constructors,
            map_properties: self.map_properties,
            default_invoker: OnceCell::new(),
            invokers: RwLock::new(HashMap::new()),
        }
    }
}

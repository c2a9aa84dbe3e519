//! Lazily-materializing stand-in for a constructed instance.
//!
//! A proxy holds the creation context needed to run the full direct
//! construction later, plus a one-shot cell for the outcome. The cell's
//! initialization lock is what turns N concurrent first accesses into
//! exactly one construction with every caller observing the same instance.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::errors::ConstructionError;
use crate::request::{CreationContext, SharedInstance};
use crate::tasks::construct;

pub struct LazyProxy {
    context: CreationContext,
    instance: OnceCell<SharedInstance>,
}

impl LazyProxy {
    pub(crate) fn new(context: CreationContext) -> Self {
        Self {
            context,
            instance: OnceCell::new(),
        }
    }

    pub fn target_type_name(&self) -> &'static str {
        self.context.descriptor.type_name()
    }

    pub fn is_materialized(&self) -> bool {
        self.instance.get().is_some()
    }

    /// The real instance, constructing and mapping it on first access.
    ///
    /// Construction runs at most once; a failure is reported to the caller
    /// that triggered it and leaves the cell empty, so the proxy never holds
    /// a half-built instance.
    pub fn materialize(&self) -> Result<SharedInstance, ConstructionError> {
        self.instance
            .get_or_try_init(|| {
                debug!(
                    type_name = self.target_type_name(),
                    "materializing lazy proxy"
                );
                construct(&self.context)
            })
            .cloned()
    }

    /// Typed access, forcing materialization.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Result<Arc<T>, ConstructionError> {
        let expected = std::any::type_name::<T>();
        self.materialize()?.downcast::<T>().map_err(|_| {
            ConstructionError::failed(
                expected,
                anyhow::anyhow!("materialized instance is not of type {expected}"),
            )
        })
    }
}

impl fmt::Debug for LazyProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyProxy")
            .field("type_name", &self.target_type_name())
            .field("materialized", &self.is_materialized())
            .finish()
    }
}

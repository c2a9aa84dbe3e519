//! Error taxonomy for the construction core.
//!
//! Skip conditions (interface/sealed target, already-resolved request) are
//! defined no-ops, not errors. Everything that does fail is wrapped into one
//! of the variants below before it leaves a task.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConstructionError {
    /// No registered constructor accepts the given argument-type signature.
    #[error("no constructor for type {type_name} accepting ({signature})")]
    NoMatchingConstructor {
        type_name: String,
        signature: String,
    },

    /// Argument count exceeds the descriptor's ceiling. The ceiling bounds
    /// invoker-cache growth; it is configurable per descriptor.
    #[error("constructor argument count {count} exceeds the limit of {limit}")]
    TooManyArguments { count: usize, limit: usize },

    /// Constructor invocation or property mapping failed; carries the
    /// target type name and the original cause.
    #[error("failed to construct type {type_name}: {source}")]
    ConstructionFailed {
        type_name: String,
        source: anyhow::Error,
    },
}

impl ConstructionError {
    pub(crate) fn failed(type_name: &str, source: anyhow::Error) -> Self {
        Self::ConstructionFailed {
            type_name: type_name.to_string(),
            source,
        }
    }
}

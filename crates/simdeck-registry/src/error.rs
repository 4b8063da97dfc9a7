//! Registry errors

use crate::Arity;
use thiserror::Error;

/// Registry result type
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("block class '{0}' is not registered")]
    ClassNotRegistered(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("function '{0}' is already registered")]
    DuplicateFunction(String),

    #[error("function '{name}' expects {expected} argument(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: Arity,
        found: usize,
    },
}

//! Scope errors

use simdeck_lexer::SourceLocation;
use thiserror::Error;

/// Scope result type
pub type Result<T> = std::result::Result<T, ScopeError>;

/// Scope errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// No binding in the scope or any ancestor
    #[error("unresolved variable '{name}' in scope '{scope}'")]
    UnresolvedVariable { name: String, scope: String },

    /// Same-scope redefinition under `RedefinitionPolicy::Reject`
    #[error("variable '{name}' is already defined at {first}")]
    DuplicateVariable { name: String, first: SourceLocation },
}

//! Parser configuration.

use serde::{Deserialize, Serialize};
use simdeck_lexer::DEFAULT_MAX_INCLUDE_DEPTH;
use simdeck_scope::RedefinitionPolicy;

/// Class name of the implicit root block when none is configured.
pub const DEFAULT_ROOT_CLASS: &str = "deck";

/// Nesting limit for blocks and for expressions when none is configured.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

/// Options for a single parse.
///
/// Every field has a default, so a partial JSON object is enough:
///
/// ```
/// # use simdeck_parser::ParserConfig;
/// # use simdeck_scope::RedefinitionPolicy;
/// let config: ParserConfig = serde_json::from_str(r#"{ "redefinition": "reject" }"#).unwrap();
/// assert_eq!(config.root_class, "deck");
/// assert_eq!(config.redefinition, RedefinitionPolicy::Reject);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Class of the implicit root block
    pub root_class: String,
    /// Same-block reassignment behavior
    pub redefinition: RedefinitionPolicy,
    /// Maximum nesting of `include` directives
    pub max_include_depth: usize,
    /// Maximum nesting of blocks, and separately of parentheses, calls and
    /// prefix operators within one expression
    pub max_nesting_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            root_class: DEFAULT_ROOT_CLASS.to_string(),
            redefinition: RedefinitionPolicy::default(),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl ParserConfig {
    pub fn with_root_class(mut self, root_class: impl Into<String>) -> Self {
        self.root_class = root_class.into();
        self
    }

    pub fn with_redefinition(mut self, policy: RedefinitionPolicy) -> Self {
        self.redefinition = policy;
        self
    }

    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.root_class, "deck");
        assert_eq!(config.redefinition, RedefinitionPolicy::Overwrite);
        assert_eq!(config.max_include_depth, DEFAULT_MAX_INCLUDE_DEPTH);
        assert_eq!(config.max_nesting_depth, DEFAULT_MAX_NESTING_DEPTH);
    }

    #[test]
    fn test_builders() {
        let config = ParserConfig::default()
            .with_root_class("root")
            .with_redefinition(RedefinitionPolicy::Reject)
            .with_max_include_depth(2)
            .with_max_nesting_depth(8);
        assert_eq!(config.root_class, "root");
        assert_eq!(config.redefinition, RedefinitionPolicy::Reject);
        assert_eq!(config.max_include_depth, 2);
        assert_eq!(config.max_nesting_depth, 8);
    }

    #[test]
    fn test_empty_json_is_default() {
        let config: ParserConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ParserConfig::default());
    }
}

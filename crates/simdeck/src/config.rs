//! Deck configuration, loadable from JSON.

use crate::error::{DeckError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use simdeck_parser::ParserConfig;
use simdeck_registry::{BlockClassRegistry, DuplicatePolicy, FunctionRegistry};
use std::fs;
use std::path::Path;

/// Everything needed to set up a [`Deck`](crate::Deck).
///
/// ```
/// # use simdeck::DeckConfig;
/// let config = DeckConfig::from_json(r#"{
///     "root_class": "root",
///     "restrict": true,
///     "classes": { "root": ["region"], "region": [] }
/// }"#).unwrap();
/// assert_eq!(config.parser.root_class, "root");
/// assert_eq!(config.classes["root"], vec!["region".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    #[serde(flatten)]
    pub parser: ParserConfig,
    /// Enforce registered nesting rules
    pub restrict: bool,
    /// Duplicate function registration behavior
    pub function_policy: DuplicatePolicy,
    /// Preload the standard math functions
    pub builtins: bool,
    /// Block classes to register, each with its allowed children
    pub classes: IndexMap<String, Vec<String>>,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            restrict: true,
            function_policy: DuplicatePolicy::default(),
            builtins: true,
            classes: IndexMap::new(),
        }
    }
}

impl DeckConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DeckError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Class registry described by this configuration.
    pub fn class_registry(&self) -> BlockClassRegistry {
        let mut registry = BlockClassRegistry::new();
        registry.set_restrict(self.restrict);
        for (class, children) in &self.classes {
            let descriptor = registry.register_class(class.as_str());
            for child in children {
                descriptor.allow(child.as_str());
            }
        }
        registry
    }

    /// Function registry described by this configuration.
    pub fn function_registry(&self) -> FunctionRegistry {
        let mut registry = FunctionRegistry::with_policy(self.function_policy);
        if self.builtins {
            registry.load_builtins();
        }
        registry
    }
}

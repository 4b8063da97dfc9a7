// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Block-structured input decks for simulation setups.
//!
//! A deck is a tree of named blocks holding numeric variables:
//!
//! ```text
//! // main.deck
//! g = 9.81;
//! fluid water {
//!     rho = 1000;
//!     p_hydro = rho * g * 10;
//! }
//! ```
//!
//! [`Deck`] bundles the block class rules, the function table and the parser
//! settings, and parses decks from strings or files with `include` support.
//!
//! ```
//! use simdeck::Deck;
//!
//! let mut deck = Deck::new();
//! deck.classes_mut().set_restrict(false);
//!
//! let storage = deck
//!     .parse_str("main.deck", "g = 9.81; fluid water { rho = 1000; w = rho * g; }")
//!     .unwrap();
//! assert_eq!(storage.value("water", "w"), Some(9810.0));
//! ```

mod config;
mod diagnostic;
mod error;
mod loader;
mod logging;

pub use config::DeckConfig;
pub use diagnostic::DiagnosticFormatter;
pub use error::{DeckError, Result};
pub use loader::FileLoader;
pub use logging::{init_logging, DEFAULT_LOG_FILTER};

pub use simdeck_lexer::{
    LexError, LoadedSource, MemoryLoader, SourceLoader, SourceLocation, SourceMap, Span, Token,
};
pub use simdeck_parser::{
    evaluate_str, parse_deck, Note, ParseError, ParseErrorKind, Parser, ParserConfig,
    VariableStorage, DEFAULT_ROOT_CLASS,
};
pub use simdeck_registry::{
    Arity, BlockClassDescriptor, BlockClassRegistry, DuplicatePolicy, FunctionRegistry,
    RegistryError, BUILTINS,
};
pub use simdeck_scope::{
    BlockSnapshot, NodeId, RedefinitionPolicy, ScopeError, ScopeNode, ScopeTree, Variable,
};

use std::fs;
use std::path::Path;
use tracing::{info, instrument};

/// Registries plus parser settings, reusable across parses.
#[derive(Clone)]
pub struct Deck {
    classes: BlockClassRegistry,
    functions: FunctionRegistry,
    config: ParserConfig,
    loader: FileLoader,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl Deck {
    /// Restricted class registry, builtin functions, default parser settings.
    pub fn new() -> Self {
        Self {
            classes: BlockClassRegistry::new(),
            functions: FunctionRegistry::with_builtins(),
            config: ParserConfig::default(),
            loader: FileLoader::new(),
        }
    }

    pub fn from_config(config: &DeckConfig) -> Self {
        Self {
            classes: config.class_registry(),
            functions: config.function_registry(),
            config: config.parser.clone(),
            loader: FileLoader::new(),
        }
    }

    /// Load a JSON configuration file.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_config(&DeckConfig::from_file(path)?))
    }

    /// Directory searched for includes not found next to the including file.
    pub fn with_search_path(mut self, dir: impl Into<std::path::PathBuf>) -> Self {
        self.loader = self.loader.with_search_path(dir);
        self
    }

    pub fn classes(&self) -> &BlockClassRegistry {
        &self.classes
    }

    pub fn classes_mut(&mut self) -> &mut BlockClassRegistry {
        &mut self.classes
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn functions_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.functions
    }

    pub fn parser_config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn parser_config_mut(&mut self) -> &mut ParserConfig {
        &mut self.config
    }

    /// Allow `child` blocks inside the registered class `parent`.
    pub fn allow_child(&mut self, parent: &str, child: &str) -> Result<()> {
        self.classes.add_allowed_child(parent, child)?;
        Ok(())
    }

    /// Register a numeric function under the current duplicate policy.
    pub fn register_function<F>(&mut self, name: &str, arity: Arity, f: F) -> Result<()>
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        self.functions.register(name, arity, f)?;
        Ok(())
    }

    /// Parse deck text; includes are read from disk relative to `name`.
    pub fn parse_str(&self, name: &str, text: &str) -> Result<VariableStorage> {
        self.parse_str_with(name, text, self.loader.clone())
    }

    /// Parse deck text, resolving includes through `loader`.
    pub fn parse_str_with(
        &self,
        name: &str,
        text: &str,
        loader: impl SourceLoader,
    ) -> Result<VariableStorage> {
        let mut parser = Parser::new(name, text, &self.classes, &self.functions)
            .with_config(self.config.clone())
            .with_loader(loader);
        match parser.run() {
            Ok(_) => Ok(parser.into_storage()),
            Err(error) => Err(DeckError::Parse {
                error,
                sources: parser.sources().clone(),
            }),
        }
    }

    /// Read and parse a deck file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<VariableStorage> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DeckError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let storage = self.parse_str(&path.display().to_string(), &text)?;
        info!(
            blocks = storage.tree().len() - 1,
            files = storage.sources().file_count(),
            "deck loaded"
        );
        Ok(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_builtins() {
        let deck = Deck::new();
        assert!(deck.functions().is_known("sqrt"));
        assert!(deck.classes().is_restricted());
        assert_eq!(deck.parser_config().root_class, DEFAULT_ROOT_CLASS);
    }

    #[test]
    fn test_allow_child_requires_parent() {
        let mut deck = Deck::new();
        let err = deck.allow_child("mesh", "region").unwrap_err();
        assert!(matches!(
            err,
            DeckError::Registry(RegistryError::ClassNotRegistered(_))
        ));

        deck.classes_mut().register_class("mesh");
        deck.allow_child("mesh", "region").unwrap();
        assert!(deck.classes().is_child_allowed("mesh", "region").unwrap());
    }

    #[test]
    fn test_registered_function_is_callable() {
        let mut deck = Deck::new();
        deck.classes_mut().set_restrict(false);
        deck.register_function("twice", Arity::Fixed(1), |args| 2.0 * args[0])
            .unwrap();

        let storage = deck.parse_str("main.deck", "x = twice(21);").unwrap();
        assert_eq!(storage.value("", "x"), Some(42.0));
    }

    #[test]
    fn test_parse_error_keeps_sources() {
        let deck = Deck::new();
        let err = deck.parse_str("main.deck", "x = ;").unwrap_err();
        let parse = err.parse_error().unwrap();
        assert_eq!(parse.kind, ParseErrorKind::Syntax);
        assert!(err.render().contains(" 1 | x = ;\n"));
    }

    #[test]
    fn test_parse_with_memory_loader() {
        let deck = Deck::new();
        let mut loader = MemoryLoader::new();
        loader.insert("consts.deck", "pi2 = 6.28;");
        let storage = deck
            .parse_str_with("main.deck", "include \"consts.deck\"; tau = pi2;", loader)
            .unwrap();
        assert_eq!(storage.value("", "tau"), Some(6.28));
    }
}

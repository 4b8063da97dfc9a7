// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Deck parser: grammar driver, eager expression evaluator and error model.
//!
//! A parse is a single pass over the token stream. Blocks are validated
//! against the [`BlockClassRegistry`] and opened in a [`ScopeTree`] as they
//! are encountered; assignments are evaluated immediately, resolving names
//! through the blocks opened so far. The first error ends the parse.
//!
//! # Example
//!
//! ```
//! use simdeck_parser::parse_deck;
//! use simdeck_registry::{BlockClassRegistry, FunctionRegistry};
//!
//! let mut classes = BlockClassRegistry::new();
//! classes.register_class("root").allow("region");
//! classes.register_class("region");
//! let functions = FunctionRegistry::with_builtins();
//!
//! let deck = "root { x = 2.0; y = sin(x) + 1.0; region r1 { z = x * 2.0; } }";
//! let storage = parse_deck("main.deck", deck, &classes, &functions).unwrap();
//!
//! assert_eq!(storage.value("root.r1", "z"), Some(4.0));
//! assert_eq!(storage.value("root.r1", "x"), Some(2.0));
//! ```

mod config;
mod driver;
mod error;
pub mod expr;
mod stream;

pub use config::{ParserConfig, DEFAULT_MAX_NESTING_DEPTH, DEFAULT_ROOT_CLASS};
pub use error::{Note, ParseError, ParseErrorKind};
pub use expr::{evaluate_str, Evaluator};

use driver::Driver;
use simdeck_lexer::{SourceLoader, SourceMap, TokenSource};
use simdeck_registry::{BlockClassRegistry, FunctionRegistry};
use simdeck_scope::{BlockSnapshot, NodeId, ScopeError, ScopeNode, ScopeTree, Variable};
use std::sync::Arc;
use tracing::{debug, instrument};

/// One-shot parser over a single deck source.
///
/// Registries are borrowed for the lifetime of the parser, so they cannot be
/// changed while a parse is in flight.
pub struct Parser<'a> {
    name: Arc<str>,
    classes: &'a BlockClassRegistry,
    functions: &'a FunctionRegistry,
    config: ParserConfig,
    loader: Option<Box<dyn SourceLoader + 'a>>,
    source: TokenSource,
    tree: ScopeTree,
    outcome: Option<Result<NodeId, ParseError>>,
}

impl<'a> Parser<'a> {
    pub fn new(
        name: impl Into<Arc<str>>,
        text: impl Into<String>,
        classes: &'a BlockClassRegistry,
        functions: &'a FunctionRegistry,
    ) -> Self {
        let name = name.into();
        let config = ParserConfig::default();
        Self {
            source: TokenSource::new(name.clone(), text)
                .with_max_include_depth(config.max_include_depth),
            tree: ScopeTree::new(config.root_class.as_str()),
            name,
            classes,
            functions,
            config,
            loader: None,
            outcome: None,
        }
    }

    /// Replace the configuration. Call before [`Parser::run`].
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.tree = ScopeTree::new(config.root_class.as_str());
        self.source = self.source.with_max_include_depth(config.max_include_depth);
        self.config = config;
        self
    }

    /// Loader used to resolve `include` directives.
    pub fn with_loader(mut self, loader: impl SourceLoader + 'a) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse the deck and return the root node.
    ///
    /// Only the first call does any work; later calls return the same
    /// outcome. On failure the partially built tree stays inspectable via
    /// [`Parser::tree`].
    #[instrument(skip_all, fields(file = %self.name))]
    pub fn run(&mut self) -> Result<NodeId, ParseError> {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }

        let mut driver = Driver::new(
            &mut self.source,
            &mut self.tree,
            self.classes,
            self.functions,
            self.loader.as_deref(),
            &self.config,
        );
        let outcome = driver.run().map(|()| self.tree.root());
        match &outcome {
            Ok(_) => debug!(
                blocks = self.tree.len() - 1,
                files = self.source.sources().file_count(),
                "parse finished"
            ),
            Err(err) => debug!(kind = %err.kind, location = %err.location, "parse stopped"),
        }
        self.outcome = Some(outcome.clone());
        outcome
    }

    /// Tree built so far (complete after a successful run).
    pub fn tree(&self) -> &ScopeTree {
        &self.tree
    }

    /// Every file read so far.
    pub fn sources(&self) -> &SourceMap {
        self.source.sources()
    }

    pub fn into_storage(self) -> VariableStorage {
        VariableStorage {
            tree: self.tree,
            sources: self.source.into_source_map(),
        }
    }
}

/// Result of a parse: the scope tree and every source file read.
#[derive(Debug, Clone)]
pub struct VariableStorage {
    tree: ScopeTree,
    sources: SourceMap,
}

impl VariableStorage {
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn tree(&self) -> &ScopeTree {
        &self.tree
    }

    pub fn node(&self, id: NodeId) -> &ScopeNode {
        self.tree.node(id)
    }

    /// Resolve `name` from `node` with lexical fallback.
    pub fn resolve(&self, node: NodeId, name: &str) -> Result<&Variable, ScopeError> {
        self.tree.resolve(node, name)
    }

    /// Block at a dotted path of instance names (class names for anonymous blocks).
    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.tree.find_path(path)
    }

    /// Value of `name` as seen from the block at `path`.
    pub fn value(&self, path: &str, name: &str) -> Option<f64> {
        let node = self.find(path)?;
        self.resolve(node, name).ok().map(|variable| variable.value)
    }

    pub fn snapshot(&self) -> BlockSnapshot {
        self.tree.snapshot(self.tree.root())
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }
}

/// Parse `text` with the default configuration and no include support.
pub fn parse_deck(
    name: &str,
    text: &str,
    classes: &BlockClassRegistry,
    functions: &FunctionRegistry,
) -> Result<VariableStorage, ParseError> {
    let mut parser = Parser::new(name, text, classes, functions);
    parser.run()?;
    Ok(parser.into_storage())
}

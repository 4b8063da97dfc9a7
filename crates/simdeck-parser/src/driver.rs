//! Statement-level grammar driver.
//!
//! ```text
//! Document   → TopItem* EOF
//! TopItem    → Block | Assignment | Include
//! Block      → ClassName InstanceName? '{' Statement* '}'
//! Statement  → Assignment | Block | Include
//! Assignment → Identifier '=' Expression ';'
//! Include    → 'include' String ';'
//! ```
//!
//! A statement starting with an identifier is classified by the token that
//! follows it: `=` starts an assignment, `{` an anonymous block and another
//! identifier a named block.

use crate::config::ParserConfig;
use crate::error::{Note, ParseError, ParseErrorKind};
use crate::expr::Evaluator;
use crate::stream::TokenSourceExt;
use simdeck_lexer::{Lexeme, SourceLoader, SourceLocation, Span, Token, TokenSource};
use simdeck_registry::{BlockClassRegistry, FunctionRegistry};
use simdeck_scope::{NodeId, ScopeTree, Variable};
use tracing::{debug, trace};

/// A block whose closing brace has not been seen yet.
struct OpenBlock {
    label: String,
    location: SourceLocation,
    span: Span,
}

pub(crate) struct Driver<'p, 'a> {
    source: &'p mut TokenSource,
    tree: &'p mut ScopeTree,
    classes: &'a BlockClassRegistry,
    functions: &'a FunctionRegistry,
    loader: Option<&'p dyn SourceLoader>,
    config: &'p ParserConfig,
    open: Vec<OpenBlock>,
}

impl<'p, 'a> Driver<'p, 'a> {
    pub fn new(
        source: &'p mut TokenSource,
        tree: &'p mut ScopeTree,
        classes: &'a BlockClassRegistry,
        functions: &'a FunctionRegistry,
        loader: Option<&'p dyn SourceLoader>,
        config: &'p ParserConfig,
    ) -> Self {
        Self {
            source,
            tree,
            classes,
            functions,
            loader,
            config,
            open: Vec::new(),
        }
    }

    /// Parse the whole document into the tree.
    pub fn run(&mut self) -> Result<(), ParseError> {
        let root = self.tree.root();
        let result = self.parse_items(root);
        match result {
            Err(err) if err.kind == ParseErrorKind::Syntax && err.found.is_none() => {
                Err(self.unterminated(err))
            }
            other => other,
        }
    }

    /// End of input inside a block is reported against the innermost open block.
    fn unterminated(&self, err: ParseError) -> ParseError {
        let Some(block) = self.open.last() else {
            return err;
        };
        ParseError {
            kind: ParseErrorKind::UnterminatedBlock,
            location: block.location.clone(),
            span: block.span,
            found: None,
            message: format!("block '{}' is not closed before end of input", block.label),
            note: Some(Note {
                message: "input ends here".to_string(),
                location: err.location,
            }),
        }
    }

    /// Items until end of input, or until `}` inside a block.
    fn parse_items(&mut self, node: NodeId) -> Result<(), ParseError> {
        loop {
            match self.source.peek_token()? {
                None => return Ok(()),
                Some(Token::RBrace) if !self.open.is_empty() => return Ok(()),
                Some(Token::Include) => self.parse_include()?,
                Some(Token::Ident(_)) => self.parse_statement(node)?,
                Some(_) => {
                    return Err(self
                        .source
                        .error_expected("a block, an assignment or 'include'"))
                }
            }
        }
    }

    fn parse_statement(&mut self, node: NodeId) -> Result<(), ParseError> {
        let first = self.source.expect_ident("an identifier")?;

        match self.source.peek_token()? {
            Some(Token::Eq) => self.parse_assignment(node, first),
            Some(Token::LBrace) => self.parse_block(node, first, false),
            Some(Token::Ident(_)) => self.parse_block(node, first, true),
            _ => Err(self.source.error_expected(&format!(
                "'=', '{{' or an instance name after '{}'",
                first.text()
            ))),
        }
    }

    fn parse_assignment(&mut self, node: NodeId, name: Lexeme) -> Result<(), ParseError> {
        self.source.expect(Token::Eq)?;
        let value = Evaluator::new(self.source, self.tree, node, self.functions)
            .with_max_depth(self.config.max_nesting_depth)
            .evaluate()?;
        self.source.expect(Token::Semicolon)?;

        let variable = Variable::new(name.text(), value, name.location.clone());
        let replaced = self
            .tree
            .bind(node, variable, self.config.redefinition)
            .map_err(|err| ParseError::scope(err, &name))?;
        trace!(
            scope = %self.tree.path(node),
            name = %name.token,
            value,
            redefined = replaced.is_some(),
            "assigned"
        );
        Ok(())
    }

    /// `Class Instance? { ... }`, with the class name already consumed.
    fn parse_block(
        &mut self,
        parent: NodeId,
        class: Lexeme,
        named: bool,
    ) -> Result<(), ParseError> {
        let class_name = class.text();
        if self.open.len() >= self.config.max_nesting_depth {
            return Err(ParseError::at(
                ParseErrorKind::Syntax,
                &class,
                format!(
                    "blocks nested deeper than {} levels",
                    self.config.max_nesting_depth
                ),
            ));
        }
        self.check_nesting(parent, &class, &class_name)?;

        let instance = if named {
            Some(self.source.expect_ident("an instance name")?.text())
        } else {
            None
        };
        self.source.expect(Token::LBrace)?;

        let node = self.tree.open_scope(
            parent,
            instance.clone(),
            class_name.as_str(),
            Some(class.location.clone()),
        );
        debug!(
            class = %class_name,
            instance = instance.as_deref().unwrap_or(""),
            path = %self.tree.path(node),
            "opened block"
        );

        self.open.push(OpenBlock {
            label: instance.unwrap_or_else(|| class_name.clone()),
            location: class.location,
            span: class.span,
        });
        self.parse_items(node)?;
        self.source.expect(Token::RBrace)?;
        self.open.pop();
        Ok(())
    }

    /// Validate `class` as a direct child of `parent`.
    ///
    /// Top-level blocks are only checked when the root class is registered.
    fn check_nesting(
        &self,
        parent: NodeId,
        class: &Lexeme,
        class_name: &str,
    ) -> Result<(), ParseError> {
        let parent_class = self.tree.node(parent).class_name.as_str();
        if parent == self.tree.root() && !self.classes.is_registered(parent_class) {
            return Ok(());
        }

        match self.classes.is_child_allowed(parent_class, class_name) {
            Ok(true) => Ok(()),
            Ok(false) => Err(ParseError::at(
                ParseErrorKind::ChildNotAllowed,
                class,
                format!(
                    "block class '{}' is not allowed inside '{}'",
                    class_name, parent_class
                ),
            )),
            Err(err) => Err(ParseError::registry(err, class)),
        }
    }

    /// `include "name";`
    fn parse_include(&mut self) -> Result<(), ParseError> {
        let keyword = self.source.expect(Token::Include)?;
        let requested = match self.source.peek_token()? {
            Some(Token::Str(name)) => {
                self.source.next()?;
                name
            }
            _ => return Err(self.source.error_expected("a quoted file name")),
        };
        self.source.expect(Token::Semicolon)?;

        let Some(loader) = self.loader else {
            return Err(ParseError::at(
                ParseErrorKind::Include,
                &keyword,
                format!("cannot include '{}': no source loader configured", requested),
            ));
        };
        let loaded = loader
            .load(&requested, &keyword.location.file)
            .map_err(|err| {
                ParseError::at(
                    ParseErrorKind::Include,
                    &keyword,
                    format!("cannot include '{}': {}", requested, err),
                )
            })?;

        debug!(
            requested = %requested,
            file = %loaded.name,
            from = %keyword.location,
            "including"
        );
        self.source
            .push_include(loaded.name, loaded.text, &keyword.location)
            .map_err(|err| ParseError::from(err).with_span(keyword.span))?;
        Ok(())
    }
}

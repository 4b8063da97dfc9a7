//! Eager expression evaluator using Pratt parsing (precedence climbing).
//!
//! Expressions are evaluated while they are parsed: identifiers are resolved
//! through the scope tree at the point of use and calls are dispatched to the
//! function registry immediately. No expression tree is built, so a name
//! must be assigned before it is referenced.
//!
//! ## Precedence Levels (lowest to highest)
//!
//! 1. `+`, `-` (Addition) - left associative
//! 2. `*`, `/` (Multiplication) - left associative
//! 3. Unary `-`, `+` - prefix, operand may contain `^` (`-2^2 == -4`)
//! 4. `^` (Power) - right associative
//! 5. Atoms: numbers, names, calls `f(a, b)`, `( ... )`
//!
//! ## Module Organization
//!
//! - `pratt` - Pratt parser core (precedence climbing, binary/unary ops)
//! - `atoms` - Atomic expressions (literals, names, calls, parenthesized)

mod atoms;
mod pratt;

use crate::config::DEFAULT_MAX_NESTING_DEPTH;
use crate::error::{ParseError, ParseErrorKind};
use crate::stream::TokenSourceExt;
use simdeck_lexer::TokenSource;
use simdeck_registry::FunctionRegistry;
use simdeck_scope::{NodeId, ScopeTree};

/// Evaluates one expression from a token source.
pub struct Evaluator<'a> {
    source: &'a mut TokenSource,
    tree: &'a ScopeTree,
    scope: NodeId,
    functions: &'a FunctionRegistry,
    depth: usize,
    max_depth: usize,
}

impl<'a> Evaluator<'a> {
    /// Evaluator resolving names from `scope` outward.
    pub fn new(
        source: &'a mut TokenSource,
        tree: &'a ScopeTree,
        scope: NodeId,
        functions: &'a FunctionRegistry,
    ) -> Self {
        Self {
            source,
            tree,
            scope,
            functions,
            depth: 0,
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    /// Limit on nested parentheses, calls and prefix operators.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse and evaluate one expression, leaving the following token
    /// unconsumed.
    pub fn evaluate(&mut self) -> Result<f64, ParseError> {
        self.parse_pratt(0)
    }

    /// Enter one level of expression nesting; fails at the next token once
    /// the limit is reached.
    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= self.max_depth {
            if let Some(lexeme) = self.source.peek()? {
                return Err(ParseError::at(
                    ParseErrorKind::Syntax,
                    lexeme,
                    format!("expression nested deeper than {} levels", self.max_depth),
                ));
            }
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Evaluate a standalone expression such as `"2 * sin(x)"` in `scope`.
///
/// The whole text must be a single expression.
pub fn evaluate_str(
    text: &str,
    tree: &ScopeTree,
    scope: NodeId,
    functions: &FunctionRegistry,
) -> Result<f64, ParseError> {
    let mut source = TokenSource::new("<expr>", text);
    let value = Evaluator::new(&mut source, tree, scope, functions).evaluate()?;
    if !source.at_end()? {
        return Err(source.error_expected("end of expression"));
    }
    Ok(value)
}

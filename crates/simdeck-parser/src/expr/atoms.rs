//! Atomic expressions - numbers, names, calls, parenthesized expressions.

use super::Evaluator;
use crate::error::{ParseError, ParseErrorKind};
use crate::stream::TokenSourceExt;
use simdeck_lexer::{Lexeme, Token};
use tracing::trace;

impl Evaluator<'_> {
    pub(super) fn parse_atom(&mut self) -> Result<f64, ParseError> {
        let Some(lexeme) = self.source.next()? else {
            return Err(self.source.error_expected("an expression"));
        };

        match &lexeme.token {
            Token::Number(value) => Ok(*value),
            Token::LParen => {
                let value = self.parse_pratt(0)?;
                self.source.expect(Token::RParen)?;
                Ok(value)
            }
            Token::Ident(name) => {
                if self.source.check(&Token::LParen)? {
                    self.parse_call(name, &lexeme)
                } else {
                    self.tree
                        .resolve(self.scope, name)
                        .map(|variable| variable.value)
                        .map_err(|err| ParseError::scope(err, &lexeme))
                }
            }
            _ => Err(ParseError::at(
                ParseErrorKind::Syntax,
                &lexeme,
                format!("expected an expression, found '{}'", lexeme.text()),
            )),
        }
    }

    /// `name(arg, ...)`, with the callee already consumed.
    ///
    /// The callee is looked up before its arguments are evaluated.
    fn parse_call(&mut self, name: &str, callee: &Lexeme) -> Result<f64, ParseError> {
        let functions = self.functions;
        let function = functions
            .lookup(name)
            .map_err(|err| ParseError::registry(err, callee))?;

        let args = self.parse_call_args()?;
        let value = function
            .eval(&args)
            .map_err(|err| ParseError::registry(err, callee))?;
        trace!(function = name, ?args, value, "called function");
        Ok(value)
    }

    fn parse_call_args(&mut self) -> Result<Vec<f64>, ParseError> {
        self.source.expect(Token::LParen)?;

        let mut args = Vec::new();
        while !self.source.check(&Token::RParen)? {
            args.push(self.parse_pratt(0)?);

            if !self.source.check(&Token::RParen)? {
                self.source.expect(Token::Comma)?;
            }
        }

        self.source.expect(Token::RParen)?;
        Ok(args)
    }
}

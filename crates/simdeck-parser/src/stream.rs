//! Parser-side helpers over the lexer's token source.

use crate::error::ParseError;
use simdeck_lexer::{Lexeme, Token, TokenSource};

/// Expectation helpers that turn mismatches into syntax errors.
pub(crate) trait TokenSourceExt {
    /// Consume the next token if it has the variant of `expected`.
    fn expect(&mut self, expected: Token) -> Result<Lexeme, ParseError>;

    /// Consume an identifier.
    fn expect_ident(&mut self, what: &str) -> Result<Lexeme, ParseError>;

    /// Syntax error describing the pending token (or end of input).
    fn error_expected(&mut self, expected: &str) -> ParseError;
}

impl TokenSourceExt for TokenSource {
    fn expect(&mut self, expected: Token) -> Result<Lexeme, ParseError> {
        if self.check(&expected)? {
            if let Some(lexeme) = self.next()? {
                return Ok(lexeme);
            }
        }
        Err(self.error_expected(&format!("'{}'", expected)))
    }

    fn expect_ident(&mut self, what: &str) -> Result<Lexeme, ParseError> {
        if matches!(self.peek_token()?, Some(Token::Ident(_))) {
            if let Some(lexeme) = self.next()? {
                return Ok(lexeme);
            }
        }
        Err(self.error_expected(what))
    }

    fn error_expected(&mut self, expected: &str) -> ParseError {
        let found = match self.peek() {
            Ok(found) => found.cloned(),
            Err(err) => return err.into(),
        };
        ParseError::unexpected(
            found.as_ref(),
            expected,
            &self.location(),
            self.current_span(),
        )
    }
}

//! Parse error types.
//!
//! Every failure during a parse becomes a [`ParseError`] carrying the
//! source location of the offending token. Lower-level errors from the
//! lexer, registries and scope tree are converted at the point where the
//! driver knows which token caused them.

use simdeck_lexer::{LexError, Lexeme, SourceLocation, Span};
use simdeck_registry::RegistryError;
use simdeck_scope::ScopeError;
use std::fmt;
use thiserror::Error;

/// Parse error with source location and context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// File, line and column of the offending token
    pub location: SourceLocation,
    pub span: Span,
    /// Source text of the offending token; `None` at end of input
    pub found: Option<String>,
    pub message: String,
    /// Secondary location (first definition, block opening, ...)
    pub note: Option<Note>,
}

/// Secondary message attached to an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub message: String,
    pub location: SourceLocation,
}

/// Category of parse error.
///
/// # Invariant
///
/// The discriminant values must match the PARSE_ERROR_KIND_NAMES indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ParseErrorKind {
    /// Malformed character sequence
    Lexical = 0,
    /// Token sequence violates the grammar
    Syntax = 1,
    /// Parent block class was never registered
    ClassNotRegistered = 2,
    /// Parent class does not allow this child class
    ChildNotAllowed = 3,
    /// Name not bound in the current block or any ancestor
    UnresolvedVariable = 4,
    /// Call to a function that is not registered
    UnknownFunction = 5,
    /// End of input with a block still open
    UnterminatedBlock = 6,
    /// Function called with the wrong number of arguments
    ArityMismatch = 7,
    /// Same-block reassignment under the reject policy
    DuplicateVariable = 8,
    /// Include could not be loaded, nests too deep, or is cyclic
    Include = 9,
    /// Function registered twice under the reject policy
    DuplicateFunction = 10,
}

/// Human-readable names for error kinds.
///
/// Index matches ParseErrorKind discriminant.
const PARSE_ERROR_KIND_NAMES: &[&str] = &[
    "lexical error",          // 0: Lexical
    "syntax error",           // 1: Syntax
    "class not registered",   // 2: ClassNotRegistered
    "child not allowed",      // 3: ChildNotAllowed
    "unresolved variable",    // 4: UnresolvedVariable
    "unknown function",       // 5: UnknownFunction
    "unterminated block",     // 6: UnterminatedBlock
    "wrong argument count",   // 7: ArityMismatch
    "duplicate variable",     // 8: DuplicateVariable
    "include error",          // 9: Include
    "duplicate function",     // 10: DuplicateFunction
];

impl ParseErrorKind {
    pub fn name(self) -> &'static str {
        PARSE_ERROR_KIND_NAMES[self as usize]
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ParseError {
    /// Error at a position with no token (end of input).
    pub fn new(
        kind: ParseErrorKind,
        location: SourceLocation,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            location,
            span,
            found: None,
            message: message.into(),
            note: None,
        }
    }

    /// Error pointing at `lexeme`.
    pub fn at(kind: ParseErrorKind, lexeme: &Lexeme, message: impl Into<String>) -> Self {
        Self {
            kind,
            location: lexeme.location.clone(),
            span: lexeme.span,
            found: Some(lexeme.text()),
            message: message.into(),
            note: None,
        }
    }

    /// Syntax error for an unexpected token (or end of input when `None`).
    ///
    /// `eof` and `eof_span` locate the end of input.
    pub fn unexpected(
        found: Option<&Lexeme>,
        expected: &str,
        eof: &SourceLocation,
        eof_span: Span,
    ) -> Self {
        match found {
            Some(lexeme) => Self::at(
                ParseErrorKind::Syntax,
                lexeme,
                format!("expected {}, found '{}'", expected, lexeme.text()),
            ),
            None => Self::new(
                ParseErrorKind::Syntax,
                eof.clone(),
                eof_span,
                format!("expected {}, found end of input", expected),
            ),
        }
    }

    /// Registry failure caused by `lexeme`.
    pub fn registry(err: RegistryError, lexeme: &Lexeme) -> Self {
        let kind = match err {
            RegistryError::ClassNotRegistered(_) => ParseErrorKind::ClassNotRegistered,
            RegistryError::UnknownFunction(_) => ParseErrorKind::UnknownFunction,
            RegistryError::DuplicateFunction(_) => ParseErrorKind::DuplicateFunction,
            RegistryError::ArityMismatch { .. } => ParseErrorKind::ArityMismatch,
        };
        Self::at(kind, lexeme, err.to_string())
    }

    /// Scope failure caused by `lexeme`.
    pub fn scope(err: ScopeError, lexeme: &Lexeme) -> Self {
        match err {
            ScopeError::UnresolvedVariable { .. } => {
                Self::at(ParseErrorKind::UnresolvedVariable, lexeme, err.to_string())
            }
            ScopeError::DuplicateVariable { ref name, ref first } => {
                let note = Note {
                    message: format!("'{}' first defined here", name),
                    location: first.clone(),
                };
                Self::at(
                    ParseErrorKind::DuplicateVariable,
                    lexeme,
                    format!("variable '{}' is already defined in this block", name),
                )
                .with_note(note)
            }
        }
    }

    pub fn with_note(mut self, note: Note) -> Self {
        self.note = Some(note);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn file_name(&self) -> &str {
        &self.location.file
    }

    pub fn line(&self) -> u32 {
        self.location.line
    }

    pub fn column(&self) -> u32 {
        self.location.column
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        match err {
            LexError::Unrecognized {
                location,
                span,
                text,
            } => Self {
                kind: ParseErrorKind::Lexical,
                location,
                span,
                message: format!("unrecognized input '{}'", text),
                found: Some(text),
                note: None,
            },
            LexError::IncludeDepth { location, limit } => Self::new(
                ParseErrorKind::Include,
                location,
                Span::default(),
                format!("include depth limit of {} exceeded", limit),
            ),
            LexError::IncludeCycle { location, name } => Self {
                kind: ParseErrorKind::Include,
                location,
                span: Span::default(),
                message: format!("'{}' is already being included", name),
                found: Some(name),
                note: None,
            },
            LexError::TooManyFiles { location } => Self::new(
                ParseErrorKind::Include,
                location,
                Span::default(),
                "too many source files",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simdeck_lexer::Token;
    use std::rc::Rc;

    fn lexeme(token: Token) -> Lexeme {
        Lexeme {
            token,
            span: Span::new(0, 4, 7),
            location: SourceLocation::new("main.deck", 2, 5),
        }
    }

    #[test]
    fn test_kind_names_match_discriminants() {
        assert_eq!(ParseErrorKind::Lexical.name(), "lexical error");
        assert_eq!(ParseErrorKind::UnterminatedBlock.name(), "unterminated block");
        assert_eq!(ParseErrorKind::Include.name(), "include error");
        assert_eq!(ParseErrorKind::DuplicateFunction.name(), "duplicate function");
        assert_eq!(
            PARSE_ERROR_KIND_NAMES.len(),
            ParseErrorKind::DuplicateFunction as usize + 1
        );
    }

    #[test]
    fn test_display_has_location_prefix() {
        let err = ParseError::at(ParseErrorKind::Syntax, &lexeme(Token::Semicolon), "boom");
        assert_eq!(err.to_string(), "main.deck:2:5: boom");
        assert_eq!(err.found.as_deref(), Some(";"));
        assert_eq!((err.file_name(), err.line(), err.column()), ("main.deck", 2, 5));
    }

    #[test]
    fn test_unexpected_at_end_of_input() {
        let eof = SourceLocation::new("main.deck", 9, 1);
        let err = ParseError::unexpected(None, "'}'", &eof, Span::point(0, 40));
        assert_eq!(err.kind, ParseErrorKind::Syntax);
        assert_eq!(err.found, None);
        assert_eq!(err.message, "expected '}', found end of input");
        assert_eq!(err.location, eof);
    }

    #[test]
    fn test_registry_conversion() {
        let l = lexeme(Token::Ident(Rc::from("foo")));
        let err = ParseError::registry(RegistryError::UnknownFunction("foo".into()), &l);
        assert_eq!(err.kind, ParseErrorKind::UnknownFunction);
        assert_eq!(err.message, "unknown function 'foo'");
    }

    #[test]
    fn test_duplicate_function_keeps_its_kind() {
        let l = lexeme(Token::Ident(Rc::from("sin")));
        let err = ParseError::registry(RegistryError::DuplicateFunction("sin".into()), &l);
        assert_eq!(err.kind, ParseErrorKind::DuplicateFunction);
        assert_ne!(err.kind, ParseErrorKind::UnknownFunction);
    }

    #[test]
    fn test_too_many_files_is_include_error() {
        let err = ParseError::from(LexError::TooManyFiles {
            location: SourceLocation::new("main.deck", 4, 1),
        });
        assert_eq!(err.kind, ParseErrorKind::Include);
        assert_eq!(err.to_string(), "main.deck:4:1: too many source files");
    }

    #[test]
    fn test_duplicate_variable_has_note() {
        let first = SourceLocation::new("main.deck", 1, 1);
        let l = lexeme(Token::Ident(Rc::from("x")));
        let err = ParseError::scope(
            ScopeError::DuplicateVariable {
                name: "x".into(),
                first: first.clone(),
            },
            &l,
        );
        assert_eq!(err.kind, ParseErrorKind::DuplicateVariable);
        assert_eq!(err.note.unwrap().location, first);
    }

    #[test]
    fn test_lex_error_conversion_strips_location() {
        let lex = LexError::Unrecognized {
            location: SourceLocation::new("main.deck", 3, 7),
            span: Span::new(0, 20, 21),
            text: "@".into(),
        };
        let err = ParseError::from(lex);
        assert_eq!(err.kind, ParseErrorKind::Lexical);
        assert_eq!(err.message, "unrecognized input '@'");
        assert_eq!(err.to_string(), "main.deck:3:7: unrecognized input '@'");
    }
}

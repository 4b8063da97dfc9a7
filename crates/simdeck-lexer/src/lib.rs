// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Lexical analysis for simdeck input decks.
//!
//! # Design
//!
//! - `Token`: every deck token type (operators, punctuation, literals, identifiers)
//! - Comments and whitespace are stripped during lexing (not tokens)
//! - `TokenSource`: lazy token stream with one-token lookahead and an include stack
//! - `SourceMap`: every file read during a parse, with a line index for diagnostics
//!
//! # Examples
//!
//! ```
//! # use simdeck_lexer::*;
//! # use logos::Logos;
//! let source = "region r1 { z = x * 2.0; }";
//! let tokens: Vec<Result<Token, ()>> = Token::lexer(source).collect();
//! assert_eq!(tokens.len(), 10);
//! ```

mod source;
mod stream;

pub use source::{
    LoadedSource, MemoryLoader, SourceFile, SourceLoader, SourceLocation, SourceMap, Span,
};
pub use stream::{LexError, Lexeme, TokenSource, DEFAULT_MAX_INCLUDE_DEPTH};

use logos::Logos;
use std::fmt;
use std::rc::Rc;

/// Deck token.
///
/// End of input is not a token: [`TokenSource::peek`] and
/// [`TokenSource::next`] return `None` once every frame is exhausted.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")] // Skip whitespace
#[logos(skip(r"//[^\n]*", allow_greedy = true))] // Skip // comments
#[logos(skip(r"#[^\n]*", allow_greedy = true))] // Skip # comments
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")] // Skip /* */ comments
pub enum Token {
    /// Keyword `include`
    #[token("include")]
    Include,

    // === Operators ===
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `^`
    #[token("^")]
    Caret,
    /// `=`
    #[token("=")]
    Eq,

    // === Punctuation ===
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semicolon,

    // === Literals ===
    /// Numeric literal: `12`, `1.5`, `2.`, `.5`, `6.02e23`
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    /// String literal, quotes stripped and escapes resolved
    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        let content = &s[1..s.len() - 1];
        unescape_string(content).map(|s| Rc::from(s.as_str()))
    })]
    Str(Rc<str>),

    /// Identifier: class names, instance names, variables, functions
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| Rc::from(lex.slice()))]
    Ident(Rc<str>),
}

/// Coarse token category, used by diagnostics and the parser driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifier (class, instance, variable or function name)
    Identifier,
    /// Numeric literal
    Number,
    /// String literal
    String,
    /// Reserved word
    Keyword,
    /// Arithmetic or assignment operator
    Operator,
    /// Brackets, braces, separators and terminators
    Punctuation,
    /// No more input
    EndOfInput,
}

impl Token {
    /// Category of this token.
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Include => TokenKind::Keyword,
            Token::Plus | Token::Minus | Token::Star | Token::Slash | Token::Caret | Token::Eq => {
                TokenKind::Operator
            }
            Token::LParen
            | Token::RParen
            | Token::LBrace
            | Token::RBrace
            | Token::Comma
            | Token::Semicolon => TokenKind::Punctuation,
            Token::Number(_) => TokenKind::Number,
            Token::Str(_) => TokenKind::String,
            Token::Ident(_) => TokenKind::Identifier,
        }
    }

    /// Fixed spelling of keyword, operator and punctuation tokens.
    ///
    /// Returns `None` for tokens that carry data.
    pub fn symbol(&self) -> Option<&'static str> {
        let s = match self {
            Token::Include => "include",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Caret => "^",
            Token::Eq => "=",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::Comma => ",",
            Token::Semicolon => ";",
            Token::Number(_) | Token::Str(_) | Token::Ident(_) => return None,
        };
        Some(s)
    }

    /// Identifier text, if this is an identifier.
    pub fn as_ident(&self) -> Option<&Rc<str>> {
        match self {
            Token::Ident(name) => Some(name),
            _ => None,
        }
    }
}

impl TokenKind {
    /// Human-readable name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Keyword => "keyword",
            TokenKind::Operator => "operator",
            TokenKind::Punctuation => "punctuation",
            TokenKind::EndOfInput => "end of input",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(x) => write!(f, "{}", x),
            Token::Str(s) => write!(f, "\"{}\"", s),
            Token::Ident(id) => write!(f, "{}", id),
            other => match other.symbol() {
                Some(s) => f.write_str(s),
                None => unreachable!("data tokens handled above"),
            },
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unescape a string literal content.
fn unescape_string(s: &str) -> Option<String> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some('\'') => result.push('\''),
                // Unsupported escape or trailing backslash
                _ => return None,
            }
        } else {
            result.push(c);
        }
    }
    Some(result)
}

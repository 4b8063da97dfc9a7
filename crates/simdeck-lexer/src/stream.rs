//! Lazy token stream with lookahead and an include stack.
//!
//! Tokens are produced on demand from the innermost open frame, so a
//! malformed character sequence is only reported once the parser reaches
//! it. Errors therefore surface in source order.

use crate::source::{SourceFile, SourceLocation, SourceMap, Span};
use crate::Token;
use logos::Logos;
use std::mem;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

/// Nested include limit used when the caller sets none.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 16;

/// A token with its byte span and resolved source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub span: Span,
    pub location: SourceLocation,
}

impl Lexeme {
    /// Source spelling of the token (strings re-quoted).
    pub fn text(&self) -> String {
        self.token.to_string()
    }
}

/// Errors raised while producing tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("{location}: unrecognized input '{text}'")]
    Unrecognized {
        location: SourceLocation,
        span: Span,
        text: String,
    },

    #[error("{location}: include depth limit of {limit} exceeded")]
    IncludeDepth {
        location: SourceLocation,
        limit: usize,
    },

    #[error("{location}: '{name}' is already being included")]
    IncludeCycle {
        location: SourceLocation,
        name: String,
    },

    #[error("{location}: too many source files")]
    TooManyFiles { location: SourceLocation },
}

impl LexError {
    pub fn location(&self) -> &SourceLocation {
        match self {
            LexError::Unrecognized { location, .. }
            | LexError::IncludeDepth { location, .. }
            | LexError::IncludeCycle { location, .. }
            | LexError::TooManyFiles { location } => location,
        }
    }

    /// Offending text, when the error points at one.
    pub fn text(&self) -> Option<&str> {
        match self {
            LexError::Unrecognized { text, .. } => Some(text),
            LexError::IncludeCycle { name, .. } => Some(name),
            LexError::IncludeDepth { .. } | LexError::TooManyFiles { .. } => None,
        }
    }
}

/// Read position inside one file of the source map.
#[derive(Debug, Clone, Copy)]
struct Frame {
    file_id: u32,
    offset: usize,
    cursor: Cursor,
}

impl Frame {
    fn new(file_id: u32) -> Self {
        Self {
            file_id,
            offset: 0,
            cursor: Cursor::default(),
        }
    }
}

/// Line and column of the last token start, advanced as tokens are read.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    offset: usize,
    line: u32,
    column: u32,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Cursor {
    /// Move forward to `target` and return its 1-based (line, column).
    fn advance(&mut self, file: &SourceFile, target: usize) -> (u32, u32) {
        let Some(skipped) = file.source.get(self.offset..target) else {
            return file.line_col(target as u32);
        };
        for ch in skipped.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset = target;
        (self.line, self.column)
    }
}

/// Token source over a root file plus any files it includes.
pub struct TokenSource {
    sources: SourceMap,
    frames: Vec<Frame>,
    lookahead: Option<Lexeme>,
    max_include_depth: usize,
}

impl TokenSource {
    /// Create a token source over `text`, displayed as `name`.
    pub fn new(name: impl Into<Arc<str>>, text: impl Into<String>) -> Self {
        let mut sources = SourceMap::new();
        // An empty map always has room
        let file_id = sources.add_file(name, text.into()).unwrap_or_default();
        Self {
            sources,
            frames: vec![Frame::new(file_id)],
            lookahead: None,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }

    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// Peek at the next lexeme without consuming it.
    ///
    /// `Ok(None)` means end of input.
    pub fn peek(&mut self) -> Result<Option<&Lexeme>, LexError> {
        self.fill()?;
        Ok(self.lookahead.as_ref())
    }

    /// Peek at the next token, cloned.
    pub fn peek_token(&mut self) -> Result<Option<Token>, LexError> {
        Ok(self.peek()?.map(|lexeme| lexeme.token.clone()))
    }

    /// Consume and return the next lexeme.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<Lexeme>, LexError> {
        self.fill()?;
        Ok(self.lookahead.take())
    }

    /// Check if the next token has the same variant as `expected`.
    pub fn check(&mut self, expected: &Token) -> Result<bool, LexError> {
        Ok(matches!(
            self.peek()?,
            Some(l) if mem::discriminant(&l.token) == mem::discriminant(expected)
        ))
    }

    pub fn at_end(&mut self) -> Result<bool, LexError> {
        Ok(self.peek()?.is_none())
    }

    /// Location of the pending lexeme, or of the read position if none
    /// has been produced yet.
    pub fn location(&self) -> SourceLocation {
        match &self.lookahead {
            Some(lexeme) => lexeme.location.clone(),
            None => self.sources.location(&self.current_span()),
        }
    }

    /// Span of the pending lexeme, or an empty span at the read position.
    pub fn current_span(&self) -> Span {
        match (&self.lookahead, self.frames.last()) {
            (Some(lexeme), _) => lexeme.span,
            (None, Some(frame)) => Span::point(frame.file_id, frame.offset as u32),
            (None, None) => Span::default(),
        }
    }

    /// Display name of the file tokens are currently read from.
    pub fn current_file(&self) -> Option<&str> {
        let frame = self.frames.last()?;
        self.sources.file(frame.file_id).map(|f| &*f.name)
    }

    /// Number of include frames above the root file.
    pub fn include_depth(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }

    /// Push an included file; its tokens are read before the rest of the
    /// current file.
    ///
    /// `origin` is the location of the include directive, used in errors.
    /// A file already read with identical text shares its source map entry.
    pub fn push_include(
        &mut self,
        name: impl Into<Arc<str>>,
        text: impl Into<String>,
        origin: &SourceLocation,
    ) -> Result<u32, LexError> {
        let name: Arc<str> = name.into();
        let text: String = text.into();

        if self.include_depth() >= self.max_include_depth {
            return Err(LexError::IncludeDepth {
                location: origin.clone(),
                limit: self.max_include_depth,
            });
        }
        let active = self.frames.iter().any(|frame| {
            self.sources
                .file(frame.file_id)
                .is_some_and(|file| file.name == name)
        });
        if active {
            return Err(LexError::IncludeCycle {
                location: origin.clone(),
                name: name.to_string(),
            });
        }

        // A pending lexeme belongs to the includer; re-read it afterwards.
        if let Some(pending) = self.lookahead.take() {
            if let Some(frame) = self.frames.last_mut() {
                frame.offset = pending.span.start as usize;
            }
        }

        let file_id = match self.sources.find_id(&name, &text) {
            Some(file_id) => file_id,
            None => self
                .sources
                .add_file(name.clone(), text)
                .ok_or_else(|| LexError::TooManyFiles {
                    location: origin.clone(),
                })?,
        };
        self.frames.push(Frame::new(file_id));
        debug!(file = %name, depth = self.include_depth(), "include pushed");
        Ok(file_id)
    }

    /// Every file read so far.
    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn into_source_map(self) -> SourceMap {
        self.sources
    }

    fn fill(&mut self) -> Result<(), LexError> {
        if self.lookahead.is_some() {
            return Ok(());
        }

        loop {
            let depth = self.frames.len();
            let Some(frame) = self.frames.last_mut() else {
                return Ok(());
            };
            let Some(file) = self.sources.file(frame.file_id) else {
                return Ok(());
            };
            let rest = file.source.get(frame.offset..).unwrap_or("");
            let mut lexer = Token::lexer(rest);

            match lexer.next() {
                None => {
                    frame.offset = file.source.len();
                    if depth > 1 {
                        trace!(file = %file.name, "include exhausted");
                        self.frames.pop();
                        continue;
                    }
                    return Ok(());
                }
                Some(result) => {
                    let range = lexer.span();
                    let start = frame.offset + range.start;
                    let end = frame.offset + range.end;
                    frame.offset = end;

                    let span = Span::new(frame.file_id, start as u32, end as u32);
                    let (line, column) = frame.cursor.advance(file, start);
                    let location = SourceLocation::new(file.name.clone(), line, column);

                    match result {
                        Ok(token) => {
                            self.lookahead = Some(Lexeme {
                                token,
                                span,
                                location,
                            });
                            return Ok(());
                        }
                        Err(()) => {
                            return Err(LexError::Unrecognized {
                                location,
                                span,
                                text: lexer.slice().to_string(),
                            });
                        }
                    }
                }
            }
        }
    }
}

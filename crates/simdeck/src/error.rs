//! Facade errors

use crate::diagnostic::DiagnosticFormatter;
use simdeck_lexer::SourceMap;
use simdeck_parser::ParseError;
use simdeck_registry::RegistryError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Facade result type
pub type Result<T> = std::result::Result<T, DeckError>;

/// Errors from loading configuration or parsing a deck.
#[derive(Debug, Error)]
pub enum DeckError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Parse failure, with every source read up to the failure
    #[error("{error}")]
    Parse { error: ParseError, sources: SourceMap },
}

impl DeckError {
    /// The parse error, if this is a parse failure.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            DeckError::Parse { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Multi-line report; parse failures include the offending source line.
    pub fn render(&self) -> String {
        match self {
            DeckError::Parse { error, sources } => DiagnosticFormatter::new(sources).format(error),
            other => format!("error: {}\n", other),
        }
    }
}

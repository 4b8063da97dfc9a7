//! Source tracking for deck files.
//!
//! # Design
//!
//! - `Span`: compact byte range inside one file of the `SourceMap`
//! - `SourceMap`: every file read during a parse, in the order it was read
//! - `SourceFile`: one deck file with its line index
//! - `SourceLocation`: resolved `file:line:column`, carried by tokens and errors
//! - `SourceLoader`: how `include "name";` finds the text of another file
//!
//! # Examples
//!
//! ```
//! # use simdeck_lexer::*;
//! let mut map = SourceMap::new();
//! let file_id = map.add_file("main.deck", "x = 1;\ny = 2;".to_string()).unwrap();
//! let span = Span::new(file_id, 7, 13);
//!
//! assert_eq!(map.snippet(&span), "y = 2;");
//! assert_eq!(map.location(&span).to_string(), "main.deck:2:1");
//! ```

use indexmap::IndexMap;
use std::fmt;
use std::io;
use std::sync::Arc;

/// Byte range inside one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Index into `SourceMap` files
    pub file_id: u32,
    /// Byte offset of start position
    pub start: u32,
    /// Byte offset of end position (exclusive)
    pub end: u32,
}

impl Span {
    pub fn new(file_id: u32, start: u32, end: u32) -> Self {
        Self {
            file_id,
            start,
            end,
        }
    }

    /// Zero-length span at `offset`.
    pub fn point(file_id: u32, offset: u32) -> Self {
        Self::new(file_id, offset, offset)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

/// Human-readable position: file name plus 1-based line and column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: Arc<str>,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A single source file with line indexing.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Display name (as given by the caller or the include directive)
    pub name: Arc<str>,
    /// Original source text
    pub source: String,
    /// Byte offsets of each line start, plus an EOF sentinel
    pub line_starts: Vec<u32>,
}

impl SourceFile {
    pub fn new(name: impl Into<Arc<str>>, source: String) -> Self {
        let line_starts = compute_line_starts(&source);
        Self {
            name: name.into(),
            source,
            line_starts,
        }
    }

    /// Get (line, column) for a byte offset. Both are 1-based.
    ///
    /// Offsets past the end clamp to the end of the file.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let offset = offset.min(self.source.len() as u32);
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.max(1) - 1,
        };
        let line_start = self.line_starts[line_idx];
        let line = (line_idx + 1) as u32;
        let column = self.source[line_start as usize..offset as usize]
            .chars()
            .count() as u32
            + 1;
        (line, column)
    }

    /// Get the byte range for a given line number (1-based).
    pub fn line_range(&self, line: u32) -> Option<(u32, u32)> {
        if line == 0 || line as usize >= self.line_starts.len() {
            return None;
        }
        let idx = (line - 1) as usize;
        Some((self.line_starts[idx], self.line_starts[idx + 1]))
    }

    /// Text of a line (1-based), without its line terminator.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        let (start, end) = self.line_range(line)?;
        let text = &self.source[start as usize..end as usize];
        Some(text.trim_end_matches(['\n', '\r']))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len().saturating_sub(1)
    }
}

/// Every source file read during a parse.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
    /// Latest file id recorded under each name
    by_name: IndexMap<Arc<str>, u32>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source file and return its ID.
    ///
    /// Returns `None` once every `u32` id is in use.
    pub fn add_file(&mut self, name: impl Into<Arc<str>>, source: String) -> Option<u32> {
        let file_id = u32::try_from(self.files.len()).ok()?;
        let file = SourceFile::new(name, source);
        self.by_name.insert(file.name.clone(), file_id);
        self.files.push(file);
        Some(file_id)
    }

    /// ID of the file recorded as `name` if its text is exactly `source`.
    pub fn find_id(&self, name: &str, source: &str) -> Option<u32> {
        let file_id = *self.by_name.get(name)?;
        self.file(file_id)
            .filter(|file| file.source == source)
            .map(|_| file_id)
    }

    pub fn file(&self, file_id: u32) -> Option<&SourceFile> {
        self.files.get(file_id as usize)
    }

    /// Look up a file by display name (the latest one read under that name).
    pub fn find(&self, name: &str) -> Option<&SourceFile> {
        self.file(*self.by_name.get(name)?)
    }

    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Source text covered by a span, empty if the span is stale.
    pub fn snippet(&self, span: &Span) -> &str {
        self.file(span.file_id)
            .and_then(|f| f.source.get(span.start as usize..span.end as usize))
            .unwrap_or("")
    }

    /// (line, column) of a span's start; `(0, 0)` for an unknown file.
    pub fn line_col(&self, span: &Span) -> (u32, u32) {
        self.file(span.file_id)
            .map(|f| f.line_col(span.start))
            .unwrap_or((0, 0))
    }

    /// Resolve a span into a `SourceLocation`.
    pub fn location(&self, span: &Span) -> SourceLocation {
        match self.file(span.file_id) {
            Some(file) => {
                let (line, column) = file.line_col(span.start);
                SourceLocation::new(file.name.clone(), line, column)
            }
            None => SourceLocation::new("<unknown>", 0, 0),
        }
    }

    /// Text of a line in the named file, for diagnostics.
    pub fn line_text(&self, name: &str, line: u32) -> Option<&str> {
        self.find(name)?.line_text(line)
    }
}

/// Text returned by a `SourceLoader`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSource {
    /// Name recorded in the source map and in locations
    pub name: String,
    pub text: String,
}

/// Supplies the text for `include "name";` directives.
pub trait SourceLoader {
    /// Load `requested`, as written in a file named `including_file`.
    fn load(&self, requested: &str, including_file: &str) -> io::Result<LoadedSource>;
}

/// In-memory loader, keyed by the exact include name.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: IndexMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.files.insert(name.into(), text.into());
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, requested: &str, _including_file: &str) -> io::Result<LoadedSource> {
        match self.files.get(requested) {
            Some(text) => Ok(LoadedSource {
                name: requested.to_string(),
                text: text.clone(),
            }),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no in-memory source named '{}'", requested),
            )),
        }
    }
}

/// Compute byte offsets of line starts, with an EOF sentinel.
fn compute_line_starts(source: &str) -> Vec<u32> {
    let mut line_starts = vec![0];
    for (idx, ch) in source.char_indices() {
        if ch == '\n' {
            line_starts.push((idx + 1) as u32);
        }
    }
    if line_starts.last() != Some(&(source.len() as u32)) {
        line_starts.push(source.len() as u32);
    }
    line_starts
}

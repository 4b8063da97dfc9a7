//! Filesystem source loading.

use simdeck_lexer::{LoadedSource, SourceLoader};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Loads included decks from disk.
///
/// A relative include is looked up next to the including file first, then in
/// each search path in order. The loaded file is named by the path it was
/// found at, so diagnostics point at real files.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    search_paths: Vec<PathBuf>,
}

impl FileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory searched after the including file's directory.
    pub fn with_search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_paths.push(dir.into());
        self
    }

    fn candidates(&self, requested: &str, including_file: &str) -> Vec<PathBuf> {
        let requested = Path::new(requested);
        if requested.is_absolute() {
            return vec![requested.to_path_buf()];
        }
        let base = Path::new(including_file)
            .parent()
            .unwrap_or_else(|| Path::new(""));
        std::iter::once(base.join(requested))
            .chain(self.search_paths.iter().map(|dir| dir.join(requested)))
            .collect()
    }
}

impl SourceLoader for FileLoader {
    fn load(&self, requested: &str, including_file: &str) -> io::Result<LoadedSource> {
        for candidate in self.candidates(requested, including_file) {
            trace!(candidate = %candidate.display(), "trying include path");
            if candidate.is_file() {
                let text = fs::read_to_string(&candidate)?;
                return Ok(LoadedSource {
                    name: candidate.display().to_string(),
                    text,
                });
            }
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("'{}' not found relative to '{}'", requested, including_file),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_relative_to_including_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("common.deck"), "g = 9.81;").unwrap();
        let main = dir.path().join("main.deck");

        let loaded = FileLoader::new()
            .load("common.deck", &main.display().to_string())
            .unwrap();
        assert_eq!(loaded.text, "g = 9.81;");
        assert_eq!(loaded.name, dir.path().join("common.deck").display().to_string());
    }

    #[test]
    fn test_search_path_fallback() {
        let decks = tempdir().unwrap();
        let lib = tempdir().unwrap();
        fs::write(lib.path().join("materials.deck"), "steel = 7850;").unwrap();
        let main = decks.path().join("main.deck");

        let loader = FileLoader::new().with_search_path(lib.path());
        let loaded = loader
            .load("materials.deck", &main.display().to_string())
            .unwrap();
        assert_eq!(loaded.text, "steel = 7850;");
    }

    #[test]
    fn test_not_found() {
        let dir = tempdir().unwrap();
        let main = dir.path().join("main.deck");
        let err = FileLoader::new()
            .load("missing.deck", &main.display().to_string())
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}

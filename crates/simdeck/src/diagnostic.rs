//! Human-readable rendering of parse errors.

use simdeck_lexer::SourceMap;
use simdeck_parser::ParseError;
use std::fmt::Write;

/// Renders a [`ParseError`] with the source line it points at.
///
/// ```text
/// error: unresolved variable: unresolved variable 'q' in scope 'a'
///   --> main.deck:1:9
///    |
///  1 | a { y = q; }
///    |         ^
/// ```
pub struct DiagnosticFormatter<'a> {
    sources: &'a SourceMap,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(sources: &'a SourceMap) -> Self {
        Self { sources }
    }

    pub fn format(&self, error: &ParseError) -> String {
        let mut output = String::new();
        // Writing to a String cannot fail
        let _ = self.write(&mut output, error);
        output
    }

    fn write(&self, out: &mut String, error: &ParseError) -> std::fmt::Result {
        writeln!(out, "error: {}: {}", error.kind.name(), error.message)?;

        let location = &error.location;
        writeln!(out, "  --> {}", location)?;

        if let Some(source_line) = self.sources.line_text(&location.file, location.line) {
            let gutter = location.line.to_string().len().max(2);
            let blank = " ".repeat(gutter);
            writeln!(out, "{} |", blank)?;
            writeln!(out, "{:>width$} | {}", location.line, source_line, width = gutter)?;

            let start = location.column.saturating_sub(1) as usize;
            let width = error
                .found
                .as_ref()
                .map(|text| text.chars().count())
                .unwrap_or(1)
                .max(1);
            writeln!(out, "{} | {}{}", blank, " ".repeat(start), "^".repeat(width))?;
        }

        if let Some(note) = &error.note {
            writeln!(out, "   = note: {}", note.message)?;
            writeln!(out, "     at {}", note.location)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simdeck_parser::{parse_deck, Parser};
    use simdeck_registry::{BlockClassRegistry, FunctionRegistry};

    fn failing(source: &str) -> (ParseError, SourceMap) {
        let mut classes = BlockClassRegistry::new();
        classes.set_restrict(false);
        let functions = FunctionRegistry::with_builtins();
        let mut parser = Parser::new("main.deck", source, &classes, &functions);
        let err = parser.run().unwrap_err();
        (err, parser.sources().clone())
    }

    #[test]
    fn test_format_points_at_token() {
        let (err, sources) = failing("a { y = q; }");
        let text = DiagnosticFormatter::new(&sources).format(&err);
        assert_eq!(
            text,
            "error: unresolved variable: unresolved variable 'q' in scope 'a'\n\
             \x20 --> main.deck:1:9\n\
             \x20  |\n\
             \x201 | a { y = q; }\n\
             \x20  |         ^\n"
        );
    }

    #[test]
    fn test_underline_spans_token() {
        let (err, sources) = failing("a {\n  z = 1 + missing;\n}");
        let text = DiagnosticFormatter::new(&sources).format(&err);
        assert!(text.contains(" 2 |   z = 1 + missing;\n"));
        assert!(text.contains("   |           ^^^^^^^\n"));
    }

    #[test]
    fn test_note_is_rendered() {
        let (err, sources) = failing("solver {\n  tol = 1;\n");
        let text = DiagnosticFormatter::new(&sources).format(&err);
        assert!(text.starts_with("error: unterminated block:"));
        assert!(text.contains("   = note: input ends here\n"));
    }

    #[test]
    fn test_missing_source_line_is_skipped() {
        let classes = BlockClassRegistry::new();
        let functions = FunctionRegistry::new();
        let err = parse_deck("main.deck", "x = y;", &classes, &functions).unwrap_err();
        let empty = SourceMap::new();
        let text = DiagnosticFormatter::new(&empty).format(&err);
        assert_eq!(text.lines().count(), 2);
    }
}

//! `include` directive tests, using an in-memory loader.

use simdeck_lexer::MemoryLoader;
use simdeck_parser::{ParseError, ParseErrorKind, Parser, ParserConfig, VariableStorage};
use simdeck_registry::{BlockClassRegistry, FunctionRegistry};

fn classes() -> BlockClassRegistry {
    let mut classes = BlockClassRegistry::new();
    classes.register_class("mesh").allow("region");
    classes.register_class("region");
    classes
}

fn run(main: &str, loader: MemoryLoader, config: ParserConfig) -> Result<VariableStorage, ParseError> {
    let classes = classes();
    let functions = FunctionRegistry::with_builtins();
    let mut parser = Parser::new("main.deck", main, &classes, &functions)
        .with_config(config)
        .with_loader(loader);
    parser.run()?;
    Ok(parser.into_storage())
}

fn loader(files: &[(&str, &str)]) -> MemoryLoader {
    let mut loader = MemoryLoader::new();
    for (name, text) in files {
        loader.insert(*name, *text);
    }
    loader
}

// =============================================================================
// Successful includes
// =============================================================================

#[test]
fn test_include_at_top_level() {
    let files = loader(&[("constants.deck", "g = 9.81;\nrho = 1000;\n")]);
    let storage = run(
        "include \"constants.deck\";\nmesh m { p = rho * g; }",
        files,
        ParserConfig::default(),
    )
    .unwrap();

    assert_eq!(storage.value("m", "p"), Some(9810.0));
    assert_eq!(storage.sources().file_count(), 2);
}

#[test]
fn test_include_inside_block() {
    let files = loader(&[("regions.deck", "region r1 { a = 1; }\nregion r2 { a = 2; }")]);
    let storage = run(
        "mesh m { scale = 10; include \"regions.deck\"; after = 3; }",
        files,
        ParserConfig::default(),
    )
    .unwrap();

    let m = storage.find("m").unwrap();
    assert_eq!(storage.tree().children(m).len(), 2);
    assert_eq!(storage.value("m.r2", "scale"), Some(10.0));
    assert_eq!(storage.value("m", "after"), Some(3.0));
}

#[test]
fn test_nested_includes() {
    let files = loader(&[
        ("a.deck", "a = 1;\ninclude \"b.deck\";\nc = a + b;"),
        ("b.deck", "b = 2;"),
    ]);
    let storage = run("include \"a.deck\";", files, ParserConfig::default()).unwrap();
    assert_eq!(storage.value("", "c"), Some(3.0));
    assert_eq!(storage.sources().file_count(), 3);
}

#[test]
fn test_same_file_may_be_included_twice_in_sequence() {
    let files = loader(&[("inc.deck", "n = n + 1;")]);
    let storage = run(
        "n = 0; include \"inc.deck\"; include \"inc.deck\";",
        files,
        ParserConfig::default(),
    )
    .unwrap();
    assert_eq!(storage.value("", "n"), Some(2.0));
    // Identical text is recorded once
    assert_eq!(storage.sources().file_count(), 2);
}

#[test]
fn test_many_sequential_includes_read_the_right_files() {
    let count = 65_540;
    let mut files = MemoryLoader::new();
    let mut main = String::new();
    for i in 0..count {
        let name = format!("part{}.deck", i);
        files.insert(name.as_str(), format!("v = {};", i));
        main.push_str(&format!("include \"{}\";\n", name));
    }

    let storage = run(&main, files, ParserConfig::default()).unwrap();
    assert_eq!(storage.value("", "v"), Some((count - 1) as f64));
    assert_eq!(storage.sources().file_count(), count + 1);
}

#[test]
fn test_locations_point_into_included_file() {
    let files = loader(&[("params.deck", "\n\n  speed = 3;")]);
    let storage = run("include \"params.deck\";", files, ParserConfig::default()).unwrap();
    let speed = storage.resolve(storage.root(), "speed").unwrap();
    assert_eq!(speed.location.to_string(), "params.deck:3:3");
}

// =============================================================================
// Include errors
// =============================================================================

#[test]
fn test_error_inside_included_file() {
    let files = loader(&[("bad.deck", "ok = 1;\nbroken = ok +;\n")]);
    let err = run("x = 0;\ninclude \"bad.deck\";", files, ParserConfig::default()).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax);
    assert_eq!(err.file_name(), "bad.deck");
    assert_eq!((err.line(), err.column()), (2, 14));
}

#[test]
fn test_missing_include() {
    let err = run("\n include \"nowhere.deck\";", MemoryLoader::new(), ParserConfig::default())
        .unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Include);
    assert_eq!((err.line(), err.column()), (2, 2));
    assert!(err.message.contains("nowhere.deck"));
}

#[test]
fn test_include_cycle() {
    let files = loader(&[
        ("a.deck", "include \"b.deck\";"),
        ("b.deck", "include \"a.deck\";"),
    ]);
    let err = run("include \"a.deck\";", files, ParserConfig::default()).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Include);
    assert_eq!(err.file_name(), "b.deck");
    assert_eq!(err.found.as_deref(), Some("a.deck"));
}

#[test]
fn test_include_depth_limit() {
    let files = loader(&[
        ("1.deck", "include \"2.deck\";"),
        ("2.deck", "include \"3.deck\";"),
        ("3.deck", "x = 1;"),
    ]);
    let err = run(
        "include \"1.deck\";",
        files,
        ParserConfig::default().with_max_include_depth(2),
    )
    .unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Include);
    assert_eq!(err.file_name(), "2.deck");
}

#[test]
fn test_include_requires_string() {
    let err = run("include common;", MemoryLoader::new(), ParserConfig::default()).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax);
    assert_eq!(err.found.as_deref(), Some("common"));
}

//! Block structure, class validation and scoping tests.
//!
//! These tests parse complete decks and inspect the resulting scope tree.

use simdeck_parser::{parse_deck, ParseErrorKind, Parser, ParserConfig, VariableStorage};
use simdeck_registry::{BlockClassRegistry, FunctionRegistry};
use simdeck_scope::RedefinitionPolicy;

/// Registry used by most tests: `A` allows `B`; `B` and `C` are leaves.
fn abc_classes() -> BlockClassRegistry {
    let mut classes = BlockClassRegistry::new();
    classes.register_class("A").allow("B");
    classes.register_class("B");
    classes.register_class("C");
    classes
}

/// Registry for the simulation-style decks: root → mesh → region.
fn mesh_classes() -> BlockClassRegistry {
    let mut classes = BlockClassRegistry::new();
    classes.register_class("root").allow("mesh").allow("region");
    classes.register_class("mesh").allow("region");
    classes.register_class("region").allow("monitor");
    classes.register_class("monitor");
    classes
}

fn parse_with(source: &str, classes: &BlockClassRegistry) -> VariableStorage {
    let functions = FunctionRegistry::with_builtins();
    parse_deck("test.deck", source, classes, &functions).expect("Parse failed")
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

// =============================================================================
// End-to-end
// =============================================================================

#[test]
fn test_reference_deck() {
    let source = r#"
        root {
            x = 2.0;
            y = sin(x) + 1.0;
            region r1 {
                z = x * 2.0;
            }
        }
    "#;
    let storage = parse_with(source, &mesh_classes());

    let root_block = storage.find("root").unwrap();
    let node = storage.node(root_block);
    assert_eq!(node.class_name, "root");
    assert_eq!(node.instance_name, None);

    let y = storage.resolve(root_block, "y").unwrap().value;
    assert!(approx(y, 2.0f64.sin() + 1.0));
    assert!((y - 1.909).abs() < 1e-3);

    let r1 = storage.find("root.r1").unwrap();
    assert_eq!(storage.node(r1).class_name, "region");
    assert_eq!(storage.node(r1).instance_name.as_deref(), Some("r1"));
    assert_eq!(storage.resolve(r1, "z").unwrap().value, 4.0);
    // Inherited from the enclosing block
    assert_eq!(storage.resolve(r1, "x").unwrap().value, 2.0);
}

#[test]
fn test_root_class_and_top_level_count() {
    let source = "A a1 { } A a2 { B { } } C { }";
    let storage = parse_with(source, &abc_classes());

    let root = storage.root();
    assert_eq!(storage.node(root).class_name, "deck");
    assert_eq!(storage.tree().children(root).len(), 3);
}

#[test]
fn test_configured_root_class() {
    let classes = abc_classes();
    let functions = FunctionRegistry::new();
    let mut parser = Parser::new("test.deck", "A { }", &classes, &functions)
        .with_config(ParserConfig::default().with_root_class("world"));
    let root = parser.run().unwrap();
    assert_eq!(parser.tree().node(root).class_name, "world");
}

#[test]
fn test_empty_deck() {
    let storage = parse_with("// nothing but a comment\n", &abc_classes());
    assert_eq!(storage.tree().len(), 1);
    assert!(storage.snapshot().children.is_empty());
}

// =============================================================================
// Class validation
// =============================================================================

#[test]
fn test_allowed_child() {
    let storage = parse_with("A { B { } }", &abc_classes());
    assert!(storage.find("A.B").is_some());
}

#[test]
fn test_child_not_allowed() {
    let functions = FunctionRegistry::new();
    let err = parse_deck("test.deck", "A {\n  C { }\n}", &abc_classes(), &functions).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::ChildNotAllowed);
    assert_eq!((err.line(), err.column()), (2, 3));
    assert_eq!(err.found.as_deref(), Some("C"));
}

#[test]
fn test_unregistered_parent() {
    let functions = FunctionRegistry::new();
    let err = parse_deck("test.deck", "Z { A { } }", &abc_classes(), &functions).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::ClassNotRegistered);
    assert_eq!(err.message, "block class 'Z' is not registered");
}

#[test]
fn test_top_level_checked_when_root_registered() {
    let mut classes = abc_classes();
    classes.register_class("deck").allow("A");
    let functions = FunctionRegistry::new();

    assert!(parse_deck("test.deck", "A { }", &classes, &functions).is_ok());
    let err = parse_deck("test.deck", "B { }", &classes, &functions).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::ChildNotAllowed);
}

#[test]
fn test_unrestricted_admits_any_nesting() {
    let mut classes = abc_classes();
    classes.set_restrict(false);
    let storage = parse_with("A { C { Q { x = 1; } } }", &classes);
    assert_eq!(storage.value("A.C.Q", "x"), Some(1.0));
}

#[test]
fn test_rejected_block_creates_no_node() {
    let classes = abc_classes();
    let functions = FunctionRegistry::new();
    let mut parser = Parser::new("test.deck", "A { B { } C { } }", &classes, &functions);
    assert!(parser.run().is_err());

    let tree = parser.tree();
    let a = tree.find_path("A").unwrap();
    assert_eq!(tree.children(a).len(), 1);
    assert_eq!(tree.node(tree.children(a)[0]).class_name, "B");
}

// =============================================================================
// Scoping
// =============================================================================

#[test]
fn test_shadowing_visible_to_descendants_only() {
    let source = r#"
        mesh m {
            x = 1.0;
            region left {
                x = 10.0;
                monitor p { seen = x; }
            }
            region right {
                seen = x;
            }
        }
    "#;
    let storage = parse_with(source, &mesh_classes());

    assert_eq!(storage.value("m.left.p", "seen"), Some(10.0));
    assert_eq!(storage.value("m.right", "seen"), Some(1.0));
    assert_eq!(storage.value("m", "x"), Some(1.0));
}

#[test]
fn test_top_level_assignments_are_global() {
    let source = r#"
        g = 9.81;
        mesh m { region r { w = 2 * g; } }
    "#;
    let storage = parse_with(source, &mesh_classes());
    assert_eq!(storage.value("", "g"), Some(9.81));
    assert_eq!(storage.value("m.r", "w"), Some(19.62));
}

#[test]
fn test_sibling_bindings_are_invisible() {
    let source = "mesh m { region a { only_a = 1; } region b { y = only_a; } }";
    let functions = FunctionRegistry::new();
    let err = parse_deck("test.deck", source, &mesh_classes(), &functions).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnresolvedVariable);
    assert_eq!(err.found.as_deref(), Some("only_a"));
}

#[test]
fn test_forward_reference_is_unresolved() {
    let functions = FunctionRegistry::new();
    let err = parse_deck("test.deck", "a = b; b = 1;", &abc_classes(), &functions).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnresolvedVariable);
}

#[test]
fn test_redefinition_overwrites_by_default() {
    let storage = parse_with("A { x = 1; x = x + 1; }", &abc_classes());
    assert_eq!(storage.value("A", "x"), Some(2.0));
    let a = storage.find("A").unwrap();
    assert_eq!(storage.tree().variables(a).count(), 1);
}

#[test]
fn test_redefinition_reject_policy() {
    let classes = abc_classes();
    let functions = FunctionRegistry::new();
    let mut parser = Parser::new("test.deck", "A {\n x = 1;\n x = 2;\n}", &classes, &functions)
        .with_config(ParserConfig::default().with_redefinition(RedefinitionPolicy::Reject));

    let err = parser.run().unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::DuplicateVariable);
    assert_eq!(err.line(), 3);
    let note = err.note.unwrap();
    assert_eq!((note.location.line, note.location.column), (2, 2));
}

#[test]
fn test_reject_policy_still_allows_shadowing() {
    let classes = abc_classes();
    let functions = FunctionRegistry::new();
    let mut parser = Parser::new("test.deck", "x = 1; A { x = 2; }", &classes, &functions)
        .with_config(ParserConfig::default().with_redefinition(RedefinitionPolicy::Reject));
    assert!(parser.run().is_ok());
}

// =============================================================================
// Parser behavior
// =============================================================================

#[test]
fn test_parse_is_idempotent() {
    let source = "mesh m { a = 3; region r { b = a ^ 2; monitor { c = sqrt(b); } } }";
    let classes = mesh_classes();
    let first = parse_with(source, &classes).snapshot();
    let second = parse_with(source, &classes).snapshot();
    assert_eq!(first, second);
}

#[test]
fn test_run_twice_returns_same_outcome() {
    let classes = abc_classes();
    let functions = FunctionRegistry::new();
    let mut parser = Parser::new("test.deck", "A { B { } }", &classes, &functions);
    let first = parser.run().unwrap();
    let second = parser.run().unwrap();
    assert_eq!(first, second);
    assert_eq!(parser.tree().len(), 3);
}

#[test]
fn test_snapshot_renders_back_to_equal_deck() {
    let source = "g = 2; mesh m { region r { z = g * 3; w = -0.25; } }";
    let classes = mesh_classes();
    let original = parse_with(source, &classes).snapshot();

    let rendered = original.to_deck_string();
    let reparsed = parse_with(&rendered, &classes).snapshot();
    assert_eq!(original, reparsed);
}

#[test]
fn test_variables_carry_assignment_location() {
    let storage = parse_with("A {\n    speed = 3;\n}", &abc_classes());
    let a = storage.find("A").unwrap();
    let speed = storage.resolve(a, "speed").unwrap();
    assert_eq!(speed.location.to_string(), "test.deck:2:5");
}

#[test]
fn test_block_comments_ending_in_star_runs() {
    let source = "x = 1; /** doc **/ y = 2;\nA { /* note **/ z = x + y; /***/ }\n/**/";
    let storage = parse_with(source, &abc_classes());
    assert_eq!(storage.value("", "y"), Some(2.0));
    assert_eq!(storage.value("A", "z"), Some(3.0));
}

//! Error recovery: every input yields a lossless tree with local errors

use haxe_syntax::parser::{ErrorCode, parse};
use haxe_syntax::{GrammarKind, SyntaxKind, SyntaxTree};
use rstest::rstest;

use crate::helpers::tree_assertions::{assert_lossless, host_tree, nodes_of_kind};

fn codes(tree: &SyntaxTree) -> Vec<ErrorCode> {
    tree.errors().iter().map(|d| d.code).collect()
}

#[test]
fn test_truncated_class_reports_once() {
    let text = "class Foo { var x:Int";
    let tree = host_tree(text);
    assert_lossless(&tree, text);
    let errors = tree.errors();
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].expected.contains(SyntaxKind::SEMICOLON));
    assert!(errors[0].expected.contains(SyntaxKind::R_BRACE));
    assert_eq!(errors[0].range.start(), errors[0].range.end());
}

#[rstest]
#[case("class A { var = 1; var b; }", ErrorCode::E0301)]
#[case("class A { function f() { var x = ; g(); } }", ErrorCode::E0406)]
#[case("class A { } }", ErrorCode::E0205)]
#[case("class A { function f() { @:x foo(); } }", ErrorCode::E0501)]
#[case("class A { var s = 'abc\n; }", ErrorCode::E0102)]
fn test_single_local_error(#[case] text: &str, #[case] code: ErrorCode) {
    let tree = host_tree(text);
    assert_lossless(&tree, text);
    assert_eq!(codes(&tree), vec![code], "{}", tree.debug_dump());
}

#[test]
fn test_member_error_does_not_swallow_siblings() {
    let text = "class A { var = 1; var b; function f() {} }";
    let tree = host_tree(text);
    assert_eq!(nodes_of_kind(&tree, SyntaxKind::FIELD_DECL).len(), 2);
    assert_eq!(nodes_of_kind(&tree, SyntaxKind::METHOD_DECL).len(), 1);
    assert_eq!(nodes_of_kind(&tree, SyntaxKind::ERROR).len(), 1);
}

#[test]
fn test_nested_sigil_reported_by_lexer() {
    let text = "@:a(@b) class A {}";
    let tree = host_tree(text);
    assert_lossless(&tree, text);
    assert!(codes(&tree).contains(&ErrorCode::E0106), "{:?}", codes(&tree));
    assert_eq!(nodes_of_kind(&tree, SyntaxKind::CLASS_DECL).len(), 1);
}

#[test]
fn test_garbage_between_declarations() {
    let text = "class A {} ) ) class B {}";
    let tree = host_tree(text);
    assert_lossless(&tree, text);
    assert_eq!(nodes_of_kind(&tree, SyntaxKind::CLASS_DECL).len(), 2);
    assert!(tree.has_errors());
}

#[test]
fn test_diagnostics_in_document_order() {
    let text = "class A { var = 1; } class B { function f() { var x = ; } }";
    let tree = host_tree(text);
    let starts: Vec<_> = tree.errors().iter().map(|d| d.range.start()).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
    assert_eq!(starts.len(), 2);
}

#[rstest]
#[case("")]
#[case("}")]
#[case("class")]
#[case("class {")]
#[case("@")]
#[case("@:")]
#[case("function f() {}")]
#[case("class A { function }")]
#[case("class A { var x = [1, 2; }")]
#[case("class A { var x = { a: 1, ; }")]
#[case("typedef T = { x:Int")]
#[case("enum E { A(; B; }")]
#[case("class A { function f() { switch x { case } } }")]
fn test_malformed_input_is_lossless(#[case] text: &str) {
    let tree = host_tree(text);
    assert_lossless(&tree, text);
    assert_eq!(tree.kind(tree.root()), SyntaxKind::SOURCE_FILE);
}

#[test]
fn test_unclosed_body_points_at_opener() {
    let text = "class A { function f() { g();\n}";
    let result = parse(text, GrammarKind::Host);
    let error = result
        .errors
        .iter()
        .find(|e| e.expected.contains(SyntaxKind::R_BRACE))
        .expect("missing '}' reported");
    assert_eq!(error.related.len(), 1);
    assert_eq!(&text[error.related[0].range], "{");
    assert_eq!(u32::from(error.related[0].range.start()), 8);
}

#[test]
fn test_misplaced_metadata_has_hint() {
    let result = parse("class A { function f() { @:x foo(); } }", GrammarKind::Host);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, ErrorCode::E0501);
    assert!(result.errors[0].hint.is_some());
    assert!(result.errors[0].format().contains("hint:"));
}

#[test]
fn test_unclosed_metadata_args_stop_at_declaration() {
    let text = "@:meta('a' class Foo { var x:Int; }\nclass Bar {}";
    let tree = host_tree(text);
    assert_lossless(&tree, text);
    assert_eq!(nodes_of_kind(&tree, SyntaxKind::CLASS_DECL).len(), 2, "{}", tree.debug_dump());
    assert_eq!(nodes_of_kind(&tree, SyntaxKind::FIELD_DECL).len(), 1);
    assert_eq!(codes(&tree), vec![ErrorCode::E0203]);

    let result = parse(text, GrammarKind::Host);
    assert_eq!(&text[result.errors[0].related[0].range], "(");
}

#[rstest]
#[case("class A { @:m(1; var x; }", SyntaxKind::FIELD_DECL, "x")]
#[case("class A { @:m(f(1 function g() {} }", SyntaxKind::METHOD_DECL, "g")]
fn test_unclosed_metadata_args_keep_the_member(#[case] text: &str, #[case] member: SyntaxKind, #[case] name: &str) {
    let tree = host_tree(text);
    assert_lossless(&tree, text);
    let last = *nodes_of_kind(&tree, member).last().expect("member parsed");
    assert!(
        tree.tokens(last).iter().any(|t| tree[*t].text == name),
        "{}",
        tree.debug_dump()
    );
    assert!(codes(&tree).contains(&ErrorCode::E0203));
}

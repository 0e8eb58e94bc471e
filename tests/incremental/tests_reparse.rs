//! Incremental reparse: identity preservation and agreement with full parses

use haxe_syntax::incremental::Rejection;
use haxe_syntax::{
    FallbackReason, GrammarKind, ParseConfig, ReparseOutcome, Reparsed, SyntaxKind, SyntaxTree, TextEdit,
    TextRange, TextSize, reparse,
};
use rstest::rstest;

use crate::helpers::source_fixtures::{BUILD_FILE_FULL, FULL_MODULE, SIMPLE_CLASS};
use crate::helpers::tree_assertions::{assert_equivalent, assert_lossless, nodes_of_kind, tree_of};

/// Build an edit at the first occurrence of `needle`, removing `removed`
/// bytes there and inserting `inserted`
fn edit_at(text: &str, needle: &str, removed: u32, inserted: &str) -> TextEdit {
    let offset = text.find(needle).unwrap_or_else(|| panic!("`{needle}` not in source")) as u32;
    TextEdit::new(TextSize::new(offset), TextSize::new(removed), inserted)
}

fn run(text: &str, grammar: GrammarKind, edit: &TextEdit) -> (SyntaxTree, Reparsed) {
    let old = tree_of(text, grammar);
    let reparsed = reparse(&old, text, edit, &ParseConfig::default(), None).unwrap();
    assert_lossless(&reparsed.tree, &reparsed.text);
    assert_equivalent(&reparsed.tree, &tree_of(&reparsed.text, grammar));
    (old, reparsed)
}

#[test]
fn test_field_rename_keeps_outer_identity() {
    let old = tree_of(SIMPLE_CLASS, GrammarKind::Host);
    let class = nodes_of_kind(&old, SyntaxKind::CLASS_DECL)[0];
    let closer = old.last_token(nodes_of_kind(&old, SyntaxKind::CLASS_BODY)[0]).unwrap();
    assert_eq!(old[closer].kind, SyntaxKind::R_BRACE);

    let edit = TextEdit::insert(TextSize::new(24), "y");
    let reparsed = reparse(&old, SIMPLE_CLASS, &edit, &ParseConfig::default(), None).unwrap();
    assert_eq!(reparsed.text, "class Foo { public var xy:Int; }");
    assert!(reparsed.outcome.is_incremental(), "{:?}", reparsed.outcome);

    let tree = &reparsed.tree;
    assert!(tree.contains_node(class));
    assert_eq!(tree.kind(class), SyntaxKind::CLASS_DECL);
    assert!(tree.contains_token(closer));
    assert_eq!(tree[closer].kind, SyntaxKind::R_BRACE);
    assert_equivalent(tree, &tree_of(&reparsed.text, GrammarKind::Host));

    // The old tree is still intact
    assert_eq!(old.render_text(), SIMPLE_CLASS);
}

#[test]
fn test_reparsed_node_is_innermost_candidate() {
    let text = "class A { function f() { g(1); } function h() { i(); } }";
    // Past the tokens the block's own guards look at
    let edit = edit_at(text, "1)", 1, "12");
    let (old, reparsed) = run(text, GrammarKind::Host, &edit);
    let ReparseOutcome::Incremental { node } = reparsed.outcome else {
        panic!("expected an incremental reparse, got {:?}", reparsed.outcome);
    };
    assert_eq!(reparsed.tree.kind(node), SyntaxKind::BLOCK);

    // The other method's block survives with its id
    let blocks = nodes_of_kind(&old, SyntaxKind::BLOCK);
    assert!(reparsed.tree.contains_node(blocks[1]));
}

#[rstest]
#[case::rename_field(SIMPLE_CLASS, "x:", 1, "count")]
#[case::add_member(SIMPLE_CLASS, "}", 0, "var y:String; ")]
#[case::delete_member(SIMPLE_CLASS, "public", 17, "")]
#[case::add_statement("class A { function f() { g(); } }", "g()", 0, "var v = 1; ")]
#[case::break_expression("class A { function f() { g(1 + 2); } }", "2", 1, "")]
#[case::block_to_object("class A { function f() { var o = { a; }; } }", "a;", 1, "a:1")]
#[case::object_to_block("class A { function f() { var o = { a:1 }; } }", ":1", 2, ";")]
#[case::open_string("class A { function f() { g(); } }", "g", 0, "'")]
#[case::close_comment("class A { /* var x; } var y; */ }", "*/", 2, "")]
#[case::open_comment("class A { var x; var y; }", "var y", 0, "/*")]
#[case::unbalanced_open("class A { function f() { return 1; } }", "return", 0, "{")]
#[case::unbalanced_close("class A { function f() { return 1; } }", "return", 0, "}")]
#[case::metadata_arg("@:meta('abc', 1) class Foo {}", "1)", 1, "2 + 3")]
#[case::metadata_nesting("@:meta('abc') class Foo {}", "'abc'", 0, "[")]
#[case::metadata_close("@:meta('abc') class Foo {}", ")", 1, "")]
#[case::interpolation("class A { var s = 'a $b c'; }", "$b", 2, "${b + 1}")]
#[case::typedef_field("typedef T = { var a:Int; }", "a:", 0, "b:Int; var ")]
#[case::switch_case("class A { function f() { switch x { case 1: a(); } } }", "a()", 0, "b(); ")]
fn test_host_edit_matches_full_parse(
    #[case] text: &str,
    #[case] needle: &str,
    #[case] removed: u32,
    #[case] inserted: &str,
) {
    run(text, GrammarKind::Host, &edit_at(text, needle, removed, inserted));
}

#[rstest]
#[case::change_flag("-cp src\n-main Main\n", "-main", 5, "-lib")]
#[case::add_arg("-cp src\n-main Main\n", "Main", 0, "app.")]
#[case::split_line("-cp src\n-main Main\n", " Main", 1, "\n")]
#[case::join_lines("-cp src\n-main Main\n", "\n-main", 1, " ")]
#[case::start_comment("-cp src\n-main Main\n", "-main", 0, "# ")]
#[case::quote_arg("-cp src\n-main Main\n", "src", 0, "\"")]
fn test_hxml_edit_matches_full_parse(
    #[case] text: &str,
    #[case] needle: &str,
    #[case] removed: u32,
    #[case] inserted: &str,
) {
    run(text, GrammarKind::Hxml, &edit_at(text, needle, removed, inserted));
}

#[rstest]
#[case::brace_before_body_closer("class A { }", GrammarKind::Host, 10, "}")]
#[case::brace_before_block_closer("class A { function f() { g(); } }", GrammarKind::Host, 30, "}")]
#[case::paren_before_metadata_closer("@:meta('abc') class Foo {}", GrammarKind::Host, 12, ")")]
#[case::newline_before_line_end("-cp src\n-main Main\n", GrammarKind::Hxml, 7, "\n")]
#[case::word_before_line_end("-cp src\n-main Main\n", GrammarKind::Hxml, 7, " lib")]
fn test_insertion_at_closer_is_kept(
    #[case] text: &str,
    #[case] grammar: GrammarKind,
    #[case] offset: u32,
    #[case] inserted: &str,
) {
    let (_, reparsed) = run(text, grammar, &TextEdit::insert(TextSize::new(offset), inserted));
    assert_eq!(reparsed.text.len(), text.len() + inserted.len());
}

#[test]
fn test_text_typed_before_closer_is_incremental() {
    let text = "-cp src\n-main Main\n";
    let (_, reparsed) = run(text, GrammarKind::Hxml, &TextEdit::insert(TextSize::new(18), " x"));
    assert_eq!(reparsed.text, "-cp src\n-main Main x\n");
    let ReparseOutcome::Incremental { node } = reparsed.outcome else {
        panic!("expected an incremental reparse, got {:?}", reparsed.outcome);
    };
    assert_eq!(reparsed.tree.kind(node), SyntaxKind::HXML_OPTION);
}

#[test]
fn test_edits_in_a_large_module() {
    for (needle, removed, inserted) in [
        ("return", 0, "trace(1); "),
        ("@:", 0, "@:keep "),
        ("class", 5, "interface"),
        ("{", 1, ""),
    ] {
        let edit = edit_at(FULL_MODULE, needle, removed, inserted);
        run(FULL_MODULE, GrammarKind::Host, &edit);
    }
}

#[test]
fn test_edits_in_a_large_build_file() {
    let edit = edit_at(BUILD_FILE_FULL, "heaps", 5, "format");
    let (_, reparsed) = run(BUILD_FILE_FULL, GrammarKind::Hxml, &edit);
    assert!(reparsed.outcome.is_incremental(), "{:?}", reparsed.outcome);
}

#[rstest]
#[case::newline_in_line("-cp src\n-main Main\n", GrammarKind::Hxml, "src", 0, "\n")]
#[case::unbalanced("class A { function f() { g(); } }", GrammarKind::Host, "g", 0, "(")]
#[case::string_opened("class A { function f() { g(); } }", GrammarKind::Host, "g", 0, "'")]
#[case::outside_any_body("class A { }", GrammarKind::Host, "A", 1, "B")]
fn test_rejected_edits_fall_back(
    #[case] text: &str,
    #[case] grammar: GrammarKind,
    #[case] needle: &str,
    #[case] removed: u32,
    #[case] inserted: &str,
) {
    let (_, reparsed) = run(text, grammar, &edit_at(text, needle, removed, inserted));
    assert!(
        matches!(reparsed.outcome, ReparseOutcome::Full { .. }),
        "{:?}",
        reparsed.outcome
    );
}

#[test]
fn test_candidate_limit() {
    let text = "class A { function f() { if (a) { if (b) { g(); } } } }";
    let old = tree_of(text, GrammarKind::Host);
    let config = ParseConfig {
        max_reparse_candidates: 1,
        ..ParseConfig::default()
    };
    // Opening a bracket fails the innermost block and no other candidate may be tried
    let edit = edit_at(text, "g", 0, "(");
    let reparsed = reparse(&old, text, &edit, &config, None).unwrap();
    assert_eq!(
        reparsed.outcome,
        ReparseOutcome::Full {
            reason: FallbackReason::CandidateLimit
        }
    );
}

#[test]
fn test_edit_outside_every_body() {
    let text = "class A { function f() { g(); } }";
    let old = tree_of(text, GrammarKind::Host);
    let edit = TextEdit::replace(TextRange::at(TextSize::new(0), TextSize::new(5)), "enum");
    let reparsed = reparse(&old, text, &edit, &ParseConfig::default(), None).unwrap();
    assert!(
        matches!(
            reparsed.outcome,
            ReparseOutcome::Full {
                reason: FallbackReason::NoCandidate | FallbackReason::Rejected(Rejection::EditOutside)
            }
        ),
        "{:?}",
        reparsed.outcome
    );
}

#[test]
fn test_chained_edits_stay_consistent() {
    let mut text = SIMPLE_CLASS.to_string();
    let mut tree = tree_of(&text, GrammarKind::Host);
    let class = nodes_of_kind(&tree, SyntaxKind::CLASS_DECL)[0];
    for inserted in ["a", "b", "c", "d"] {
        let edit = edit_at(&text, ":Int", 0, inserted);
        let reparsed = reparse(&tree, &text, &edit, &ParseConfig::default(), None).unwrap();
        assert!(reparsed.outcome.is_incremental());
        text = reparsed.text;
        tree = reparsed.tree;
    }
    assert_eq!(text, "class Foo { public var xabcd:Int; }");
    assert!(tree.contains_node(class));
    assert_equivalent(&tree, &tree_of(&text, GrammarKind::Host));
}

//! Position queries, before and after incremental splices

use haxe_syntax::{
    GrammarKind, ParseConfig, SyntaxKind, SyntaxTree, TextEdit, TextRange, TextSize, reparse,
};
use rstest::rstest;

use crate::helpers::source_fixtures::{BUILD_FILE, SIMPLE_CLASS};
use crate::helpers::tree_assertions::{host_tree, tree_of};

fn at(offset: u32) -> TextSize {
    TextSize::new(offset)
}

/// Position of the first occurrence of `needle`
fn offset_of(text: &str, needle: &str) -> TextSize {
    TextSize::new(text.find(needle).unwrap() as u32)
}

#[rstest]
#[case(0, SyntaxKind::CLASS_KW)]
#[case(6, SyntaxKind::IDENT)]
#[case(10, SyntaxKind::L_BRACE)]
#[case(12, SyntaxKind::PUBLIC_KW)]
#[case(23, SyntaxKind::IDENT)]
#[case(25, SyntaxKind::IDENT)]
#[case(28, SyntaxKind::SEMICOLON)]
#[case(30, SyntaxKind::R_BRACE)]
fn test_token_at(#[case] offset: u32, #[case] kind: SyntaxKind) {
    let tree = host_tree(SIMPLE_CLASS);
    let token = tree.token_at(at(offset)).unwrap();
    assert_eq!(tree[token].kind, kind);
    assert!(tree.token_span(token).contains(at(offset)));
}

#[test]
fn test_token_at_trivia_belongs_to_a_token() {
    let tree = host_tree(SIMPLE_CLASS);
    // The space after `class`
    let token = tree.token_at(at(5)).unwrap();
    let span = tree.token_span(token);
    assert!(span.contains(at(5)));
    assert!(!tree.token_text_range(token).contains(at(5)));
}

#[test]
fn test_end_of_document() {
    let tree = host_tree(SIMPLE_CLASS);
    let end = tree.len();
    assert_eq!(tree.node_at(end), tree.root());
    assert_eq!(tree.node_at(end + at(10)), tree.root());
    let last = tree.token_at(end).unwrap();
    assert_eq!(tree[last].kind, SyntaxKind::EOF);
}

#[test]
fn test_node_at_innermost() {
    let tree = host_tree(SIMPLE_CLASS);
    let node = tree.node_at(offset_of(SIMPLE_CLASS, "Int"));
    assert!(
        tree.ancestors(node).any(|n| tree.kind(n) == SyntaxKind::FIELD_DECL),
        "{:?}",
        tree.kind(node)
    );
    let body = tree.node_at(at(10));
    assert_eq!(tree.kind(body), SyntaxKind::CLASS_BODY);
}

#[test]
fn test_span_and_text_range() {
    let tree = host_tree(SIMPLE_CLASS);
    let field = tree
        .preorder()
        .find(|n| tree.kind(*n) == SyntaxKind::FIELD_DECL)
        .unwrap();
    let range = tree.text_range(field);
    assert_eq!(&SIMPLE_CLASS[range], "public var x:Int;");

    let (start, len) = tree.span_of(field);
    let span = TextRange::at(start, len);
    assert!(span.contains_range(range));
    assert_eq!(tree.node_text(field), &SIMPLE_CLASS[span]);

    let root_span = tree.span_of(tree.root());
    assert_eq!(root_span, (at(0), tree.len()));
}

#[test]
fn test_spans_partition_the_parent() {
    let tree = host_tree(SIMPLE_CLASS);
    for node in tree.preorder() {
        let (start, len) = tree.span_of(node);
        let mut cursor = start;
        for &child in tree.children(node) {
            let child_len = tree.element_len(child);
            if let Some(id) = child.as_node() {
                assert_eq!(tree.span_of(id).0, cursor);
            }
            cursor += child_len;
        }
        assert_eq!(cursor, start + len, "{:?}", tree.kind(node));
    }
}

#[test]
fn test_hxml_positions() {
    let tree = tree_of(BUILD_FILE, GrammarKind::Hxml);
    let main = tree.token_at(offset_of(BUILD_FILE, "Main")).unwrap();
    assert_eq!(tree[main].kind, SyntaxKind::HXML_ARG);
    assert_eq!(tree.kind(tree.token_parent(main)), SyntaxKind::HXML_OPTION);
}

#[test]
fn test_positions_shift_after_splice() {
    let old = host_tree(SIMPLE_CLASS);
    let closer = old.token_at(at(30)).unwrap();
    let edit = TextEdit::insert(at(24), "yz");
    let reparsed = reparse(&old, SIMPLE_CLASS, &edit, &ParseConfig::default(), None).unwrap();
    assert!(reparsed.outcome.is_incremental());

    let tree: &SyntaxTree = &reparsed.tree;
    assert!(tree.contains_token(closer));
    assert_eq!(tree.token_text_range(closer).start(), at(32));
    assert_eq!(tree.token_at(at(32)), Some(closer));

    let name = tree.token_at(offset_of(&reparsed.text, "xyz")).unwrap();
    assert_eq!(tree[name].text, "xyz");
    assert_eq!(tree.token_text_range(name), TextRange::at(at(23), at(3)));
}

//! Property-based tests over arbitrary inputs and edits

use haxe_syntax::parser::{LexMode, tokenize};
use haxe_syntax::{GrammarKind, ParseConfig, ReparseOutcome, TextEdit, TextSize, reparse};
use proptest::prelude::*;

use crate::helpers::source_fixtures::{BUILD_FILE_FULL, CLASS_WITH_METADATA, FULL_MODULE, SIMPLE_CLASS};
use crate::helpers::tree_assertions::{assert_equivalent, tree_of};

/// Source-like text built from host fragments, so generated inputs hit
/// brackets, strings, metadata and comments far more often than noise would
fn host_source() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        Just("class "),
        Just("function "),
        Just("var "),
        Just("x"),
        Just("Int"),
        Just(":"),
        Just(";"),
        Just(","),
        Just("="),
        Just("+"),
        Just("{"),
        Just("}"),
        Just("("),
        Just(")"),
        Just("["),
        Just("]"),
        Just("<"),
        Just(">"),
        Just("'a $b ${c}'"),
        Just("'"),
        Just("\""),
        Just("@:meta("),
        Just("@"),
        Just("/*"),
        Just("*/"),
        Just("// c\n"),
        Just(" "),
        Just("\n"),
        Just("1"),
    ];
    prop::collection::vec(fragment, 0..60).prop_map(|parts| parts.concat())
}

fn hxml_source() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        Just("-cp"),
        Just("--macro"),
        Just("src"),
        Just("\"a b"),
        Just("\""),
        Just("#"),
        Just(" "),
        Just("\n"),
        Just("\r\n"),
    ];
    prop::collection::vec(fragment, 0..40).prop_map(|parts| parts.concat())
}

fn grammar() -> impl Strategy<Value = GrammarKind> {
    prop_oneof![
        Just(GrammarKind::Host),
        Just(GrammarKind::Metadata),
        Just(GrammarKind::Hxml),
    ]
}

fn fixture() -> impl Strategy<Value = (&'static str, GrammarKind)> {
    prop_oneof![
        Just((SIMPLE_CLASS, GrammarKind::Host)),
        Just((CLASS_WITH_METADATA, GrammarKind::Host)),
        Just((FULL_MODULE, GrammarKind::Host)),
        Just((BUILD_FILE_FULL, GrammarKind::Hxml)),
    ]
}

/// An ASCII edit somewhere inside one of the fixtures
fn fixture_edit() -> impl Strategy<Value = (&'static str, GrammarKind, TextEdit)> {
    let inserted = prop_oneof![
        Just(""),
        Just("y"),
        Just(" "),
        Just(";"),
        Just("{"),
        Just("}"),
        Just("("),
        Just(")"),
        Just("'"),
        Just("\n"),
        Just("var z:Int; "),
        Just("@:keep "),
        Just("/*"),
    ];
    (fixture(), any::<prop::sample::Index>(), 0u32..4, inserted).prop_map(|((text, grammar), at, removed, inserted)| {
        let offset = at.index(text.len() + 1) as u32;
        let removed = removed.min(text.len() as u32 - offset);
        (
            text,
            grammar,
            TextEdit::new(TextSize::new(offset), TextSize::new(removed), inserted),
        )
    })
}

/// A closing delimiter typed right before an existing closer
fn closer_insertion() -> impl Strategy<Value = (&'static str, GrammarKind, TextEdit)> {
    let inserted = prop_oneof![Just("}"), Just(")"), Just("\n"), Just("x")];
    (fixture(), any::<prop::sample::Index>(), inserted).prop_map(|((text, grammar), at, inserted)| {
        let closers: Vec<usize> = text
            .match_indices(|c: char| matches!(c, '}' | ')' | '\n'))
            .map(|(offset, _)| offset)
            .collect();
        let offset = if closers.is_empty() {
            text.len()
        } else {
            closers[at.index(closers.len())]
        };
        (text, grammar, TextEdit::insert(TextSize::new(offset as u32), inserted))
    })
}

proptest! {
    #[test]
    fn prop_tokens_cover_input(text in "\\PC{0,120}", mode in prop_oneof![
        Just(LexMode::Code),
        Just(LexMode::Metadata),
        Just(LexMode::Hxml),
    ]) {
        let mut offset = TextSize::new(0);
        for token in tokenize(&text, mode) {
            prop_assert_eq!(token.range.start(), offset);
            prop_assert!(!token.range.is_empty());
            offset = token.range.end();
        }
        prop_assert_eq!(offset, TextSize::of(text.as_str()));
    }

    #[test]
    fn prop_arbitrary_text_is_lossless(text in "\\PC{0,200}", grammar in grammar()) {
        let tree = tree_of(&text, grammar);
        prop_assert_eq!(tree.render_text(), text);
    }

    #[test]
    fn prop_host_like_text_is_lossless(text in host_source()) {
        let tree = tree_of(&text, GrammarKind::Host);
        prop_assert_eq!(tree.render_text(), text.as_str());
        // Every diagnostic lies inside the document
        for diagnostic in tree.errors() {
            prop_assert!(diagnostic.range.end() <= TextSize::of(text.as_str()));
        }
    }

    #[test]
    fn prop_hxml_like_text_is_lossless(text in hxml_source()) {
        let tree = tree_of(&text, GrammarKind::Hxml);
        prop_assert_eq!(tree.render_text(), text);
    }

    #[test]
    fn prop_parsing_is_deterministic(text in host_source()) {
        let first = tree_of(&text, GrammarKind::Host);
        let second = tree_of(&text, GrammarKind::Host);
        prop_assert!(first.structurally_equal(&second));
        prop_assert_eq!(first.errors(), second.errors());
    }

    #[test]
    fn prop_reparse_matches_full_parse((text, grammar, edit) in fixture_edit()) {
        let old = tree_of(text, grammar);
        let reparsed = reparse(&old, text, &edit, &ParseConfig::default(), None).unwrap();
        prop_assert_eq!(reparsed.tree.render_text(), reparsed.text.as_str());
        assert_equivalent(&reparsed.tree, &tree_of(&reparsed.text, grammar));
    }

    #[test]
    fn prop_insertion_at_closer_matches_full_parse((text, grammar, edit) in closer_insertion()) {
        let old = tree_of(text, grammar);
        let reparsed = reparse(&old, text, &edit, &ParseConfig::default(), None).unwrap();
        prop_assert_eq!(reparsed.tree.render_text(), reparsed.text.as_str());
        assert_equivalent(&reparsed.tree, &tree_of(&reparsed.text, grammar));
    }

    #[test]
    fn prop_reparse_matches_on_generated_text(text in host_source(), at in any::<prop::sample::Index>()) {
        let offset = at.index(text.len() + 1) as u32;
        let edit = TextEdit::insert(TextSize::new(offset), "x;");
        let old = tree_of(&text, GrammarKind::Host);
        let reparsed = reparse(&old, &text, &edit, &ParseConfig::default(), None).unwrap();
        assert_equivalent(&reparsed.tree, &tree_of(&reparsed.text, GrammarKind::Host));
    }

    #[test]
    fn prop_nodes_outside_the_reparsed_interior_survive((text, grammar, edit) in fixture_edit()) {
        let old = tree_of(text, grammar);
        let reparsed = reparse(&old, text, &edit, &ParseConfig::default(), None).unwrap();
        if let ReparseOutcome::Incremental { node } = reparsed.outcome {
            let inside: Vec<_> = old.descendants(node).filter(|n| *n != node).collect();
            for kept in old.preorder().filter(|n| !inside.contains(n)) {
                prop_assert!(reparsed.tree.contains_node(kept));
                prop_assert_eq!(reparsed.tree.kind(kept), old.kind(kept));
            }
        }
    }
}

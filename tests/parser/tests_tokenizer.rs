//! Tokenizer behaviour across modes

use haxe_syntax::parser::{ErrorCode, LexMode, Token, Tokenizer, tokenize};
use haxe_syntax::{SyntaxKind, TextSize};
use rstest::rstest;

fn lex(text: &str, mode: LexMode) -> Vec<Token> {
    tokenize(text, mode).collect()
}

/// Tokens cover the input exactly, in order, with no empty token
fn assert_covers(text: &str, tokens: &[Token]) {
    let mut offset = TextSize::new(0);
    for token in tokens {
        assert_eq!(token.range.start(), offset, "gap before {token:?} in {text:?}");
        assert!(!token.range.is_empty(), "empty token {token:?} in {text:?}");
        offset = token.range.end();
    }
    assert_eq!(offset, TextSize::of(text), "input not fully covered: {text:?}");
}

#[rstest]
#[case("", LexMode::Code)]
#[case("class Foo { var x:Int; }", LexMode::Code)]
#[case("'unterminated ${ a + ", LexMode::Code)]
#[case("'${'${'${", LexMode::Code)]
#[case("/* never closed", LexMode::Code)]
#[case("@:a(@:b(@c", LexMode::Code)]
#[case("@@@@", LexMode::Code)]
#[case("#§¤ ñ 漢字 \u{0}", LexMode::Code)]
#[case("\"\\", LexMode::Code)]
#[case("}}}{{{", LexMode::Code)]
#[case("@:a('x') @b", LexMode::Metadata)]
#[case("-cp \"unterminated\n# c\n\n-x", LexMode::Hxml)]
#[case("\r\n\r\n-a\r\n", LexMode::Hxml)]
fn test_forward_progress(#[case] text: &str, #[case] mode: LexMode) {
    let tokens = lex(text, mode);
    assert!(tokens.len() <= text.len());
    assert_covers(text, &tokens);
}

#[test]
fn test_nested_generics_close_with_single_gt_tokens() {
    let kinds: Vec<_> = lex("Array<Array<Int>>", LexMode::Code)
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(kinds.iter().filter(|k| **k == SyntaxKind::GT).count(), 2);
}

#[test]
fn test_hxml_comment_is_significant() {
    let tokens = lex("# Main build\n-cp src\n", LexMode::Hxml);
    assert_eq!(tokens[0].kind, SyntaxKind::HXML_COMMENT);
    assert_eq!(tokens[0].range.len(), TextSize::new(12));
    assert_eq!(tokens[1].kind, SyntaxKind::NEWLINE);
}

#[test]
fn test_hxml_hash_inside_line_is_an_argument() {
    let tokens = lex("-D a#b\n", LexMode::Hxml);
    assert_eq!(tokens[2].kind, SyntaxKind::HXML_ARG);
    assert_eq!(tokens[2].text("-D a#b\n"), "a#b");
}

#[test]
fn test_interpolation_identifier() {
    let text = "'cost: $price$$'";
    let kinds: Vec<_> = lex(text, LexMode::Code).into_iter().map(|t| t.kind).collect();
    assert!(kinds.contains(&SyntaxKind::INTERP_IDENT), "{kinds:?}");
    assert_eq!(kinds.last(), Some(&SyntaxKind::STRING_END));
}

#[test]
fn test_block_comment_unterminated() {
    let tokens = lex("a /* b", LexMode::Code);
    let comment = tokens.last().unwrap();
    assert_eq!(comment.kind, SyntaxKind::BLOCK_COMMENT);
    assert_eq!(comment.error, Some(ErrorCode::E0103));
}

#[test]
fn test_standalone_metadata_repeats_entries() {
    let tokens = lex("@:a @b(1)", LexMode::Metadata);
    let sigils = tokens.iter().filter(|t| t.kind == SyntaxKind::AT).count();
    assert_eq!(sigils, 2);
    assert!(tokens.iter().all(|t| t.mode.is_metadata()));
}

#[test]
fn test_mode_reported_after_each_token() {
    let text = "@:m(1) var";
    let mut tokenizer = tokenize(text, LexMode::Code);
    let mut modes = Vec::new();
    while tokenizer.next().is_some() {
        modes.push(tokenizer.mode());
    }
    assert_eq!(modes.last(), Some(&LexMode::Code));
    assert!(modes.contains(&LexMode::MetadataArgs { depth: 1 }));
}

#[rstest]
#[case(LexMode::Code, true)]
#[case(LexMode::MetadataArgs { depth: 2 }, true)]
#[case(LexMode::Hxml, true)]
#[case(LexMode::StringLiteral, false)]
#[case(LexMode::Interpolation, false)]
#[case(LexMode::Metadata, false)]
fn test_resumable_modes(#[case] mode: LexMode, #[case] resumable: bool) {
    assert_eq!(mode.is_resumable(), resumable);
}

#[test]
fn test_resume_matches_full_lex() {
    let text = "class A { function f() { return [1, 2]; } }";
    let full = lex(text, LexMode::Code);
    let start = full[6].range.start();
    let resumed: Vec<_> = Tokenizer::at(text, start, LexMode::Code).collect();
    assert_eq!(&full[6..], &resumed[..]);
}

//! Build configuration grammar
//!
//! ```text
//! file         = (line | comment_line)*
//! line         = (FLAG | ARG)+ NEWLINE?
//! comment_line = COMMENT NEWLINE?
//! ```
//!
//! Blank lines never reach the grammar; the lexer turns them into trivia.

use super::{Grammar, GrammarBuilder, any, choice, closed_by, node, opt, repeat, self_contained, seq, token};
use crate::base::GrammarKind;
use crate::parser::errors::ErrorCode;
use crate::parser::syntax_kind::SyntaxKind::*;
use crate::parser::token_set::TokenSet;

/// Recovery point between lines
pub const LINE_SYNC: TokenSet = TokenSet::single(NEWLINE);

pub(super) fn grammar() -> Grammar {
    let mut b = GrammarBuilder::new();
    let line = b.rule(
        "line",
        self_contained(
            HXML_LINE,
            closed_by(repeat(any(TokenSet::new([HXML_FLAG, HXML_ARG]))), NEWLINE),
        )
        .sync(LINE_SYNC),
    );
    let comment_line = node(HXML_COMMENT_LINE, seq(vec![token(HXML_COMMENT), opt(token(NEWLINE))]));
    let file = b.rule("file", repeat(choice(vec![super::call(line), comment_line])));

    Grammar::compile(GrammarKind::Hxml, b, HXML_FILE, file, ErrorCode::E0601)
}

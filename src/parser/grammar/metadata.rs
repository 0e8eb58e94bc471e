//! Metadata grammar
//!
//! ```text
//! entry = '@' ':'? name ('(' value (',' value)* ','? ')')?
//! value = literal | path | call | array | object | prefix value | value op value
//! ```
//!
//! Embedded in host text before declarations and members, or parsed
//! standalone as a sequence of entries.

use super::{
    Assoc, Grammar, GrammarBuilder, Level, any, binary, call, choice, delimited, node, opt, postfix, repeat,
    self_contained, separated, seq, token,
};
use crate::base::GrammarKind;
use crate::parser::errors::ErrorCode;
use crate::parser::syntax_kind::SyntaxKind::*;
use crate::parser::token_set::TokenSet;

const LITERALS: TokenSet = TokenSet::new([INT_NUMBER, FLOAT_NUMBER, STRING, TRUE_KW, FALSE_KW, NULL_KW]);

/// Recovery points inside an argument list
pub const ARGUMENT_SYNC: TokenSet = TokenSet::new([COMMA, R_PAREN]);

pub(super) fn grammar() -> Grammar {
    let mut b = GrammarBuilder::new();
    let value = b.declare("value");
    let primary = b.declare("primary");

    let path = node(
        META_PATH,
        seq(vec![token(IDENT), repeat(seq(vec![token(DOT), token(IDENT)]))]),
    );
    let field = node(
        META_FIELD,
        seq(vec![any(TokenSet::new([IDENT, STRING])), token(COLON), call(value)]),
    );
    b.define(
        primary,
        choice(vec![
            node(META_LITERAL, any(LITERALS)),
            postfix(
                path,
                vec![(
                    META_CALL,
                    node(ARG_LIST, delimited(L_PAREN, separated(call(value), COMMA, true), R_PAREN)),
                )],
            ),
            node(
                META_ARRAY,
                delimited(L_BRACKET, separated(call(value), COMMA, true), R_BRACKET),
            ),
            node(META_OBJECT, delimited(L_BRACE, separated(field, COMMA, true), R_BRACE)),
            node(
                META_PREFIX,
                seq(vec![any(TokenSet::new([MINUS, BANG, TILDE])), call(primary)]),
            ),
        ]),
    );
    b.define(
        value,
        binary(
            META_BINARY,
            META_BINARY,
            call(primary),
            vec![
                Level::new(Assoc::Left, &[&[PIPE_PIPE]]),
                Level::new(Assoc::Left, &[&[AMP_AMP]]),
                Level::new(
                    Assoc::Left,
                    &[&[EQ_EQ], &[BANG_EQ], &[LT], &[LT_EQ], &[GT], &[GT, EQ]],
                ),
                Level::new(Assoc::Left, &[&[PIPE], &[AMP], &[CARET]]),
                Level::new(Assoc::Left, &[&[PLUS], &[MINUS]]),
                Level::new(Assoc::Left, &[&[STAR], &[SLASH], &[PERCENT]]),
            ],
        )
        .code(ErrorCode::E0406),
    );

    let arguments = self_contained(
        META_ARGS,
        delimited(L_PAREN, separated(call(value), COMMA, true), R_PAREN),
    )
    .sync(ARGUMENT_SYNC);
    let entry = b.rule(
        "entry",
        node(
            META_ENTRY,
            seq(vec![
                token(AT),
                opt(token(COLON)),
                node(
                    META_NAME,
                    seq(vec![
                        token(IDENT).code(ErrorCode::E0301),
                        repeat(seq(vec![token(DOT), token(IDENT)])),
                    ]),
                ),
                opt(arguments),
            ]),
        ),
    );
    let entries = b.rule("entries", repeat(call(entry)));

    Grammar::compile(GrammarKind::Metadata, b, META_FILE, entries, ErrorCode::E0901)
}

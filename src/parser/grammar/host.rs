//! Host language grammar
//!
//! ```text
//! file        = (package | import | using | type_decl)*
//! type_decl   = modifiers (class | interface | enum | typedef | abstract)
//! member      = modifiers (field | method)
//! statement   = local_var | expr terminator | ';'
//! expr        = binary(unary) where unary = prefix* postfix(primary)
//! macro_expr  = 'macro' (':' type | type_decl | local_var | expr)
//! ```
//!
//! Control flow constructs are expressions. Composite operators such as
//! `>>=` are glued from single `>` tokens.

use super::{
    Assoc, Grammar, GrammarBuilder, Level, any, binary, call, choice, contextual, delimited, embed, glued, guard,
    node, opt, postfix, repeat, self_contained, separated, seq, terminator, token,
};
use crate::base::GrammarKind;
use crate::parser::errors::ErrorCode;
use crate::parser::syntax_kind::SyntaxKind::{self, *};
use crate::parser::token_set::TokenSet;

pub const MODIFIERS: TokenSet = TokenSet::new([
    PUBLIC_KW,
    PRIVATE_KW,
    STATIC_KW,
    INLINE_KW,
    OVERRIDE_KW,
    DYNAMIC_KW,
    EXTERN_KW,
    MACRO_KW,
]);

pub const DECL_KEYWORDS: TokenSet = TokenSet::new([CLASS_KW, INTERFACE_KW, ENUM_KW, TYPEDEF_KW, ABSTRACT_KW]);

/// Recovery points between class members
pub const MEMBER_SYNC: TokenSet =
    TokenSet::new([SEMICOLON, R_BRACE, VAR_KW, FINAL_KW, FUNCTION_KW, AT]).union(MODIFIERS);

/// Recovery points between type declarations
pub const DECL_SYNC: TokenSet = DECL_KEYWORDS
    .union(TokenSet::new([PACKAGE_KW, IMPORT_KW, USING_KW, AT, FINAL_KW]))
    .union(MODIFIERS);

pub const STATEMENT_SYNC: TokenSet = TokenSet::new([SEMICOLON, R_BRACE]);

const LITERALS: TokenSet = TokenSet::new([
    INT_NUMBER,
    FLOAT_NUMBER,
    STRING,
    TRUE_KW,
    FALSE_KW,
    NULL_KW,
    THIS_KW,
]);

const PREFIX_OPS: TokenSet = TokenSet::new([MINUS, BANG, TILDE, PLUS_PLUS, MINUS_MINUS]);

/// Identifier positions that also take a `$name` reification
const NAMES: TokenSet = TokenSet::new([IDENT, DOLLAR_IDENT]);

/// Tokens after which `final` is a modifier rather than a field keyword
const FINAL_MODIFIER_FOLLOW: TokenSet = DECL_KEYWORDS.union(TokenSet::new([FUNCTION_KW, AT])).union(MODIFIERS);

const ACCESSORS: TokenSet = TokenSet::new([IDENT, DEFAULT_KW, NULL_KW, DYNAMIC_KW]);

fn dotted(kind: SyntaxKind) -> super::Rule {
    node(kind, seq(vec![token(IDENT), repeat(seq(vec![token(DOT), token(IDENT)]))]))
}

fn paren_list(kind: SyntaxKind, item: super::Rule) -> super::Rule {
    node(kind, delimited(L_PAREN, separated(item, COMMA, true), R_PAREN))
}

pub(super) fn grammar() -> Grammar {
    let mut b = GrammarBuilder::new();
    let expr = b.declare("expr");
    let ty = b.declare("type");
    let block = b.declare("block");
    let statement = b.declare("statement");
    let unary = b.declare("unary");
    let macro_decl = b.declare("macro_decl");

    // =========================================================================
    // Shared pieces
    // =========================================================================

    let name = b.rule("name", any(NAMES).code(ErrorCode::E0301));
    let type_annotation = b.rule("type_annotation", node(TYPE_ANNOTATION, seq(vec![token(COLON), call(ty)])));
    let initializer = b.rule("initializer", node(INITIALIZER, seq(vec![token(EQ), call(expr)])));
    let type_params = b.rule(
        "type_params",
        node(
            TYPE_PARAMS,
            seq(vec![
                token(LT),
                separated(
                    node(TYPE_PARAM, seq(vec![token(IDENT), opt(seq(vec![token(COLON), call(ty)]))])),
                    COMMA,
                    false,
                ),
                token(GT),
            ]),
        ),
    );
    let modifiers = b.rule(
        "modifiers",
        repeat(choice(vec![
            embed(GrammarKind::Metadata),
            any(MODIFIERS),
            guard(
                &[TokenSet::single(FINAL_KW), FINAL_MODIFIER_FOLLOW],
                token(FINAL_KW),
            ),
        ])),
    );
    let param = node(
        PARAM,
        seq(vec![
            opt(token(QUESTION)),
            call(name),
            opt(call(type_annotation)),
            opt(call(initializer)),
        ]),
    );
    let param_list = b.rule("param_list", paren_list(PARAM_LIST, param));
    let condition = b.rule("condition", node(CONDITION, delimited(L_PAREN, call(expr), R_PAREN)));

    // =========================================================================
    // Types
    // =========================================================================

    let type_args = node(
        TYPE_ARGS,
        seq(vec![token(LT), separated(call(ty), COMMA, false), token(GT)]),
    );
    let type_ref = b.rule("type_ref", node(TYPE_REF, seq(vec![dotted(PATH), opt(type_args)])));
    let anon_field = node(
        ANON_FIELD,
        seq(vec![opt(token(QUESTION)), token(IDENT), token(COLON), call(ty)]),
    );
    let type_atom = b.declare("type_atom");
    b.define(
        type_atom,
        choice(vec![
            call(type_ref),
            self_contained(
                ANON_TYPE,
                delimited(L_BRACE, separated(anon_field, COMMA, true), R_BRACE),
            ),
            node(PAREN_TYPE, delimited(L_PAREN, call(ty), R_PAREN)),
            node(OPTIONAL_TYPE, seq(vec![token(QUESTION), call(type_atom)])),
            node(REIFIED_NAME, token(DOLLAR_IDENT)),
        ]),
    );
    // `A->B->C` associates to the right
    b.define(
        ty,
        binary(
            FUNCTION_TYPE,
            FUNCTION_TYPE,
            call(type_atom),
            vec![Level::new(Assoc::Right, &[&[ARROW]])],
        ),
    );

    // =========================================================================
    // Expressions
    // =========================================================================

    let arg_list = b.rule("arg_list", paren_list(ARG_LIST, call(expr)));

    let string_literal = node(
        STRING_LITERAL,
        seq(vec![
            token(STRING_START),
            repeat(choice(vec![
                token(STRING_FRAGMENT),
                token(INTERP_IDENT),
                node(INTERPOLATION, delimited(INTERP_START, call(expr), INTERP_END)),
            ])),
            // Unterminated strings are reported by the lexer
            opt(token(STRING_END)),
        ]),
    );

    let object_field = node(
        OBJECT_FIELD,
        seq(vec![any(TokenSet::new([IDENT, STRING])), token(COLON), call(expr)]),
    );
    let object_literal = guard(
        &[
            TokenSet::single(L_BRACE),
            TokenSet::new([IDENT, STRING]),
            TokenSet::single(COLON),
        ],
        self_contained(
            OBJECT_LITERAL,
            delimited(L_BRACE, separated(object_field, COMMA, true), R_BRACE),
        ),
    );

    let array_element = postfix(call(expr), vec![(MAP_ENTRY, seq(vec![token(FAT_ARROW), call(expr)]))]);
    let array_literal = node(
        ARRAY_LITERAL,
        delimited(L_BRACKET, separated(array_element, COMMA, true), R_BRACKET),
    );

    let if_expr = node(
        IF_EXPR,
        seq(vec![
            token(IF_KW),
            call(condition),
            call(expr),
            opt(choice(vec![
                node(ELSE_BRANCH, seq(vec![token(ELSE_KW), call(expr)])),
                // `if (a) b; else c`
                guard(
                    &[TokenSet::single(SEMICOLON), TokenSet::single(ELSE_KW)],
                    node(ELSE_BRANCH, seq(vec![token(SEMICOLON), token(ELSE_KW), call(expr)])),
                ),
            ])),
        ]),
    );
    let for_head = node(
        FOR_HEAD,
        delimited(
            L_PAREN,
            seq(vec![
                any(NAMES),
                opt(seq(vec![token(FAT_ARROW), any(NAMES)])),
                token(IN_KW),
                call(expr),
            ]),
            R_PAREN,
        ),
    );
    let case_clause = node(
        CASE_CLAUSE,
        seq(vec![
            token(CASE_KW),
            separated(call(expr), COMMA, false),
            opt(seq(vec![token(IF_KW), call(condition)])),
            token(COLON),
            repeat(call(statement)),
        ]),
    );
    let default_clause = node(
        DEFAULT_CLAUSE,
        seq(vec![token(DEFAULT_KW), token(COLON), repeat(call(statement))]),
    );
    let switch_body = self_contained(
        SWITCH_BODY,
        delimited(L_BRACE, repeat(choice(vec![case_clause, default_clause])), R_BRACE),
    );
    let catch_clause = node(
        CATCH_CLAUSE,
        seq(vec![
            token(CATCH_KW),
            delimited(
                L_PAREN,
                seq(vec![token(IDENT), opt(call(type_annotation))]),
                R_PAREN,
            ),
            call(expr),
        ]),
    );

    let reification = node(REIFICATION, delimited(REIFY_START, call(expr), R_BRACE));
    let macro_expr = node(
        MACRO_EXPR,
        seq(vec![
            token(MACRO_KW),
            choice(vec![
                call(type_annotation),
                call(macro_decl),
                node(
                    LOCAL_VAR_DECL,
                    seq(vec![
                        any(TokenSet::new([VAR_KW, FINAL_KW])),
                        call(name),
                        opt(call(type_annotation)),
                        opt(call(initializer)),
                    ]),
                ),
                call(expr),
            ]),
        ]),
    );

    let primary = choice(vec![
        node(LITERAL, any(LITERALS)),
        string_literal,
        node(NAME_REF, token(IDENT)),
        node(REIFIED_NAME, token(DOLLAR_IDENT)),
        reification,
        macro_expr,
        node(
            PAREN_EXPR,
            delimited(L_PAREN, seq(vec![call(expr), opt(call(type_annotation))]), R_PAREN),
        ),
        array_literal,
        object_literal,
        call(block),
        if_expr,
        node(WHILE_EXPR, seq(vec![token(WHILE_KW), call(condition), call(expr)])),
        node(
            DO_WHILE_EXPR,
            seq(vec![token(DO_KW), call(expr), token(WHILE_KW), call(condition)]),
        ),
        node(FOR_EXPR, seq(vec![token(FOR_KW), for_head, call(expr)])),
        node(SWITCH_EXPR, seq(vec![token(SWITCH_KW), call(expr), switch_body])),
        node(
            TRY_EXPR,
            seq(vec![token(TRY_KW), call(expr), repeat(catch_clause)]),
        ),
        node(RETURN_EXPR, seq(vec![token(RETURN_KW), opt(call(expr))])),
        node(BREAK_EXPR, token(BREAK_KW)),
        node(CONTINUE_EXPR, token(CONTINUE_KW)),
        node(THROW_EXPR, seq(vec![token(THROW_KW), call(expr)])),
        node(
            NEW_EXPR,
            seq(vec![token(NEW_KW), call(type_ref), call(arg_list)]),
        ),
        node(
            LAMBDA_EXPR,
            seq(vec![
                token(FUNCTION_KW),
                opt(token(IDENT)),
                opt(call(type_params)),
                call(param_list),
                opt(call(type_annotation)),
                call(expr),
            ]),
        ),
        node(
            CAST_EXPR,
            seq(vec![
                token(CAST_KW),
                choice(vec![
                    delimited(
                        L_PAREN,
                        seq(vec![call(expr), opt(seq(vec![token(COMMA), call(ty)]))]),
                        R_PAREN,
                    ),
                    call(expr),
                ]),
            ]),
        ),
        node(UNTYPED_EXPR, seq(vec![token(UNTYPED_KW), call(expr)])),
    ]);

    let postfix_chain = postfix(
        primary,
        vec![
            (CALL_EXPR, call(arg_list)),
            (INDEX_EXPR, delimited(L_BRACKET, call(expr), R_BRACKET)),
            (SAFE_FIELD_EXPR, seq(vec![glued(&[QUESTION, DOT]), token(IDENT)])),
            (FIELD_EXPR, seq(vec![token(DOT), any(NAMES)])),
            (POSTFIX_EXPR, any(TokenSet::new([PLUS_PLUS, MINUS_MINUS]))),
        ],
    );
    b.define(
        unary,
        choice(vec![
            node(PREFIX_EXPR, seq(vec![any(PREFIX_OPS), call(unary)])),
            postfix_chain,
        ]),
    );

    b.define(
        expr,
        binary(
            BINARY_EXPR,
            TERNARY_EXPR,
            call(unary),
            vec![
                Level::new(
                    Assoc::Right,
                    &[
                        &[EQ],
                        &[PLUS_EQ],
                        &[MINUS_EQ],
                        &[STAR_EQ],
                        &[SLASH_EQ],
                        &[PERCENT_EQ],
                        &[AMP_EQ],
                        &[PIPE_EQ],
                        &[CARET_EQ],
                        &[SHL_EQ],
                        &[GT, GT, EQ],
                        &[GT, GT, GT, EQ],
                    ],
                ),
                Level::ternary(QUESTION, COLON),
                Level::new(Assoc::Right, &[&[QUESTION_QUESTION]]),
                Level::new(Assoc::Left, &[&[PIPE_PIPE]]),
                Level::new(Assoc::Left, &[&[AMP_AMP]]),
                Level::new(Assoc::Left, &[&[DOT_DOT_DOT]]),
                Level::new(
                    Assoc::Left,
                    &[&[EQ_EQ], &[BANG_EQ], &[LT], &[LT_EQ], &[GT], &[GT, EQ]],
                ),
                Level::new(Assoc::Left, &[&[PIPE], &[AMP], &[CARET]]),
                Level::new(Assoc::Left, &[&[SHL], &[GT, GT], &[GT, GT, GT]]),
                Level::new(Assoc::Left, &[&[PLUS], &[MINUS]]),
                Level::new(Assoc::Left, &[&[STAR], &[SLASH]]),
                Level::new(Assoc::Left, &[&[PERCENT]]),
            ],
        )
        .code(ErrorCode::E0406),
    );

    // =========================================================================
    // Statements
    // =========================================================================

    let local_var = node(
        LOCAL_VAR_DECL,
        seq(vec![
            any(TokenSet::new([VAR_KW, FINAL_KW])),
            call(name),
            opt(call(type_annotation)),
            opt(call(initializer)),
            terminator(SEMICOLON, R_BRACE),
        ]),
    );
    b.define(
        statement,
        choice(vec![
            local_var,
            node(EXPR_STMT, seq(vec![call(expr), terminator(SEMICOLON, R_BRACE)])),
            token(SEMICOLON),
        ])
        .sync(STATEMENT_SYNC),
    );
    b.define(
        block,
        self_contained(BLOCK, delimited(L_BRACE, repeat(call(statement)), R_BRACE)),
    );

    // =========================================================================
    // Members
    // =========================================================================

    let accessors = node(
        PROPERTY_ACCESSORS,
        delimited(L_PAREN, separated(any(ACCESSORS), COMMA, false), R_PAREN),
    );
    let field = seq(vec![
        any(TokenSet::new([VAR_KW, FINAL_KW])),
        call(name),
        opt(accessors),
        opt(call(type_annotation)),
        opt(call(initializer)),
        token(SEMICOLON),
    ]);
    let method = seq(vec![
        token(FUNCTION_KW),
        any(TokenSet::new([IDENT, NEW_KW])).code(ErrorCode::E0301),
        opt(call(type_params)),
        call(param_list),
        opt(call(type_annotation)),
        choice(vec![
            call(block),
            token(SEMICOLON),
            seq(vec![call(expr), token(SEMICOLON)]),
        ]),
    ]);
    let member = b.rule(
        "member",
        node(MEMBER, seq(vec![call(modifiers), choice(vec![field, method])])).sync(MEMBER_SYNC),
    );
    let class_body = b.rule(
        "class_body",
        self_contained(CLASS_BODY, delimited(L_BRACE, repeat(call(member)), R_BRACE)),
    );

    // =========================================================================
    // Declarations
    // =========================================================================

    let heritage = repeat(choice(vec![
        node(EXTENDS_CLAUSE, seq(vec![token(EXTENDS_KW), call(type_ref)])),
        node(IMPLEMENTS_CLAUSE, seq(vec![token(IMPLEMENTS_KW), call(type_ref)])),
    ]));
    let class_tail = seq(vec![
        token(CLASS_KW),
        call(name),
        opt(call(type_params)),
        heritage.clone(),
        call(class_body),
    ]);
    let interface_tail = seq(vec![
        token(INTERFACE_KW),
        call(name),
        opt(call(type_params)),
        heritage,
        call(class_body),
    ]);
    let enum_ctor = node(
        ENUM_CTOR,
        seq(vec![
            repeat(embed(GrammarKind::Metadata)),
            call(name),
            opt(call(param_list)),
            token(SEMICOLON),
        ]),
    );
    let enum_tail = seq(vec![
        token(ENUM_KW),
        call(name),
        opt(call(type_params)),
        self_contained(ENUM_BODY, delimited(L_BRACE, repeat(enum_ctor), R_BRACE)),
    ]);
    let typedef_tail = seq(vec![
        token(TYPEDEF_KW),
        call(name),
        opt(call(type_params)),
        token(EQ),
        call(ty),
        terminator(SEMICOLON, R_BRACE),
    ]);
    let abstract_tail = seq(vec![
        token(ABSTRACT_KW),
        call(name),
        opt(call(type_params)),
        opt(node(UNDERLYING_TYPE, delimited(L_PAREN, call(ty), R_PAREN))),
        repeat(node(
            ABSTRACT_CAST,
            seq(vec![choice(vec![contextual("from"), contextual("to")]), call(ty)]),
        )),
        call(class_body),
    ]);
    let decl_tail = b.rule(
        "decl_tail",
        choice(vec![class_tail, interface_tail, enum_tail, typedef_tail, abstract_tail]),
    );
    // `macro class ...` inside an expression
    b.define(macro_decl, node(TYPE_DECL, call(decl_tail)));
    let type_decl = node(TYPE_DECL, seq(vec![call(modifiers), call(decl_tail)])).sync(DECL_SYNC);

    let import_path = node(
        PATH,
        seq(vec![
            token(IDENT),
            repeat(seq(vec![token(DOT), any(TokenSet::new([IDENT, STAR]))])),
        ]),
    );
    let alias = opt(seq(vec![
        choice(vec![token(IN_KW), contextual("as")]),
        token(IDENT),
    ]));
    let file_item = choice(vec![
        node(PACKAGE_DECL, seq(vec![token(PACKAGE_KW), opt(dotted(PATH)), token(SEMICOLON)])),
        node(IMPORT_DECL, seq(vec![token(IMPORT_KW), import_path, alias, token(SEMICOLON)])),
        node(USING_DECL, seq(vec![token(USING_KW), dotted(PATH), token(SEMICOLON)])),
        type_decl,
    ]);
    let file = b.rule("file", repeat(file_item));

    Grammar::compile(GrammarKind::Host, b, SOURCE_FILE, file, ErrorCode::E0304)
}

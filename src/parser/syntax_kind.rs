//! Syntax kinds for the concrete syntax tree and the typed tree
//!
//! One enum covers the three grammars (host language, metadata, hxml). Token
//! kinds come first, node kinds after them; `TokenSet` relies on every kind
//! fitting into 256 bits.

/// All syntax kinds (tokens and nodes)
///
/// Tokens are leaves produced by the tokenizer.
/// Nodes are either raw grammar productions (`TYPE_DECL`, `MEMBER`, ...) or
/// semantic kinds assigned by the tree builder (`CLASS_DECL`, `FIELD_DECL`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but never parsed)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,

    // =========================================================================
    // SPECIAL TOKENS
    // =========================================================================
    ERROR_TOKEN,        // unknown character
    EOF,                // zero-width end marker, owns the final trivia

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,              // identifier
    INT_NUMBER,         // 42, 0xFF
    FLOAT_NUMBER,       // 3.14, .5, 1e10
    STRING,             // "hello" (and 'hello' inside metadata)
    STRING_START,       // opening ' of an interpolated string
    STRING_FRAGMENT,    // raw text inside '...'
    STRING_END,         // closing '
    INTERP_IDENT,       // $name
    INTERP_START,       // ${
    INTERP_END,         // } closing an interpolation
    DOLLAR_IDENT,       // $name in macro code
    REIFY_START,        // ${ $e{ $v{ $i{ $a{ $b{ $p{ in macro code

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,            // {
    R_BRACE,            // }
    L_PAREN,            // (
    R_PAREN,            // )
    L_BRACKET,          // [
    R_BRACKET,          // ]
    SEMICOLON,          // ;
    COMMA,              // ,
    DOT,                // .
    DOT_DOT_DOT,        // ...
    COLON,              // :
    QUESTION,           // ?
    QUESTION_QUESTION,  // ??
    AT,                 // @ (metadata sigil)
    ARROW,              // ->
    FAT_ARROW,          // =>
    EQ,                 // =
    EQ_EQ,              // ==
    BANG_EQ,            // !=
    LT,                 // <
    GT,                 // >  (never merged by the lexer, see composed operators)
    LT_EQ,              // <=
    SHL,                // <<
    PLUS,               // +
    MINUS,              // -
    STAR,               // *
    SLASH,              // /
    PERCENT,            // %
    PLUS_PLUS,          // ++
    MINUS_MINUS,        // --
    BANG,               // !
    TILDE,              // ~
    AMP,                // &
    PIPE,               // |
    CARET,              // ^
    AMP_AMP,            // &&
    PIPE_PIPE,          // ||
    PLUS_EQ,            // +=
    MINUS_EQ,           // -=
    STAR_EQ,            // *=
    SLASH_EQ,           // /=
    PERCENT_EQ,         // %=
    AMP_EQ,             // &=
    PIPE_EQ,            // |=
    CARET_EQ,           // ^=
    SHL_EQ,             // <<=

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    PACKAGE_KW,
    IMPORT_KW,
    USING_KW,
    CLASS_KW,
    INTERFACE_KW,
    ENUM_KW,
    ABSTRACT_KW,
    TYPEDEF_KW,
    EXTENDS_KW,
    IMPLEMENTS_KW,
    VAR_KW,
    FINAL_KW,
    FUNCTION_KW,
    NEW_KW,
    RETURN_KW,
    IF_KW,
    ELSE_KW,
    WHILE_KW,
    DO_KW,
    FOR_KW,
    IN_KW,
    BREAK_KW,
    CONTINUE_KW,
    SWITCH_KW,
    CASE_KW,
    DEFAULT_KW,
    TRY_KW,
    CATCH_KW,
    THROW_KW,
    THIS_KW,
    NULL_KW,
    TRUE_KW,
    FALSE_KW,
    CAST_KW,
    UNTYPED_KW,
    PUBLIC_KW,
    PRIVATE_KW,
    STATIC_KW,
    INLINE_KW,
    OVERRIDE_KW,
    DYNAMIC_KW,
    EXTERN_KW,
    MACRO_KW,

    // =========================================================================
    // HXML TOKENS
    // =========================================================================
    HXML_FLAG,          // -cp, --macro
    HXML_ARG,           // src, "quoted arg"
    HXML_COMMENT,       // # comment line (significant in hxml)
    NEWLINE,            // end of a non-blank hxml line

    // =========================================================================
    // NODES - host declarations
    // =========================================================================
    SOURCE_FILE,
    PACKAGE_DECL,
    IMPORT_DECL,
    USING_DECL,
    PATH,
    TYPE_DECL,
    CLASS_DECL,
    INTERFACE_DECL,
    ENUM_DECL,
    TYPEDEF_DECL,
    ABSTRACT_DECL,
    TYPE_PARAMS,
    TYPE_PARAM,
    EXTENDS_CLAUSE,
    IMPLEMENTS_CLAUSE,
    UNDERLYING_TYPE,
    ABSTRACT_CAST,
    CLASS_BODY,
    ENUM_BODY,
    ENUM_CTOR,
    MEMBER,
    FIELD_DECL,
    METHOD_DECL,
    PROPERTY_ACCESSORS,
    PARAM_LIST,
    PARAM,
    TYPE_ANNOTATION,
    INITIALIZER,

    // =========================================================================
    // NODES - types
    // =========================================================================
    TYPE_REF,
    TYPE_ARGS,
    FUNCTION_TYPE,
    ANON_TYPE,
    ANON_FIELD,
    OPTIONAL_TYPE,
    PAREN_TYPE,

    // =========================================================================
    // NODES - statements and expressions
    // =========================================================================
    BLOCK,
    LOCAL_VAR_DECL,
    EXPR_STMT,
    LITERAL,
    NAME_REF,
    PAREN_EXPR,
    ARRAY_LITERAL,
    MAP_ENTRY,
    OBJECT_LITERAL,
    OBJECT_FIELD,
    STRING_LITERAL,
    INTERPOLATION,
    CALL_EXPR,
    ARG_LIST,
    INDEX_EXPR,
    FIELD_EXPR,
    SAFE_FIELD_EXPR,
    PREFIX_EXPR,
    POSTFIX_EXPR,
    BINARY_EXPR,
    TERNARY_EXPR,
    NEW_EXPR,
    LAMBDA_EXPR,
    CAST_EXPR,
    UNTYPED_EXPR,
    CONDITION,
    IF_EXPR,
    ELSE_BRANCH,
    WHILE_EXPR,
    DO_WHILE_EXPR,
    FOR_EXPR,
    FOR_HEAD,
    RETURN_EXPR,
    BREAK_EXPR,
    CONTINUE_EXPR,
    THROW_EXPR,
    TRY_EXPR,
    CATCH_CLAUSE,
    SWITCH_EXPR,
    SWITCH_BODY,
    CASE_CLAUSE,
    DEFAULT_CLAUSE,
    MACRO_EXPR,         // macro expr, macro : Type, macro class ...
    REIFICATION,        // $v{...} and the other splices
    REIFIED_NAME,       // $name standing for an identifier or a type

    // =========================================================================
    // NODES - metadata
    // =========================================================================
    EMBEDDING,          // metadata region delegated to the metadata grammar
    META_FILE,
    META_ENTRY,
    META_NAME,
    META_ARGS,
    META_LITERAL,
    META_PATH,
    META_CALL,
    META_ARRAY,
    META_OBJECT,
    META_FIELD,
    META_PREFIX,
    META_BINARY,

    // =========================================================================
    // NODES - hxml
    // =========================================================================
    HXML_FILE,
    HXML_LINE,
    HXML_OPTION,
    HXML_COMMENT_LINE,

    // Special
    ERROR,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::LINE_COMMENT | Self::BLOCK_COMMENT)
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::PACKAGE_KW as u16) && (self as u16) <= (Self::MACRO_KW as u16)
    }

    /// Check if this is a punctuation token
    pub fn is_punct(self) -> bool {
        (self as u16) >= (Self::L_BRACE as u16) && (self as u16) <= (Self::SHL_EQ as u16)
    }

    /// Check if this is a literal
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::INT_NUMBER | Self::FLOAT_NUMBER | Self::STRING | Self::TRUE_KW | Self::FALSE_KW | Self::NULL_KW
        )
    }

    /// Tokens are every kind before the first node kind
    pub fn is_token(self) -> bool {
        (self as u16) < (Self::SOURCE_FILE as u16)
    }

    /// Closing counterpart of an opening bracket token
    pub fn closing_bracket(self) -> Option<SyntaxKind> {
        match self {
            Self::L_BRACE => Some(Self::R_BRACE),
            Self::L_PAREN => Some(Self::R_PAREN),
            Self::L_BRACKET => Some(Self::R_BRACKET),
            Self::INTERP_START => Some(Self::INTERP_END),
            Self::REIFY_START => Some(Self::R_BRACE),
            _ => None,
        }
    }

    pub fn is_closing_bracket(self) -> bool {
        matches!(self, Self::R_BRACE | Self::R_PAREN | Self::R_BRACKET | Self::INTERP_END)
    }

    /// Human readable name used in diagnostics
    pub fn describe(self) -> &'static str {
        match self {
            Self::WHITESPACE => "whitespace",
            Self::LINE_COMMENT | Self::BLOCK_COMMENT => "comment",
            Self::ERROR_TOKEN => "invalid character",
            Self::EOF => "end of file",
            Self::IDENT => "identifier",
            Self::INT_NUMBER => "integer",
            Self::FLOAT_NUMBER => "float",
            Self::STRING => "string",
            Self::STRING_START | Self::STRING_END => "quote",
            Self::STRING_FRAGMENT => "string text",
            Self::INTERP_IDENT => "$identifier",
            Self::INTERP_START => "'${'",
            Self::INTERP_END => "'}'",
            Self::DOLLAR_IDENT => "reified identifier",
            Self::REIFY_START => "reification",
            Self::L_BRACE => "'{'",
            Self::R_BRACE => "'}'",
            Self::L_PAREN => "'('",
            Self::R_PAREN => "')'",
            Self::L_BRACKET => "'['",
            Self::R_BRACKET => "']'",
            Self::SEMICOLON => "';'",
            Self::COMMA => "','",
            Self::DOT => "'.'",
            Self::DOT_DOT_DOT => "'...'",
            Self::COLON => "':'",
            Self::QUESTION => "'?'",
            Self::QUESTION_QUESTION => "'??'",
            Self::AT => "'@'",
            Self::ARROW => "'->'",
            Self::FAT_ARROW => "'=>'",
            Self::EQ => "'='",
            Self::EQ_EQ => "'=='",
            Self::BANG_EQ => "'!='",
            Self::LT => "'<'",
            Self::GT => "'>'",
            Self::LT_EQ => "'<='",
            Self::SHL => "'<<'",
            Self::PLUS => "'+'",
            Self::MINUS => "'-'",
            Self::STAR => "'*'",
            Self::SLASH => "'/'",
            Self::PERCENT => "'%'",
            Self::PLUS_PLUS => "'++'",
            Self::MINUS_MINUS => "'--'",
            Self::BANG => "'!'",
            Self::TILDE => "'~'",
            Self::AMP => "'&'",
            Self::PIPE => "'|'",
            Self::CARET => "'^'",
            Self::AMP_AMP => "'&&'",
            Self::PIPE_PIPE => "'||'",
            Self::PLUS_EQ => "'+='",
            Self::MINUS_EQ => "'-='",
            Self::STAR_EQ => "'*='",
            Self::SLASH_EQ => "'/='",
            Self::PERCENT_EQ => "'%='",
            Self::AMP_EQ => "'&='",
            Self::PIPE_EQ => "'|='",
            Self::CARET_EQ => "'^='",
            Self::SHL_EQ => "'<<='",
            Self::PACKAGE_KW => "'package'",
            Self::IMPORT_KW => "'import'",
            Self::USING_KW => "'using'",
            Self::CLASS_KW => "'class'",
            Self::INTERFACE_KW => "'interface'",
            Self::ENUM_KW => "'enum'",
            Self::ABSTRACT_KW => "'abstract'",
            Self::TYPEDEF_KW => "'typedef'",
            Self::EXTENDS_KW => "'extends'",
            Self::IMPLEMENTS_KW => "'implements'",
            Self::VAR_KW => "'var'",
            Self::FINAL_KW => "'final'",
            Self::FUNCTION_KW => "'function'",
            Self::NEW_KW => "'new'",
            Self::RETURN_KW => "'return'",
            Self::IF_KW => "'if'",
            Self::ELSE_KW => "'else'",
            Self::WHILE_KW => "'while'",
            Self::DO_KW => "'do'",
            Self::FOR_KW => "'for'",
            Self::IN_KW => "'in'",
            Self::BREAK_KW => "'break'",
            Self::CONTINUE_KW => "'continue'",
            Self::SWITCH_KW => "'switch'",
            Self::CASE_KW => "'case'",
            Self::DEFAULT_KW => "'default'",
            Self::TRY_KW => "'try'",
            Self::CATCH_KW => "'catch'",
            Self::THROW_KW => "'throw'",
            Self::THIS_KW => "'this'",
            Self::NULL_KW => "'null'",
            Self::TRUE_KW => "'true'",
            Self::FALSE_KW => "'false'",
            Self::CAST_KW => "'cast'",
            Self::UNTYPED_KW => "'untyped'",
            Self::PUBLIC_KW => "'public'",
            Self::PRIVATE_KW => "'private'",
            Self::STATIC_KW => "'static'",
            Self::INLINE_KW => "'inline'",
            Self::OVERRIDE_KW => "'override'",
            Self::DYNAMIC_KW => "'dynamic'",
            Self::EXTERN_KW => "'extern'",
            Self::MACRO_KW => "'macro'",
            Self::HXML_FLAG => "option flag",
            Self::HXML_ARG => "argument",
            Self::HXML_COMMENT => "comment line",
            Self::NEWLINE => "line break",
            _ => "syntax node",
        }
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HaxeLanguage {}

impl rowan::Language for HaxeLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for the concrete (rowan) tree
pub type CstNode = rowan::SyntaxNode<HaxeLanguage>;
pub type CstToken = rowan::SyntaxToken<HaxeLanguage>;
pub type CstElement = rowan::SyntaxElement<HaxeLanguage>;

const _: () = assert!((SyntaxKind::__LAST as u16) <= 256);

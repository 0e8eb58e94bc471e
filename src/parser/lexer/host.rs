//! Host language lexing: code, interpolation and string-literal modes

use logos::Logos;

use super::{Frame, LexMode, Token, Tokenizer};
use crate::parser::errors::ErrorCode;
use crate::parser::syntax_kind::SyntaxKind;

impl Tokenizer<'_> {
    /// Code and interpolation mode. Returns `None` after switching into
    /// metadata mode without consuming input.
    pub(super) fn lex_code(&mut self) -> Option<Token> {
        let mode = self.mode();
        let rest = self.rest();
        if rest.starts_with('@') {
            self.push(Frame::MetaHead {
                phase: super::metadata::HeadPhase::Sigil,
            });
            return None;
        }

        let mut lexer = CodeToken::lexer(rest);
        let lexeme = match lexer.next() {
            Some(Ok(lexeme)) => lexeme,
            _ => return Some(self.unknown(mode)),
        };
        let len = lexer.span().end;

        let token = match lexeme {
            CodeToken::Quote => {
                let token = self.emit(SyntaxKind::STRING_START, len, mode, None);
                self.push(Frame::Str);
                self.close_string_at_line_end(token)
            }
            // A reification opens a brace like `{` does
            CodeToken::LBrace | CodeToken::ReifyStart => {
                if let Frame::Interp { depth } = self.top_mut() {
                    *depth += 1;
                }
                self.emit(lexeme.into(), len, mode, None)
            }
            CodeToken::RBrace => match self.top() {
                Frame::Interp { depth: 0 } => {
                    let token = self.emit(SyntaxKind::INTERP_END, len, mode, None);
                    self.pop();
                    self.close_string_at_line_end(token)
                }
                Frame::Interp { .. } => {
                    if let Frame::Interp { depth } = self.top_mut() {
                        *depth -= 1;
                    }
                    self.emit(SyntaxKind::R_BRACE, len, mode, None)
                }
                _ => self.emit(SyntaxKind::R_BRACE, len, mode, None),
            },
            CodeToken::UnterminatedBlockComment => {
                self.emit(SyntaxKind::BLOCK_COMMENT, len, mode, Some(ErrorCode::E0103))
            }
            CodeToken::UnterminatedString => self.emit(SyntaxKind::STRING, len, mode, Some(ErrorCode::E0102)),
            other => self.emit(other.into(), len, mode, None),
        };
        Some(token)
    }

    /// Inside `'...'`
    pub(super) fn lex_string(&mut self) -> Option<Token> {
        let mode = LexMode::StringLiteral;
        let mut lexer = StringToken::lexer(self.rest());
        let lexeme = lexer.next().and_then(Result::ok);
        let len = lexer.span().end.max(1);

        let token = match lexeme {
            Some(StringToken::End) => {
                let token = self.emit(SyntaxKind::STRING_END, len, mode, None);
                self.pop();
                return Some(token);
            }
            Some(StringToken::InterpStart) => {
                let token = self.emit(SyntaxKind::INTERP_START, len, mode, None);
                self.push(Frame::Interp { depth: 0 });
                return Some(token);
            }
            Some(StringToken::InterpIdent) => self.emit(SyntaxKind::INTERP_IDENT, len, mode, None),
            Some(StringToken::Fragment) | Some(StringToken::Dollar) => {
                self.emit(SyntaxKind::STRING_FRAGMENT, len, mode, None)
            }
            // A lone backslash before the line break
            None => {
                let len = self.rest().chars().next().map(char::len_utf8).unwrap_or(1);
                self.emit(SyntaxKind::STRING_FRAGMENT, len, mode, None)
            }
        };
        Some(self.close_string_at_line_end(token))
    }

    /// A string still open at a line break or at the end of input closes
    /// there; the last token inside it carries the error.
    fn close_string_at_line_end(&mut self, mut token: Token) -> Token {
        if self.top() == Frame::Str && self.at_line_end() {
            token.error = Some(ErrorCode::E0102);
            self.pop();
        }
        token
    }
}

/// Tokens of code mode (also used inside `${ ... }`)
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub(super) enum CodeToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//[^\r\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\**")]
    UnterminatedBlockComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+")]
    #[regex(r"0[xX][0-9a-fA-F]+")]
    Int,

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    Float,

    #[regex(r#""([^"\\\r\n]|\\[^\r\n])*""#)]
    String,

    #[regex(r#""([^"\\\r\n]|\\[^\r\n])*\\?"#)]
    UnterminatedString,

    #[token("'")]
    Quote,

    // =========================================================================
    // MACRO REIFICATION
    // =========================================================================
    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*")]
    DollarIdent,

    #[regex(r"\$[abeipv]?\{")]
    ReifyStart,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("...")]
    DotDotDot,
    #[token("??")]
    QuestionQuestion,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token("<<")]
    Shl,
    #[token("<<=")]
    ShlEq,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    // `>` stays single so `>>`, `>>>` and `>=` are composed by the grammar
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("package")]
    PackageKw,
    #[token("import")]
    ImportKw,
    #[token("using")]
    UsingKw,
    #[token("class")]
    ClassKw,
    #[token("interface")]
    InterfaceKw,
    #[token("enum")]
    EnumKw,
    #[token("abstract")]
    AbstractKw,
    #[token("typedef")]
    TypedefKw,
    #[token("extends")]
    ExtendsKw,
    #[token("implements")]
    ImplementsKw,
    #[token("var")]
    VarKw,
    #[token("final")]
    FinalKw,
    #[token("function")]
    FunctionKw,
    #[token("new")]
    NewKw,
    #[token("return")]
    ReturnKw,
    #[token("if")]
    IfKw,
    #[token("else")]
    ElseKw,
    #[token("while")]
    WhileKw,
    #[token("do")]
    DoKw,
    #[token("for")]
    ForKw,
    #[token("in")]
    InKw,
    #[token("break")]
    BreakKw,
    #[token("continue")]
    ContinueKw,
    #[token("switch")]
    SwitchKw,
    #[token("case")]
    CaseKw,
    #[token("default")]
    DefaultKw,
    #[token("try")]
    TryKw,
    #[token("catch")]
    CatchKw,
    #[token("throw")]
    ThrowKw,
    #[token("this")]
    ThisKw,
    #[token("null")]
    NullKw,
    #[token("true")]
    TrueKw,
    #[token("false")]
    FalseKw,
    #[token("cast")]
    CastKw,
    #[token("untyped")]
    UntypedKw,
    #[token("public")]
    PublicKw,
    #[token("private")]
    PrivateKw,
    #[token("static")]
    StaticKw,
    #[token("inline")]
    InlineKw,
    #[token("override")]
    OverrideKw,
    #[token("dynamic")]
    DynamicKw,
    #[token("extern")]
    ExternKw,
    #[token("macro")]
    MacroKw,
}

impl From<CodeToken> for SyntaxKind {
    fn from(token: CodeToken) -> Self {
        use CodeToken::*;
        match token {
            Whitespace => SyntaxKind::WHITESPACE,
            LineComment => SyntaxKind::LINE_COMMENT,
            BlockComment | UnterminatedBlockComment => SyntaxKind::BLOCK_COMMENT,
            Ident => SyntaxKind::IDENT,
            Int => SyntaxKind::INT_NUMBER,
            Float => SyntaxKind::FLOAT_NUMBER,
            String | UnterminatedString => SyntaxKind::STRING,
            Quote => SyntaxKind::STRING_START,
            DollarIdent => SyntaxKind::DOLLAR_IDENT,
            ReifyStart => SyntaxKind::REIFY_START,
            DotDotDot => SyntaxKind::DOT_DOT_DOT,
            QuestionQuestion => SyntaxKind::QUESTION_QUESTION,
            Arrow => SyntaxKind::ARROW,
            FatArrow => SyntaxKind::FAT_ARROW,
            EqEq => SyntaxKind::EQ_EQ,
            BangEq => SyntaxKind::BANG_EQ,
            LtEq => SyntaxKind::LT_EQ,
            Shl => SyntaxKind::SHL,
            ShlEq => SyntaxKind::SHL_EQ,
            PlusPlus => SyntaxKind::PLUS_PLUS,
            MinusMinus => SyntaxKind::MINUS_MINUS,
            AmpAmp => SyntaxKind::AMP_AMP,
            PipePipe => SyntaxKind::PIPE_PIPE,
            PlusEq => SyntaxKind::PLUS_EQ,
            MinusEq => SyntaxKind::MINUS_EQ,
            StarEq => SyntaxKind::STAR_EQ,
            SlashEq => SyntaxKind::SLASH_EQ,
            PercentEq => SyntaxKind::PERCENT_EQ,
            AmpEq => SyntaxKind::AMP_EQ,
            PipeEq => SyntaxKind::PIPE_EQ,
            CaretEq => SyntaxKind::CARET_EQ,
            LBrace => SyntaxKind::L_BRACE,
            RBrace => SyntaxKind::R_BRACE,
            LParen => SyntaxKind::L_PAREN,
            RParen => SyntaxKind::R_PAREN,
            LBracket => SyntaxKind::L_BRACKET,
            RBracket => SyntaxKind::R_BRACKET,
            Semicolon => SyntaxKind::SEMICOLON,
            Comma => SyntaxKind::COMMA,
            Dot => SyntaxKind::DOT,
            Colon => SyntaxKind::COLON,
            Question => SyntaxKind::QUESTION,
            Eq => SyntaxKind::EQ,
            Lt => SyntaxKind::LT,
            Gt => SyntaxKind::GT,
            Plus => SyntaxKind::PLUS,
            Minus => SyntaxKind::MINUS,
            Star => SyntaxKind::STAR,
            Slash => SyntaxKind::SLASH,
            Percent => SyntaxKind::PERCENT,
            Bang => SyntaxKind::BANG,
            Tilde => SyntaxKind::TILDE,
            Amp => SyntaxKind::AMP,
            Pipe => SyntaxKind::PIPE,
            Caret => SyntaxKind::CARET,
            PackageKw => SyntaxKind::PACKAGE_KW,
            ImportKw => SyntaxKind::IMPORT_KW,
            UsingKw => SyntaxKind::USING_KW,
            ClassKw => SyntaxKind::CLASS_KW,
            InterfaceKw => SyntaxKind::INTERFACE_KW,
            EnumKw => SyntaxKind::ENUM_KW,
            AbstractKw => SyntaxKind::ABSTRACT_KW,
            TypedefKw => SyntaxKind::TYPEDEF_KW,
            ExtendsKw => SyntaxKind::EXTENDS_KW,
            ImplementsKw => SyntaxKind::IMPLEMENTS_KW,
            VarKw => SyntaxKind::VAR_KW,
            FinalKw => SyntaxKind::FINAL_KW,
            FunctionKw => SyntaxKind::FUNCTION_KW,
            NewKw => SyntaxKind::NEW_KW,
            ReturnKw => SyntaxKind::RETURN_KW,
            IfKw => SyntaxKind::IF_KW,
            ElseKw => SyntaxKind::ELSE_KW,
            WhileKw => SyntaxKind::WHILE_KW,
            DoKw => SyntaxKind::DO_KW,
            ForKw => SyntaxKind::FOR_KW,
            InKw => SyntaxKind::IN_KW,
            BreakKw => SyntaxKind::BREAK_KW,
            ContinueKw => SyntaxKind::CONTINUE_KW,
            SwitchKw => SyntaxKind::SWITCH_KW,
            CaseKw => SyntaxKind::CASE_KW,
            DefaultKw => SyntaxKind::DEFAULT_KW,
            TryKw => SyntaxKind::TRY_KW,
            CatchKw => SyntaxKind::CATCH_KW,
            ThrowKw => SyntaxKind::THROW_KW,
            ThisKw => SyntaxKind::THIS_KW,
            NullKw => SyntaxKind::NULL_KW,
            TrueKw => SyntaxKind::TRUE_KW,
            FalseKw => SyntaxKind::FALSE_KW,
            CastKw => SyntaxKind::CAST_KW,
            UntypedKw => SyntaxKind::UNTYPED_KW,
            PublicKw => SyntaxKind::PUBLIC_KW,
            PrivateKw => SyntaxKind::PRIVATE_KW,
            StaticKw => SyntaxKind::STATIC_KW,
            InlineKw => SyntaxKind::INLINE_KW,
            OverrideKw => SyntaxKind::OVERRIDE_KW,
            DynamicKw => SyntaxKind::DYNAMIC_KW,
            ExternKw => SyntaxKind::EXTERN_KW,
            MacroKw => SyntaxKind::MACRO_KW,
        }
    }
}

/// Tokens inside a single-quoted string
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum StringToken {
    #[token("'")]
    End,

    #[token("${")]
    InterpStart,

    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*")]
    InterpIdent,

    #[regex(r"([^'\\$\r\n]|\\[^\r\n]|\$\$)+")]
    Fragment,

    #[token("$")]
    Dollar,
}

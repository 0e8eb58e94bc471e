//! Metadata lexing: the `@:name.path` head and the parenthesised arguments

use logos::Logos;

use super::{Frame, LexMode, Token, Tokenizer};
use crate::parser::errors::ErrorCode;
use crate::parser::syntax_kind::SyntaxKind;

/// Progress through a metadata head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum HeadPhase {
    Sigil,
    AfterSigil,
    AfterColon,
    AfterName,
    AfterDot,
}

impl Tokenizer<'_> {
    /// Metadata head. Returns `None` once the head is complete and the
    /// region closed without consuming input.
    pub(super) fn lex_meta_head(&mut self, phase: HeadPhase) -> Option<Token> {
        let mode = LexMode::Metadata;
        let rest = self.rest();
        let next = rest.as_bytes().first().copied();

        let (token, phase) = match (phase, next) {
            (HeadPhase::Sigil, Some(b'@')) => (self.emit(SyntaxKind::AT, 1, mode, None), HeadPhase::AfterSigil),
            // Standalone metadata text between entries
            (HeadPhase::Sigil, _) => return Some(self.lex_meta_token(mode)),
            (HeadPhase::AfterSigil, Some(b':')) => (self.emit(SyntaxKind::COLON, 1, mode, None), HeadPhase::AfterColon),
            (HeadPhase::AfterName, Some(b'.')) => (self.emit(SyntaxKind::DOT, 1, mode, None), HeadPhase::AfterDot),
            (HeadPhase::AfterName, Some(b'(')) => {
                let token = self.emit(SyntaxKind::L_PAREN, 1, mode, None);
                *self.top_mut() = Frame::MetaArgs { depth: 1 };
                return Some(token);
            }
            (HeadPhase::AfterSigil | HeadPhase::AfterColon | HeadPhase::AfterDot, _) => {
                let len = word_len(rest);
                if len == 0 {
                    self.pop();
                    return None;
                }
                (self.emit(SyntaxKind::IDENT, len, mode, None), HeadPhase::AfterName)
            }
            (HeadPhase::AfterName, _) => {
                self.pop();
                return None;
            }
        };
        *self.top_mut() = Frame::MetaHead { phase };
        Some(token)
    }

    /// Inside the argument parentheses. `depth` counts every open bracket;
    /// the `)` at depth 1 closes the region.
    ///
    /// Host text that cannot occur in an argument also ends the region, so
    /// an unclosed `(` never swallows the declarations after it. Returns
    /// `None` in that case without consuming input.
    pub(super) fn lex_meta_args(&mut self, depth: u16) -> Option<Token> {
        let mode = LexMode::MetadataArgs { depth };
        let rest = self.rest();
        if rest.starts_with('@') {
            return Some(self.emit(SyntaxKind::ERROR_TOKEN, 1, mode, Some(ErrorCode::E0106)));
        }
        if ends_arguments(rest, depth) {
            self.pop();
            return None;
        }
        let token = self.lex_meta_token(mode);
        match token.kind {
            SyntaxKind::L_PAREN | SyntaxKind::L_BRACKET | SyntaxKind::L_BRACE => {
                *self.top_mut() = Frame::MetaArgs { depth: depth + 1 }
            }
            SyntaxKind::R_PAREN if depth <= 1 => self.pop(),
            SyntaxKind::R_PAREN | SyntaxKind::R_BRACKET | SyntaxKind::R_BRACE => {
                *self.top_mut() = Frame::MetaArgs { depth: depth - 1 }
            }
            _ => {}
        }
        Some(token)
    }

    fn lex_meta_token(&mut self, mode: LexMode) -> Token {
        let mut lexer = MetaToken::lexer(self.rest());
        match lexer.next() {
            Some(Ok(lexeme)) => {
                let len = lexer.span().end;
                let error = match lexeme {
                    MetaToken::UnterminatedString => Some(ErrorCode::E0102),
                    MetaToken::UnterminatedBlockComment => Some(ErrorCode::E0103),
                    _ => None,
                };
                self.emit(lexeme.into(), len, mode, error)
            }
            _ => self.unknown(mode),
        }
    }
}

/// Keywords that start a declaration or member in host code
const HOST_BOUNDARY_KEYWORDS: &[&str] = &[
    "abstract", "class", "enum", "extern", "final", "function", "import", "inline", "interface", "override",
    "package", "private", "public", "static", "typedef", "using", "var",
];

/// True when `rest` starts with host text: a `;`, a brace or bracket with
/// no opener inside the arguments, or a declaration keyword
fn ends_arguments(rest: &str, depth: u16) -> bool {
    match rest.as_bytes().first() {
        Some(b';') => true,
        Some(b'}' | b']') => depth <= 1,
        _ => {
            let len = word_len(rest);
            len > 0 && HOST_BOUNDARY_KEYWORDS.contains(&&rest[..len])
        }
    }
}

/// Length of an ASCII word (identifier or keyword) at the start of `text`
fn word_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => bytes
            .iter()
            .position(|b| !(b.is_ascii_alphanumeric() || *b == b'_'))
            .unwrap_or(bytes.len()),
        _ => 0,
    }
}

/// Tokens inside metadata arguments. Strings never interpolate here.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum MetaToken {
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,
    #[regex(r"//[^\r\n]*")]
    LineComment,
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,
    #[regex(r"/\*([^*]|\*+[^*/])*\**")]
    UnterminatedBlockComment,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[regex(r"[0-9]+")]
    #[regex(r"0[xX][0-9a-fA-F]+")]
    Int,
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    Float,
    #[regex(r#""([^"\\\r\n]|\\[^\r\n])*""#)]
    #[regex(r"'([^'\\\r\n]|\\[^\r\n])*'")]
    String,
    #[regex(r#""([^"\\\r\n]|\\[^\r\n])*\\?"#)]
    #[regex(r"'([^'\\\r\n]|\\[^\r\n])*\\?")]
    UnterminatedString,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
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
    #[token("=>")]
    FatArrow,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
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
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
}

impl From<MetaToken> for SyntaxKind {
    fn from(token: MetaToken) -> Self {
        use MetaToken::*;
        match token {
            Whitespace => SyntaxKind::WHITESPACE,
            LineComment => SyntaxKind::LINE_COMMENT,
            BlockComment | UnterminatedBlockComment => SyntaxKind::BLOCK_COMMENT,
            Ident => SyntaxKind::IDENT,
            True => SyntaxKind::TRUE_KW,
            False => SyntaxKind::FALSE_KW,
            Null => SyntaxKind::NULL_KW,
            Int => SyntaxKind::INT_NUMBER,
            Float => SyntaxKind::FLOAT_NUMBER,
            String | UnterminatedString => SyntaxKind::STRING,
            LParen => SyntaxKind::L_PAREN,
            RParen => SyntaxKind::R_PAREN,
            LBracket => SyntaxKind::L_BRACKET,
            RBracket => SyntaxKind::R_BRACKET,
            LBrace => SyntaxKind::L_BRACE,
            RBrace => SyntaxKind::R_BRACE,
            Comma => SyntaxKind::COMMA,
            Dot => SyntaxKind::DOT,
            Colon => SyntaxKind::COLON,
            Question => SyntaxKind::QUESTION,
            Eq => SyntaxKind::EQ,
            FatArrow => SyntaxKind::FAT_ARROW,
            EqEq => SyntaxKind::EQ_EQ,
            BangEq => SyntaxKind::BANG_EQ,
            Lt => SyntaxKind::LT,
            LtEq => SyntaxKind::LT_EQ,
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
            AmpAmp => SyntaxKind::AMP_AMP,
            PipePipe => SyntaxKind::PIPE_PIPE,
        }
    }
}

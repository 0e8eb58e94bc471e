//! Build-config line mode

use logos::Logos;

use super::{Frame, LexMode, Token, Tokenizer};
use crate::parser::errors::ErrorCode;
use crate::parser::syntax_kind::SyntaxKind;

impl Tokenizer<'_> {
    pub(super) fn lex_hxml(&mut self, line_has_content: bool) -> Token {
        let mode = LexMode::Hxml;
        let rest = self.rest();

        let newline = if rest.starts_with("\r\n") {
            2
        } else if rest.starts_with('\n') {
            1
        } else {
            0
        };
        if newline > 0 {
            // Blank lines are plain whitespace
            let kind = if line_has_content {
                SyntaxKind::NEWLINE
            } else {
                SyntaxKind::WHITESPACE
            };
            self.set_line_content(false);
            return self.emit(kind, newline, mode, None);
        }

        if rest.starts_with('#') && !line_has_content {
            let len = rest.find(['\r', '\n']).unwrap_or(rest.len());
            self.set_line_content(true);
            return self.emit(SyntaxKind::HXML_COMMENT, len, mode, None);
        }

        let mut lexer = HxmlToken::lexer(rest);
        let token = match lexer.next() {
            Some(Ok(lexeme)) => {
                let len = lexer.span().end;
                let (kind, error) = match lexeme {
                    HxmlToken::Whitespace => (SyntaxKind::WHITESPACE, None),
                    HxmlToken::Flag => (SyntaxKind::HXML_FLAG, None),
                    HxmlToken::Arg => (SyntaxKind::HXML_ARG, None),
                    HxmlToken::UnterminatedArg => (SyntaxKind::HXML_ARG, Some(ErrorCode::E0102)),
                };
                self.emit(kind, len, mode, error)
            }
            _ => self.unknown(mode),
        };
        if !token.is_trivia() {
            self.set_line_content(true);
        }
        token
    }

    fn set_line_content(&mut self, value: bool) {
        if let Frame::Hxml { line_has_content } = self.top_mut() {
            *line_has_content = value;
        }
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum HxmlToken {
    #[regex(r"[ \t\f]+")]
    Whitespace,

    #[regex(r"-[^ \t\f\r\n]*")]
    Flag,

    #[regex(r#""[^"\r\n]*""#)]
    #[regex(r#"[^ \t\f\r\n"\-][^ \t\f\r\n]*"#)]
    Arg,

    #[regex(r#""[^"\r\n]*"#)]
    UnterminatedArg,
}

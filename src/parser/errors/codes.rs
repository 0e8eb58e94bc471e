//! Diagnostic codes
//!
//! A code reads `E{family}{number}`; the family alone decides the category:
//!
//! | Family | Category |
//! |---|---|
//! | E01 | lexical |
//! | E02 | structural (delimiters, semicolons) |
//! | E03 | declaration |
//! | E04 | expression |
//! | E05 | metadata |
//! | E06 | build configuration |
//! | E09 | generic |

use std::fmt;

use crate::parser::SyntaxKind;

macro_rules! error_codes {
    ($($(#[$doc:meta])* $code:ident => $message:literal,)+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ErrorCode {
            $($(#[$doc])* $code,)+
        }

        impl ErrorCode {
            pub const ALL: &'static [ErrorCode] = &[$(ErrorCode::$code,)+];

            /// The code as written in diagnostics, e.g. `E0201`
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$code => stringify!($code),)+
                }
            }

            /// Message used when the parser has nothing more specific
            pub fn default_message(&self) -> &'static str {
                match self {
                    $(Self::$code => $message,)+
                }
            }
        }
    };
}

error_codes! {
    /// Character no token starts with
    E0101 => "invalid character",
    /// String still open at the end of its line
    E0102 => "unterminated string literal",
    /// Block comment still open at the end of input
    E0103 => "unterminated block comment",
    /// Identifier made of non-ASCII letters
    E0105 => "identifiers must be ASCII",
    /// Metadata sigil inside a metadata region
    E0106 => "metadata cannot be nested",

    E0201 => "missing semicolon",
    E0202 => "unclosed brace",
    E0203 => "unclosed parenthesis",
    E0204 => "unclosed bracket",
    /// Closer with no matching opener
    E0205 => "unexpected closing delimiter",

    /// Declaration or parameter without a name
    E0301 => "missing identifier",
    E0304 => "unexpected token in declaration body",

    E0406 => "expected expression",

    /// Metadata where nothing can carry it, e.g. between statements
    E0501 => "metadata is not allowed here",

    E0601 => "unexpected token on build line",

    E0901 => "unexpected token",
    E0902 => "expected token",
}

impl ErrorCode {
    fn family(&self) -> &'static str {
        &self.as_str()[1..3]
    }

    pub fn category_description(&self) -> &'static str {
        match self.family() {
            "01" => "lexical error",
            "02" => "structural error",
            "03" => "declaration error",
            "04" => "expression error",
            "05" => "metadata error",
            "06" => "build configuration error",
            _ => "syntax error",
        }
    }

    pub fn is_lexical(&self) -> bool {
        self.family() == "01"
    }

    /// Code for a single missing token of `kind`
    pub fn for_missing(kind: SyntaxKind) -> Self {
        match kind {
            SyntaxKind::SEMICOLON => Self::E0201,
            SyntaxKind::R_BRACE => Self::E0202,
            SyntaxKind::R_PAREN => Self::E0203,
            SyntaxKind::R_BRACKET => Self::E0204,
            SyntaxKind::IDENT => Self::E0301,
            _ => Self::E0902,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

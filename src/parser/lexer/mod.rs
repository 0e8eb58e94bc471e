//! Mode-aware tokenizer
//!
//! Each lexical mode has its own logos token enum; the [`Tokenizer`] drives
//! them with an explicit mode stack:
//!
//! ```text
//! Code ──'──▶ StringLiteral ──${──▶ Interpolation ──}──▶ StringLiteral ──'──▶ Code
//!  │
//!  └──@──▶ Metadata (head) ──(──▶ MetadataArgs { depth } ──)──▶ Code
//!
//! Hxml (line mode, standalone)
//! ```
//!
//! The tokenizer is lazy and can start at any char boundary in any mode,
//! which is what the incremental reparse engine relies on.

mod host;
mod hxml;
mod metadata;

use text_size::{TextRange, TextSize};

use super::errors::ErrorCode;
use super::syntax_kind::SyntaxKind;
use crate::base::GrammarKind;

/// A token with its kind, position, lexical mode and error flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: SyntaxKind,
    pub range: TextRange,
    /// Mode active when the token was produced
    pub mode: LexMode,
    /// Lexical error carried by the token, if any
    pub error: Option<ErrorCode>,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.range]
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }
}

/// Lexical modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexMode {
    /// Host language code
    Code,
    /// Inside a single-quoted, interpolating string
    StringLiteral,
    /// Inside `${ ... }`
    Interpolation,
    /// Metadata head: sigil, optional `:`, dotted name
    Metadata,
    /// Inside metadata argument parentheses, `depth` brackets deep
    MetadataArgs { depth: u16 },
    /// Build-config line mode
    Hxml,
}

impl LexMode {
    /// Mode a whole document of the given grammar starts in
    pub fn initial(grammar: GrammarKind) -> LexMode {
        match grammar {
            GrammarKind::Host => LexMode::Code,
            GrammarKind::Metadata => LexMode::Metadata,
            GrammarKind::Hxml => LexMode::Hxml,
        }
    }

    /// Modes that fully describe the lexer state, so lexing may restart there
    pub fn is_resumable(self) -> bool {
        matches!(self, LexMode::Code | LexMode::MetadataArgs { .. } | LexMode::Hxml)
    }

    pub fn is_metadata(self) -> bool {
        matches!(self, LexMode::Metadata | LexMode::MetadataArgs { .. })
    }
}

/// Internal mode stack entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Code,
    Str,
    Interp { depth: u32 },
    MetaHead { phase: metadata::HeadPhase },
    MetaArgs { depth: u16 },
    Hxml { line_has_content: bool },
}

impl Frame {
    fn mode(self) -> LexMode {
        match self {
            Frame::Code => LexMode::Code,
            Frame::Str => LexMode::StringLiteral,
            Frame::Interp { .. } => LexMode::Interpolation,
            Frame::MetaHead { .. } => LexMode::Metadata,
            Frame::MetaArgs { depth } => LexMode::MetadataArgs { depth },
            Frame::Hxml { .. } => LexMode::Hxml,
        }
    }

    fn for_mode(mode: LexMode) -> Frame {
        match mode {
            LexMode::Code => Frame::Code,
            LexMode::StringLiteral => Frame::Str,
            LexMode::Interpolation => Frame::Interp { depth: 0 },
            LexMode::Metadata => Frame::MetaHead {
                phase: metadata::HeadPhase::Sigil,
            },
            LexMode::MetadataArgs { depth } => Frame::MetaArgs { depth },
            LexMode::Hxml => Frame::Hxml {
                line_has_content: false,
            },
        }
    }
}

/// Lazy, restartable tokenizer
pub struct Tokenizer<'a> {
    text: &'a str,
    pos: usize,
    stack: Vec<Frame>,
    /// Frame restored when the stack runs empty
    base: Frame,
}

/// Tokenize `text` starting in `start_mode`
pub fn tokenize(text: &str, start_mode: LexMode) -> Tokenizer<'_> {
    Tokenizer::new(text, start_mode)
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str, start_mode: LexMode) -> Self {
        Self::at(text, TextSize::new(0), start_mode)
    }

    /// Resume at `offset` (a char boundary) in `mode`; offsets stay absolute
    pub fn at(text: &'a str, offset: TextSize, mode: LexMode) -> Self {
        let start = Frame::for_mode(mode);
        let base = match start {
            Frame::MetaHead { .. } | Frame::Hxml { .. } => start,
            _ => Frame::Code,
        };
        Self {
            text,
            pos: usize::from(offset).min(text.len()),
            stack: vec![start],
            base,
        }
    }

    /// Mode at the current position
    pub fn mode(&self) -> LexMode {
        self.top().mode()
    }

    pub fn offset(&self) -> TextSize {
        TextSize::new(self.pos as u32)
    }

    fn top(&self) -> Frame {
        self.stack.last().copied().unwrap_or(self.base)
    }

    fn top_mut(&mut self) -> &mut Frame {
        if self.stack.is_empty() {
            self.stack.push(self.base);
        }
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn push(&mut self, frame: Frame) {
        self.stack.push(frame);
    }

    fn pop(&mut self) {
        self.stack.pop();
        if self.stack.is_empty() {
            self.stack.push(self.base);
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// Build a token of `len` bytes at the current position and advance
    fn emit(&mut self, kind: SyntaxKind, len: usize, mode: LexMode, error: Option<ErrorCode>) -> Token {
        debug_assert!(len > 0, "tokens are never empty");
        let start = TextSize::new(self.pos as u32);
        self.pos += len;
        Token {
            kind,
            range: TextRange::at(start, TextSize::new(len as u32)),
            mode,
            error,
        }
    }

    /// Fallback for input no rule accepts: a non-ASCII identifier run or one
    /// character, so the tokenizer always advances
    fn unknown(&mut self, mode: LexMode) -> Token {
        let rest = self.rest();
        let mut chars = rest.char_indices();
        let first = chars.next().map(|(_, c)| c).unwrap_or('\0');
        if !first.is_ascii() && unicode_ident::is_xid_start(first) {
            let len = chars
                .find(|(_, c)| !(unicode_ident::is_xid_continue(*c)))
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            return self.emit(SyntaxKind::IDENT, len, mode, Some(ErrorCode::E0105));
        }
        let len = first.len_utf8().max(1);
        self.emit(SyntaxKind::ERROR_TOKEN, len, mode, Some(ErrorCode::E0101))
    }

    /// True when the next char ends the current line or the input
    fn at_line_end(&self) -> bool {
        matches!(self.rest().as_bytes().first(), None | Some(b'\n') | Some(b'\r'))
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if self.pos >= self.text.len() {
                return None;
            }
            let token = match self.top() {
                Frame::Code | Frame::Interp { .. } => self.lex_code(),
                Frame::Str => self.lex_string(),
                Frame::MetaHead { phase } => self.lex_meta_head(phase),
                Frame::MetaArgs { depth } => self.lex_meta_args(depth),
                Frame::Hxml { line_has_content } => Some(self.lex_hxml(line_has_content)),
            };
            // `None` means the mode ended without consuming input
            if let Some(token) = token {
                return Some(token);
            }
        }
    }
}

//! Lossless parser for the host language, its metadata and build files
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Tokenizer (logos, mode stack) → Tokens with SyntaxKind and LexMode
//!     ↓
//! Engine (interprets a compiled Grammar) → GreenNode tree + errors
//!     ↓
//! Tree builder → arena tree with stable ids and trivia
//! ```
//!
//! Grammars are data: each is a set of rule descriptors compiled once
//! into FIRST sets and nullability. The engine never knows which grammar
//! it is running; metadata regions inside host text are handed to the
//! metadata grammar by the same engine.

mod engine;
pub mod errors;
pub mod grammar;
pub mod lexer;
#[allow(clippy::module_inception)]
mod parser;
pub mod rule_parser;
mod syntax_kind;
mod token_set;

pub(crate) use engine::Engine;
pub use errors::{ErrorCode, RelatedInfo, Severity, SyntaxError};
pub use grammar::{Grammar, MAX_LOOKAHEAD, SelfContained};
pub use lexer::{LexMode, Token, Tokenizer, tokenize};
pub use parser::{Parse, parse, parse_host, parse_hxml, parse_metadata, parse_with};
pub use syntax_kind::{CstElement, CstNode, CstToken, HaxeLanguage, SyntaxKind};
pub use token_set::TokenSet;

/// Re-export rowan types for convenience
pub use rowan::{GreenNode, TextRange, TextSize};

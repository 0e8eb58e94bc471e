//! Foundation types.
//!
//! - [`TextEdit`] - a single replacement, with validation and coalescing
//! - [`LineCol`], [`LineIndex`], [`Span`] - line/column conversion
//! - [`GrammarKind`] - the three grammars and their embedding relation
//! - [`TextRange`], [`TextSize`] - byte offsets
//!
//! This module has NO dependencies on other crate modules.

mod edit;
mod grammar_kind;
mod position;

pub use edit::{EditError, TextEdit};
pub use grammar_kind::GrammarKind;
pub use position::{LineCol, LineIndex, Span};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};

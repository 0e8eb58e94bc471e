//! # haxe-syntax-base
//!
//! Error-tolerant, incrementally reparsed syntax trees for Haxe sources,
//! their embedded `@:metadata`, and hxml build files.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! document     → Snapshots, cancellable reparse tasks, parallel workspace
//!   ↓
//! incremental  → Reparse of self-contained interiors, full-parse fallback
//!   ↓
//! tree         → Arena syntax tree, trivia, position index, typed views
//!   ↓
//! parser       → Mode-aware lexer, grammar descriptors, predictive engine
//!   ↓
//! base         → Primitives (TextEdit, LineIndex, GrammarKind, TextRange)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → tree → incremental → document)
// ============================================================================

/// Foundation types: edits, line index, grammar relation
pub mod base;

/// Parser configuration
pub mod config;

/// Parser: lexer, grammars, engine, rule entry points
pub mod parser;

/// Syntax tree: arena, trivia, positions, typed views
pub mod tree;

/// Incremental reparse
pub mod incremental;

/// Documents, snapshots and workspaces
pub mod document;

// Re-export foundation types
pub use base::{EditError, GrammarKind, LineCol, LineIndex, Span, TextEdit, TextRange, TextSize};
pub use config::ParseConfig;

// Re-export the main entry points
pub use document::{Document, DocumentError, ReparseTask, Snapshot, Workspace};
pub use incremental::{FallbackReason, ReparseError, ReparseOutcome, Reparsed, reparse};
pub use parser::{Parse, SyntaxError, SyntaxKind, parse, parse_with};
pub use tree::{Diagnostic, NodeId, SyntaxNode, SyntaxToken, SyntaxTree, TokenId};

// Re-export the cancellation token callers hand to reparses
pub use tokio_util::sync::CancellationToken;

//! Documents and published snapshots
//!
//! A [`Document`] holds the latest submitted text and the last published
//! [`Snapshot`]. Readers take a snapshot and keep it as long as they like;
//! edits produce a [`ReparseTask`] that builds the next tree off to the side
//! and publishes it only if no newer edit arrived meanwhile.
//!
//! ```text
//! submit(e1) ──► task v1 ──┐ cancelled by submit(e2)
//! submit(e2) ──► task v2 ──┴─► reparse from published ──► publish (generation + 1)
//! ```

mod workspace;

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use smol_str::SmolStr;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::base::{EditError, GrammarKind, TextEdit};
use crate::config::ParseConfig;
use crate::incremental::{ReparseError, ReparseOutcome, reparse};
use crate::parser::parse_with;
use crate::tree::{Diagnostic, SyntaxTree};

pub use workspace::Workspace;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("no open document named `{0}`")]
    NotOpen(SmolStr),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Reparse(#[from] ReparseError),
}

/// An immutable text and its tree
#[derive(Debug)]
pub struct Snapshot {
    pub text: Arc<str>,
    pub tree: Arc<SyntaxTree>,
    /// Number of publications before this one
    pub generation: u64,
}

impl Snapshot {
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.tree.errors()
    }
}

#[derive(Debug)]
struct PendingState {
    text: Arc<str>,
    version: u64,
    cancel: CancellationToken,
}

/// A single text document with one writer and any number of readers
#[derive(Debug)]
pub struct Document {
    grammar: GrammarKind,
    config: ParseConfig,
    published: RwLock<Arc<Snapshot>>,
    pending: Mutex<PendingState>,
}

impl Document {
    /// Parse `text` from scratch as generation 0
    pub fn new(grammar: GrammarKind, text: impl Into<Arc<str>>, config: ParseConfig) -> Self {
        let text: Arc<str> = text.into();
        let parse = parse_with(&text, grammar, &config, None);
        let tree = SyntaxTree::from_parse(&parse);
        tracing::debug!(grammar = grammar.name(), len = text.len(), "opened document");
        Self {
            grammar,
            config,
            published: RwLock::new(Arc::new(Snapshot {
                text: text.clone(),
                tree: Arc::new(tree),
                generation: 0,
            })),
            pending: Mutex::new(PendingState {
                text,
                version: 0,
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn grammar(&self) -> GrammarKind {
        self.grammar
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// The last published snapshot; never waits for a reparse
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.published.read().clone()
    }

    /// Text including edits not yet published
    pub fn latest_text(&self) -> Arc<str> {
        self.pending.lock().text.clone()
    }

    /// Apply `edit` to the latest text and cancel any reparse in flight
    pub fn submit(&self, edit: &TextEdit) -> Result<ReparseTask, EditError> {
        let mut pending = self.pending.lock();
        let text: Arc<str> = edit.apply(&pending.text)?.into();
        pending.cancel.cancel();
        pending.cancel = CancellationToken::new();
        pending.version += 1;
        pending.text = text.clone();
        Ok(ReparseTask {
            text,
            version: pending.version,
            cancel: pending.cancel.clone(),
        })
    }

    /// Submit `edit` and reparse right away
    pub fn apply_edit(&self, edit: &TextEdit) -> Result<Arc<Snapshot>, DocumentError> {
        let task = self.submit(edit)?;
        Ok(task.run(self)?)
    }

    /// Apply an ordered edit log; each edit's offsets refer to the text
    /// produced by the edits before it
    pub fn apply_edits<'e>(
        &self,
        edits: impl IntoIterator<Item = &'e TextEdit>,
    ) -> Result<Arc<Snapshot>, DocumentError> {
        let mut snapshot = self.snapshot();
        for edit in edits {
            snapshot = self.apply_edit(edit)?;
        }
        Ok(snapshot)
    }

    fn publish(&self, task: &ReparseTask, base: &Arc<Snapshot>, tree: SyntaxTree) -> Result<Arc<Snapshot>, ReparseError> {
        // Lock order: pending, then published
        let pending = self.pending.lock();
        let mut published = self.published.write();
        if pending.version != task.version || task.cancel.is_cancelled() || !Arc::ptr_eq(&*published, base) {
            tracing::warn!(
                version = task.version,
                latest = pending.version,
                "discarding reparse superseded by a newer edit"
            );
            return Err(ReparseError::Cancelled);
        }
        let snapshot = Arc::new(Snapshot {
            text: task.text.clone(),
            tree: Arc::new(tree),
            generation: base.generation + 1,
        });
        *published = snapshot.clone();
        tracing::debug!(generation = snapshot.generation, "published snapshot");
        Ok(snapshot)
    }
}

/// The pending reparse for one submitted edit
#[derive(Debug)]
pub struct ReparseTask {
    text: Arc<str>,
    version: u64,
    cancel: CancellationToken,
}

impl ReparseTask {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Reparse from the published snapshot and publish the result. Every
    /// change since that snapshot is folded into one edit.
    pub fn run(self, document: &Document) -> Result<Arc<Snapshot>, ReparseError> {
        if self.cancel.is_cancelled() {
            return Err(ReparseError::Cancelled);
        }
        let base = document.snapshot();
        let edit = TextEdit::diff(&base.text, &self.text);
        let tree = if edit.is_noop() {
            SyntaxTree::clone(&base.tree)
        } else {
            let reparsed = reparse(&base.tree, &base.text, &edit, &document.config, Some(&self.cancel))?;
            if let ReparseOutcome::Full { reason } = reparsed.outcome {
                tracing::debug!(?reason, version = self.version, "document fully reparsed");
            }
            reparsed.tree
        };
        document.publish(&self, &base, tree)
    }
}

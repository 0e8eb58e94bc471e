//! A set of open documents

use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use smol_str::SmolStr;

use super::{Document, DocumentError, Snapshot};
use crate::base::{GrammarKind, TextEdit};
use crate::config::ParseConfig;
use crate::tree::Diagnostic;

/// Open documents by name, in the order they were opened
#[derive(Debug, Default)]
pub struct Workspace {
    config: ParseConfig,
    documents: IndexMap<SmolStr, Arc<Document>>,
}

impl Workspace {
    pub fn new(config: ParseConfig) -> Self {
        Self {
            config,
            documents: IndexMap::new(),
        }
    }

    /// Open (or replace) one document
    pub fn open(&mut self, name: impl Into<SmolStr>, grammar: GrammarKind, text: &str) -> Arc<Document> {
        let document = Arc::new(Document::new(grammar, text, self.config.clone()));
        self.documents.insert(name.into(), document.clone());
        document
    }

    /// Open many documents, parsing them in parallel. The grammar follows
    /// each name's extension; unknown extensions parse as host code.
    pub fn open_all<N>(&mut self, files: impl IntoIterator<Item = (N, String)>)
    where
        N: Into<SmolStr>,
    {
        let files: Vec<(SmolStr, String)> = files.into_iter().map(|(name, text)| (name.into(), text)).collect();
        let config = &self.config;
        let opened: Vec<(SmolStr, Arc<Document>)> = files
            .into_par_iter()
            .map(|(name, text)| {
                let grammar = GrammarKind::from_path(name.as_str()).unwrap_or_else(|| {
                    tracing::warn!(%name, "unknown extension, parsing as host code");
                    GrammarKind::Host
                });
                let document = Document::new(grammar, text, config.clone());
                (name, Arc::new(document))
            })
            .collect();
        tracing::debug!(count = opened.len(), "opened documents");
        self.documents.extend(opened);
    }

    pub fn get(&self, name: &str) -> Option<Arc<Document>> {
        self.documents.get(name).cloned()
    }

    pub fn close(&mut self, name: &str) -> Option<Arc<Document>> {
        self.documents.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &Arc<Document>)> {
        self.documents.iter()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn apply_edit(&self, name: &str, edit: &TextEdit) -> Result<Arc<Snapshot>, DocumentError> {
        let document = self
            .documents
            .get(name)
            .ok_or_else(|| DocumentError::NotOpen(name.into()))?;
        document.apply_edit(edit)
    }

    /// Diagnostics of every published snapshot, per document
    pub fn diagnostics(&self) -> Vec<(SmolStr, Vec<Diagnostic>)> {
        self.documents
            .iter()
            .map(|(name, document)| (name.clone(), document.snapshot().diagnostics()))
            .collect()
    }
}

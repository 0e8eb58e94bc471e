//! Borrowed node and token handles
//!
//! Thin `(tree, id)` pairs with rowan-like navigation, so typed views can
//! be written the same way over the arena as over a concrete tree.

use text_size::TextRange;

use super::{NodeId, SyntaxTree, TokenId};
use crate::parser::SyntaxKind;

#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

#[derive(Clone, Copy)]
pub struct SyntaxToken<'t> {
    tree: &'t SyntaxTree,
    id: TokenId,
}

impl<'t> SyntaxNode<'t> {
    pub fn new(tree: &'t SyntaxTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn kind(&self) -> SyntaxKind {
        self.tree.kind(self.id)
    }

    pub fn parent(&self) -> Option<SyntaxNode<'t>> {
        self.tree.parent(self.id).map(|id| SyntaxNode::new(self.tree, id))
    }

    pub fn children(&self) -> impl Iterator<Item = SyntaxNode<'t>> + use<'t> {
        let tree = self.tree;
        tree.child_nodes(self.id).map(move |id| SyntaxNode::new(tree, id))
    }

    /// Direct child tokens, trivia excluded
    pub fn child_tokens(&self) -> impl Iterator<Item = SyntaxToken<'t>> + use<'t> {
        let tree = self.tree;
        tree.child_tokens(self.id).map(move |id| SyntaxToken { tree, id })
    }

    pub fn descendants(&self) -> impl Iterator<Item = SyntaxNode<'t>> + use<'t> {
        let tree = self.tree;
        tree.descendants(self.id).map(move |id| SyntaxNode::new(tree, id))
    }

    pub fn first_token(&self) -> Option<SyntaxToken<'t>> {
        self.tree.first_token(self.id).map(|id| SyntaxToken { tree: self.tree, id })
    }

    /// Text with attached trivia
    pub fn text(&self) -> String {
        self.tree.node_text(self.id)
    }

    /// Range without surrounding trivia
    pub fn text_range(&self) -> TextRange {
        self.tree.text_range(self.id)
    }

    pub fn has_token(&self, kind: SyntaxKind) -> bool {
        self.child_tokens().any(|t| t.kind() == kind)
    }

    pub fn find_token(&self, kind: SyntaxKind) -> Option<SyntaxToken<'t>> {
        self.child_tokens().find(|t| t.kind() == kind)
    }
}

impl<'t> SyntaxToken<'t> {
    pub fn id(&self) -> TokenId {
        self.id
    }

    pub fn kind(&self) -> SyntaxKind {
        self.tree[self.id].kind
    }

    pub fn text(&self) -> &'t str {
        &self.tree[self.id].text
    }

    pub fn text_range(&self) -> TextRange {
        self.tree.token_text_range(self.id)
    }

    pub fn parent(&self) -> SyntaxNode<'t> {
        SyntaxNode::new(self.tree, self.tree.token_parent(self.id))
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNode<'_> {}

impl PartialEq for SyntaxToken<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxToken<'_> {}

impl std::fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.tree.span_of(self.id))
    }
}

impl std::fmt::Debug for SyntaxToken<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} {:?}", self.kind(), self.text())
    }
}

impl std::fmt::Display for SyntaxToken<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

//! Position index
//!
//! Offsets are stored relative to the parent node, one prefix table per
//! node. Absolute positions are recovered by walking parent links, and
//! lookups descend from the root with a binary search per level, so every
//! query costs O(depth · log width) regardless of document size.

use text_size::{TextRange, TextSize};

use super::{Element, NodeId, SyntaxTree, TokenId};

impl SyntaxTree {
    /// Absolute start of `node`, trivia included
    pub fn node_start(&self, node: NodeId) -> TextSize {
        let mut start = TextSize::new(0);
        let mut current = node;
        while let Some(parent) = self[current].parent {
            start += self[parent].child_offsets[self[current].index_in_parent as usize];
            current = parent;
        }
        start
    }

    /// `(start, len)` of `node`, attached trivia included
    pub fn span_of(&self, node: NodeId) -> (TextSize, TextSize) {
        (self.node_start(node), self[node].len)
    }

    /// Absolute start of `token`'s leading trivia
    pub fn token_start(&self, token: TokenId) -> TextSize {
        let data = &self[token];
        self.node_start(data.parent) + self[data.parent].child_offsets[data.index_in_parent as usize]
    }

    /// Range of `token` with its trivia
    pub fn token_span(&self, token: TokenId) -> TextRange {
        TextRange::at(self.token_start(token), self[token].full_len())
    }

    /// Range of `token`'s own text
    pub fn token_text_range(&self, token: TokenId) -> TextRange {
        let data = &self[token];
        TextRange::at(self.token_start(token) + data.leading_len(), data.text_len())
    }

    /// Range of `node` without the leading trivia of its first token and the
    /// trailing trivia of its last
    pub fn text_range(&self, node: NodeId) -> TextRange {
        match (self.first_token(node), self.last_token(node)) {
            (Some(first), Some(last)) => {
                let start = self.token_text_range(first).start();
                let end = self.token_text_range(last).end();
                TextRange::new(start, end.max(start))
            }
            _ => TextRange::empty(self.node_start(node)),
        }
    }

    /// Innermost node whose span contains `offset`. The end of the document
    /// and anything past it map to the root.
    pub fn node_at(&self, offset: TextSize) -> NodeId {
        let mut node = self.root;
        let mut base = TextSize::new(0);
        loop {
            let data = &self[node];
            if offset < base || offset - base >= data.len {
                return node;
            }
            let (index, child_start) = child_containing(&data.child_offsets, offset - base);
            match data.children[index] {
                Element::Node(child) => {
                    node = child;
                    base += child_start;
                }
                Element::Token(_) => return node,
            }
        }
    }

    /// Token whose span (trivia included) contains `offset`; the end of the
    /// document maps to the final EOF token
    pub fn token_at(&self, offset: TextSize) -> Option<TokenId> {
        let mut node = self.root;
        let mut base = TextSize::new(0);
        if offset >= self.len() {
            return self.last_token(self.root);
        }
        loop {
            let data = &self[node];
            let (index, child_start) = child_containing(&data.child_offsets, offset - base);
            match data.children[index] {
                Element::Node(child) => {
                    node = child;
                    base += child_start;
                }
                Element::Token(token) => return Some(token),
            }
        }
    }
}

/// Last child starting at or before `rel`. Zero-width children share their
/// start with the next child, which wins the search.
fn child_containing(offsets: &[TextSize], rel: TextSize) -> (usize, TextSize) {
    let index = offsets.partition_point(|start| *start <= rel).saturating_sub(1);
    (index, offsets.get(index).copied().unwrap_or_default())
}

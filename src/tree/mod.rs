//! Typed syntax tree
//!
//! The concrete rowan tree produced by the engine is reshaped into an
//! arena of nodes and tokens addressed by index:
//!
//! ```text
//! SyntaxTree
//! ├── nodes:  [Slot<NodeData>]   kind, children, relative child offsets, parent
//! └── tokens: [Slot<TokenData>]  kind, text, leading/trailing trivia, mode
//! ```
//!
//! Every id carries the stamp of the build that allocated it. Incremental
//! reparse works on a clone of the arena, frees only the slots it replaces
//! and allocates new ones under a fresh stamp, so an id that survives an
//! edit still names the same node and an id whose slot was reused is
//! detected as stale.

pub mod ast;
pub(crate) mod builder;
mod position;
mod syntax_node;

use std::fmt::Write as _;
use std::ops::{Index, IndexMut};

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use crate::base::GrammarKind;
use crate::parser::{ErrorCode, LexMode, Parse, Severity, SyntaxKind, TokenSet};

pub use syntax_node::{SyntaxNode, SyntaxToken};

/// Stable handle to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    stamp: u32,
}

/// Stable handle to a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId {
    index: u32,
    stamp: u32,
}

impl NodeId {
    pub fn index(self) -> u32 {
        self.index
    }

    /// Build stamp that allocated this node
    pub fn stamp(self) -> u32 {
        self.stamp
    }
}

impl TokenId {
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn stamp(self) -> u32 {
        self.stamp
    }
}

/// Child of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Node(NodeId),
    Token(TokenId),
}

impl Element {
    pub fn as_node(self) -> Option<NodeId> {
        match self {
            Element::Node(id) => Some(id),
            Element::Token(_) => None,
        }
    }

    pub fn as_token(self) -> Option<TokenId> {
        match self {
            Element::Token(id) => Some(id),
            Element::Node(_) => None,
        }
    }
}

/// Whitespace or comment attached to a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trivia {
    pub kind: SyntaxKind,
    pub text: SmolStr,
    /// Lexical mode the trivia was scanned in
    pub mode: LexMode,
    pub error: Option<ErrorCode>,
}

impl Trivia {
    pub fn len(&self) -> TextSize {
        TextSize::of(self.text.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Diagnostic carried by an ERROR node; its range follows the node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeError {
    pub code: ErrorCode,
    pub message: String,
    pub expected: TokenSet,
}

#[derive(Debug, Clone)]
pub struct NodeData {
    /// Kind exposed to consumers
    pub kind: SyntaxKind,
    /// Kind the grammar produced, before refinement
    pub raw_kind: SyntaxKind,
    pub(crate) children: Vec<Element>,
    /// Start of each child relative to this node's start
    pub(crate) child_offsets: Vec<TextSize>,
    pub parent: Option<NodeId>,
    pub index_in_parent: u32,
    /// Full length, trivia included
    pub len: TextSize,
    pub error: Option<NodeError>,
}

impl NodeData {
    pub(crate) fn new(kind: SyntaxKind) -> Self {
        Self {
            kind,
            raw_kind: kind,
            children: Vec::new(),
            child_offsets: Vec::new(),
            parent: None,
            index_in_parent: 0,
            len: TextSize::new(0),
            error: None,
        }
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub struct TokenData {
    pub kind: SyntaxKind,
    pub text: SmolStr,
    pub leading: Vec<Trivia>,
    pub trailing: Vec<Trivia>,
    pub mode: LexMode,
    pub error: Option<ErrorCode>,
    pub parent: NodeId,
    pub index_in_parent: u32,
}

impl TokenData {
    pub fn leading_len(&self) -> TextSize {
        self.leading.iter().map(Trivia::len).sum()
    }

    pub fn trailing_len(&self) -> TextSize {
        self.trailing.iter().map(Trivia::len).sum()
    }

    pub fn text_len(&self) -> TextSize {
        TextSize::of(self.text.as_str())
    }

    /// Length including attached trivia
    pub fn full_len(&self) -> TextSize {
        self.leading_len() + self.text_len() + self.trailing_len()
    }

    pub fn leading_text(&self) -> String {
        self.leading.iter().map(|t| t.text.as_str()).collect()
    }

    pub fn trailing_text(&self) -> String {
        self.trailing.iter().map(|t| t.text.as_str()).collect()
    }
}

/// Flat diagnostic for editor markers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub range: TextRange,
    pub message: String,
    pub code: ErrorCode,
    pub expected: TokenSet,
    pub severity: Severity,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    stamp: u32,
    value: Option<T>,
}

/// Arena syntax tree
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    grammar: GrammarKind,
    nodes: Vec<Slot<NodeData>>,
    tokens: Vec<Slot<TokenData>>,
    free_nodes: Vec<u32>,
    free_tokens: Vec<u32>,
    root: NodeId,
    /// Stamp given to slots allocated from now on
    stamp: u32,
    cancelled: bool,
}

impl SyntaxTree {
    /// Shape a finished parse into a tree
    pub fn from_parse(parse: &Parse) -> SyntaxTree {
        Self::from_parse_stamped(parse, 0)
    }

    /// Shape a parse with every id stamped `stamp`, so none of them can be
    /// mistaken for an id of an older tree
    pub(crate) fn from_parse_stamped(parse: &Parse, stamp: u32) -> SyntaxTree {
        let mut tree = builder::build(&parse.green, &parse.tokens, parse.errors.clone(), parse.grammar, stamp);
        tree.cancelled = parse.cancelled;
        tree
    }

    pub(crate) fn empty(grammar: GrammarKind, stamp: u32) -> SyntaxTree {
        SyntaxTree {
            grammar,
            nodes: Vec::new(),
            tokens: Vec::new(),
            free_nodes: Vec::new(),
            free_tokens: Vec::new(),
            root: NodeId { index: 0, stamp },
            stamp,
            cancelled: false,
        }
    }

    pub fn grammar(&self) -> GrammarKind {
        self.grammar
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Typed handle to the root
    pub fn root_node(&self) -> SyntaxNode<'_> {
        SyntaxNode::new(self, self.root)
    }

    /// Stamp of the most recent build step
    pub fn stamp(&self) -> u32 {
        self.stamp
    }

    /// The parse behind this tree was cancelled before it finished
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn len(&self) -> TextSize {
        self[self.root].len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == TextSize::new(0)
    }

    // =========================================================================
    // Arena management
    // =========================================================================

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub(crate) fn bump_stamp(&mut self) {
        self.stamp += 1;
    }

    pub(crate) fn alloc_node(&mut self, data: NodeData) -> NodeId {
        let stamp = self.stamp;
        let index = match self.free_nodes.pop() {
            Some(index) => {
                self.nodes[index as usize] = Slot {
                    stamp,
                    value: Some(data),
                };
                index
            }
            None => {
                self.nodes.push(Slot {
                    stamp,
                    value: Some(data),
                });
                (self.nodes.len() - 1) as u32
            }
        };
        NodeId { index, stamp }
    }

    pub(crate) fn alloc_token(&mut self, data: TokenData) -> TokenId {
        let stamp = self.stamp;
        let index = match self.free_tokens.pop() {
            Some(index) => {
                self.tokens[index as usize] = Slot {
                    stamp,
                    value: Some(data),
                };
                index
            }
            None => {
                self.tokens.push(Slot {
                    stamp,
                    value: Some(data),
                });
                (self.tokens.len() - 1) as u32
            }
        };
        TokenId { index, stamp }
    }

    /// Release an element and everything under it
    pub(crate) fn free(&mut self, element: Element) {
        match element {
            Element::Token(id) => {
                if self.contains_token(id) {
                    self.tokens[id.index as usize].value = None;
                    self.free_tokens.push(id.index);
                }
            }
            Element::Node(id) => {
                let Some(data) = self.nodes.get_mut(id.index as usize).and_then(|slot| {
                    if slot.stamp == id.stamp { slot.value.take() } else { None }
                }) else {
                    return;
                };
                self.free_nodes.push(id.index);
                for child in data.children {
                    self.free(child);
                }
            }
        }
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.get_node(id).is_some()
    }

    pub fn contains_token(&self, id: TokenId) -> bool {
        self.get_token(id).is_some()
    }

    pub fn get_node(&self, id: NodeId) -> Option<&NodeData> {
        let slot = self.nodes.get(id.index as usize)?;
        if slot.stamp != id.stamp {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_token(&self, id: TokenId) -> Option<&TokenData> {
        let slot = self.tokens.get(id.index as usize)?;
        if slot.stamp != id.stamp {
            return None;
        }
        slot.value.as_ref()
    }

    /// Append `element` to `parent`, fixing its back-reference
    pub(crate) fn push_child(&mut self, parent: NodeId, element: Element) {
        let index = self[parent].children.len() as u32;
        self[parent].children.push(element);
        self.set_parent(element, parent, index);
    }

    pub(crate) fn set_parent(&mut self, element: Element, parent: NodeId, index: u32) {
        match element {
            Element::Node(id) => {
                self[id].parent = Some(parent);
                self[id].index_in_parent = index;
            }
            Element::Token(id) => {
                self[id].parent = parent;
                self[id].index_in_parent = index;
            }
        }
    }

    pub fn element_len(&self, element: Element) -> TextSize {
        match element {
            Element::Node(id) => self[id].len,
            Element::Token(id) => self[id].full_len(),
        }
    }

    /// Recompute child offsets and length from the children
    pub(crate) fn recompute(&mut self, node: NodeId) {
        let mut offset = TextSize::new(0);
        let mut offsets = Vec::with_capacity(self[node].children.len());
        for &child in &self[node].children {
            offsets.push(offset);
            offset += self.element_len(child);
        }
        let data = &mut self[node];
        data.child_offsets = offsets;
        data.len = offset;
    }

    /// Recompute `node` and then every ancestor
    pub(crate) fn recompute_upwards(&mut self, node: NodeId) {
        let mut current = Some(node);
        while let Some(id) = current {
            self.recompute(id);
            current = self[id].parent;
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn kind(&self, node: NodeId) -> SyntaxKind {
        self[node].kind
    }

    pub fn children(&self, node: NodeId) -> &[Element] {
        &self[node].children
    }

    pub fn child_nodes(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self[node].children.iter().filter_map(|e| e.as_node())
    }

    pub fn child_tokens(&self, node: NodeId) -> impl Iterator<Item = TokenId> + '_ {
        self[node].children.iter().filter_map(|e| e.as_token())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self[node].parent
    }

    pub fn token_parent(&self, token: TokenId) -> NodeId {
        self[token].parent
    }

    /// `node` and its ancestors, innermost first
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(node), move |id| self[*id].parent)
    }

    /// Every node of the tree in preorder
    pub fn preorder(&self) -> Preorder<'_> {
        self.descendants(self.root)
    }

    /// `node` and its descendants in preorder
    pub fn descendants(&self, node: NodeId) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![node],
        }
    }

    /// Tokens under `node`, in source order
    pub fn tokens(&self, node: NodeId) -> Vec<TokenId> {
        let mut out = Vec::new();
        self.collect_tokens(node, &mut out);
        out
    }

    fn collect_tokens(&self, node: NodeId, out: &mut Vec<TokenId>) {
        for &child in &self[node].children {
            match child {
                Element::Token(id) => out.push(id),
                Element::Node(id) => self.collect_tokens(id, out),
            }
        }
    }

    pub fn first_token(&self, node: NodeId) -> Option<TokenId> {
        self[node].children.iter().find_map(|&child| match child {
            Element::Token(id) => Some(id),
            Element::Node(id) => self.first_token(id),
        })
    }

    pub fn last_token(&self, node: NodeId) -> Option<TokenId> {
        self[node].children.iter().rev().find_map(|&child| match child {
            Element::Token(id) => Some(id),
            Element::Node(id) => self.last_token(id),
        })
    }

    /// Whether `node` lies inside a metadata region
    pub fn in_embedding(&self, node: NodeId) -> bool {
        self.ancestors(node).any(|id| self[id].kind == SyntaxKind::EMBEDDING)
    }

    // =========================================================================
    // Text
    // =========================================================================

    /// Reconstruct the source text
    pub fn render_text(&self) -> String {
        self.node_text(self.root)
    }

    /// Text of `node`, trivia included
    pub fn node_text(&self, node: NodeId) -> String {
        let mut out = String::with_capacity(u32::from(self[node].len) as usize);
        self.write_text(node, &mut out);
        out
    }

    fn write_text(&self, node: NodeId, out: &mut String) {
        for &child in &self[node].children {
            match child {
                Element::Node(id) => self.write_text(id, out),
                Element::Token(id) => {
                    let token = &self[id];
                    for trivia in &token.leading {
                        out.push_str(&trivia.text);
                    }
                    out.push_str(&token.text);
                    for trivia in &token.trailing {
                        out.push_str(&trivia.text);
                    }
                }
            }
        }
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// ERROR nodes and error-flagged tokens, in document order
    pub fn errors(&self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        self.collect_errors(self.root, TextSize::new(0), &mut out);
        out
    }

    fn collect_errors(&self, node: NodeId, start: TextSize, out: &mut Vec<Diagnostic>) {
        let data = &self[node];
        if let Some(error) = &data.error {
            out.push(Diagnostic {
                range: self.text_range(node),
                message: error.message.clone(),
                code: error.code,
                expected: error.expected,
                severity: Severity::Error,
            });
        }
        for (&child, &offset) in data.children.iter().zip(&data.child_offsets) {
            let child_start = start + offset;
            match child {
                Element::Node(id) => self.collect_errors(id, child_start, out),
                Element::Token(id) => {
                    let token = &self[id];
                    let mut at = child_start;
                    let mut lexical = |kind: SyntaxKind, len: TextSize, error: Option<ErrorCode>, at: TextSize| {
                        if let Some(code) = error {
                            out.push(Diagnostic {
                                range: TextRange::at(at, len),
                                message: format!("{} ({})", code.default_message(), kind.describe()),
                                code,
                                expected: TokenSet::EMPTY,
                                severity: Severity::Error,
                            });
                        }
                    };
                    for trivia in &token.leading {
                        lexical(trivia.kind, trivia.len(), trivia.error, at);
                        at += trivia.len();
                    }
                    lexical(token.kind, token.text_len(), token.error, at);
                    at += token.text_len();
                    for trivia in &token.trailing {
                        lexical(trivia.kind, trivia.len(), trivia.error, at);
                        at += trivia.len();
                    }
                }
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    // =========================================================================
    // Comparison and debugging
    // =========================================================================

    /// Same kinds, spans, leaf text and diagnostics, ignoring identity and
    /// how trivia text is split into pieces
    pub fn structurally_equal(&self, other: &SyntaxTree) -> bool {
        self.grammar == other.grammar && self.nodes_equal(self.root, other, other.root)
    }

    fn nodes_equal(&self, a: NodeId, other: &SyntaxTree, b: NodeId) -> bool {
        let (left, right) = (&self[a], &other[b]);
        if left.kind != right.kind
            || left.len != right.len
            || left.children.len() != right.children.len()
            || left.error.as_ref().map(|e| (e.code, e.expected)) != right.error.as_ref().map(|e| (e.code, e.expected))
        {
            return false;
        }
        left.children.iter().zip(&right.children).all(|pair| match pair {
            (Element::Node(x), Element::Node(y)) => self.nodes_equal(*x, other, *y),
            (Element::Token(x), Element::Token(y)) => {
                let (x, y) = (&self[*x], &other[*y]);
                x.kind == y.kind
                    && x.text == y.text
                    && x.error == y.error
                    && x.leading_text() == y.leading_text()
                    && x.trailing_text() == y.trailing_text()
            }
            _ => false,
        })
    }

    /// Indented dump of kinds and ranges, for test failure messages
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(self.root, 0, &mut out);
        out
    }

    fn dump_node(&self, node: NodeId, depth: usize, out: &mut String) {
        let (start, len) = self.span_of(node);
        let _ = writeln!(out, "{:indent$}{:?}@{}..{}", "", self[node].kind, u32::from(start), u32::from(start + len), indent = depth * 2);
        for &child in &self[node].children {
            match child {
                Element::Node(id) => self.dump_node(id, depth + 1, out),
                Element::Token(id) => {
                    let token = &self[id];
                    let _ = writeln!(out, "{:indent$}{:?} {:?}", "", token.kind, token.text, indent = (depth + 1) * 2);
                }
            }
        }
    }
}

impl Index<NodeId> for SyntaxTree {
    type Output = NodeData;

    /// # Panics
    ///
    /// When `id` is stale: its slot was freed or reused by a later build.
    fn index(&self, id: NodeId) -> &NodeData {
        match self.get_node(id) {
            Some(data) => data,
            None => panic!("stale node id {id:?}"),
        }
    }
}

impl IndexMut<NodeId> for SyntaxTree {
    fn index_mut(&mut self, id: NodeId) -> &mut NodeData {
        match self.nodes.get_mut(id.index as usize) {
            Some(Slot {
                stamp,
                value: Some(data),
            }) if *stamp == id.stamp => data,
            _ => panic!("stale node id {id:?}"),
        }
    }
}

impl Index<TokenId> for SyntaxTree {
    type Output = TokenData;

    fn index(&self, id: TokenId) -> &TokenData {
        match self.get_token(id) {
            Some(data) => data,
            None => panic!("stale token id {id:?}"),
        }
    }
}

impl IndexMut<TokenId> for SyntaxTree {
    fn index_mut(&mut self, id: TokenId) -> &mut TokenData {
        match self.tokens.get_mut(id.index as usize) {
            Some(Slot {
                stamp,
                value: Some(data),
            }) if *stamp == id.stamp => data,
            _ => panic!("stale token id {id:?}"),
        }
    }
}

/// Preorder walk over node ids
pub struct Preorder<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.tree[node].children.iter().rev().filter_map(|e| e.as_node()));
        Some(node)
    }
}

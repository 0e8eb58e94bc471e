//! Tree builder
//!
//! Walks the engine's green tree next to the lexer's token list and fills
//! the arena. Trivia tokens are folded onto significant tokens:
//!
//! ```text
//! foo; // note\n    bar
//!    ^^^^^^^^^^^^  trailing of `;` (up to and including the first newline)
//!                ^^^^ leading of `bar`
//! ```
//!
//! `NEWLINE` tokens take no trailing trivia, and a block comment spanning
//! lines closes the trailing run. Grammar node kinds are refined into the
//! vocabulary consumers see once a node's children are known.

use rowan::{GreenNode, GreenNodeData, GreenTokenData, NodeOrToken};
use smol_str::SmolStr;

use super::{Element, NodeData, NodeError, NodeId, SyntaxTree, TokenData, TokenId, Trivia};
use crate::base::GrammarKind;
use crate::parser::{ErrorCode, LexMode, SyntaxError, SyntaxKind, Token};

/// Build a whole tree from a root parse
pub(crate) fn build(
    green: &GreenNode,
    tokens: &[Token],
    errors: Vec<SyntaxError>,
    grammar: GrammarKind,
    stamp: u32,
) -> SyntaxTree {
    let mut tree = SyntaxTree::empty(grammar, stamp);
    let mut builder = TreeBuilder::new(&mut tree, tokens, errors, LexMode::initial(grammar));
    let root = builder.node(green);
    let leftover = std::mem::take(&mut builder.pending);
    builder.finish();
    debug_assert!(leftover.is_empty(), "trivia after EOF");
    tree.set_root(root);
    tree
}

/// Children built for the interior of a self-contained node
pub(crate) struct Interior {
    pub children: Vec<Element>,
    /// Trivia left at the end of the region; leading trivia of the closer
    pub pending: Vec<Trivia>,
}

/// Build the children of `green` (the interior wrapper produced by the
/// engine) into `tree`. Trailing trivia continues on `opener`; `leading`
/// seeds the first interior token.
pub(crate) fn build_interior(
    tree: &mut SyntaxTree,
    green: &GreenNode,
    tokens: &[Token],
    errors: Vec<SyntaxError>,
    opener: Option<TokenId>,
    leading: Vec<Trivia>,
) -> Interior {
    let start_mode = tokens.first().map(|t| t.mode).unwrap_or(LexMode::Code);
    let holder = tree.alloc_node(NodeData::new(SyntaxKind::from(green.kind())));
    let mut builder = TreeBuilder::new(tree, tokens, errors, start_mode);
    builder.trailing = opener;
    builder.pending = leading;
    builder.stack.push(holder);
    for child in green.children() {
        builder.element(child);
    }
    builder.stack.pop();
    let pending = std::mem::take(&mut builder.pending);
    builder.finish();

    let children = std::mem::take(&mut tree[holder].children);
    tree.free(Element::Node(holder));
    Interior { children, pending }
}

struct TreeBuilder<'a> {
    tree: &'a mut SyntaxTree,
    tokens: std::slice::Iter<'a, Token>,
    errors: std::vec::IntoIter<SyntaxError>,
    stack: Vec<NodeId>,
    /// Trivia waiting for the next significant token
    pending: Vec<Trivia>,
    /// Token whose trailing run is still open
    trailing: Option<TokenId>,
    /// Every node built, in preorder
    built: Vec<NodeId>,
    last_mode: LexMode,
}

impl<'a> TreeBuilder<'a> {
    fn new(tree: &'a mut SyntaxTree, tokens: &'a [Token], errors: Vec<SyntaxError>, mode: LexMode) -> Self {
        Self {
            tree,
            tokens: tokens.iter(),
            errors: errors.into_iter(),
            stack: Vec::new(),
            pending: Vec::new(),
            trailing: None,
            built: Vec::new(),
            last_mode: mode,
        }
    }

    fn element(&mut self, element: NodeOrToken<&GreenNodeData, &GreenTokenData>) {
        match element {
            NodeOrToken::Node(node) => {
                self.node(node);
            }
            NodeOrToken::Token(token) => self.token(token),
        }
    }

    fn node(&mut self, green: &GreenNodeData) -> NodeId {
        let kind = SyntaxKind::from(green.kind());
        let mut data = NodeData::new(kind);
        if kind == SyntaxKind::ERROR {
            data.error = Some(self.next_error());
        }
        let id = self.tree.alloc_node(data);
        if let Some(&parent) = self.stack.last() {
            self.tree.push_child(parent, Element::Node(id));
        }
        self.built.push(id);

        self.stack.push(id);
        for child in green.children() {
            self.element(child);
        }
        self.stack.pop();

        let refined = refine(self.tree, id);
        self.tree[id].kind = refined;
        id
    }

    fn token(&mut self, green: &GreenTokenData) {
        let kind = SyntaxKind::from(green.kind());
        let text = green.text();
        // The engine's end marker has no lexer counterpart
        let (mode, error) = if kind == SyntaxKind::EOF && text.is_empty() {
            (self.last_mode, None)
        } else {
            match self.tokens.next() {
                Some(token) => {
                    debug_assert_eq!(token.kind, kind, "green tree and token stream diverged");
                    (token.mode, token.error)
                }
                None => (self.last_mode, None),
            }
        };
        self.last_mode = mode;

        if kind.is_trivia() {
            self.trivia(Trivia {
                kind,
                text: SmolStr::new(text),
                mode,
                error,
            });
            return;
        }

        let Some(&parent) = self.stack.last() else {
            return;
        };
        let id = self.tree.alloc_token(TokenData {
            kind,
            text: SmolStr::new(text),
            leading: std::mem::take(&mut self.pending),
            trailing: Vec::new(),
            mode,
            error,
            parent,
            index_in_parent: 0,
        });
        self.tree.push_child(parent, Element::Token(id));
        self.trailing = match kind {
            SyntaxKind::NEWLINE | SyntaxKind::EOF => None,
            _ => Some(id),
        };
    }

    fn trivia(&mut self, trivia: Trivia) {
        let Some(owner) = self.trailing else {
            self.pending.push(trivia);
            return;
        };
        match trivia.kind {
            SyntaxKind::WHITESPACE => match trivia.text.find('\n') {
                Some(newline) => {
                    let head = SmolStr::new(&trivia.text[..=newline]);
                    let tail = SmolStr::new(&trivia.text[newline + 1..]);
                    if !tail.is_empty() {
                        self.pending.push(Trivia {
                            text: tail,
                            ..trivia.clone()
                        });
                    }
                    self.tree[owner].trailing.push(Trivia { text: head, ..trivia });
                    self.trailing = None;
                }
                None => self.tree[owner].trailing.push(trivia),
            },
            SyntaxKind::BLOCK_COMMENT if trivia.text.contains('\n') => {
                self.trailing = None;
                self.pending.push(trivia);
            }
            _ => self.tree[owner].trailing.push(trivia),
        }
    }

    fn next_error(&mut self) -> NodeError {
        match self.errors.next() {
            Some(error) => NodeError {
                code: error.code,
                message: error.message,
                expected: error.expected,
            },
            None => NodeError {
                code: ErrorCode::E0901,
                message: ErrorCode::E0901.default_message().to_string(),
                expected: Default::default(),
            },
        }
    }

    /// Lengths bottom-up; trailing trivia lands after a node has closed, so
    /// this runs once everything is attached
    fn finish(self) {
        for &id in self.built.iter().rev() {
            self.tree.recompute(id);
        }
    }
}

/// Consumer-facing kind for a node whose children are built
fn refine(tree: &SyntaxTree, node: NodeId) -> SyntaxKind {
    let data = &tree[node];
    let mut tokens = data.children.iter().filter_map(|e| e.as_token()).map(|id| tree[id].kind);
    match data.raw_kind {
        SyntaxKind::TYPE_DECL => tokens
            .find_map(|kind| match kind {
                SyntaxKind::CLASS_KW => Some(SyntaxKind::CLASS_DECL),
                SyntaxKind::INTERFACE_KW => Some(SyntaxKind::INTERFACE_DECL),
                SyntaxKind::ENUM_KW => Some(SyntaxKind::ENUM_DECL),
                SyntaxKind::TYPEDEF_KW => Some(SyntaxKind::TYPEDEF_DECL),
                SyntaxKind::ABSTRACT_KW => Some(SyntaxKind::ABSTRACT_DECL),
                _ => None,
            })
            .unwrap_or(SyntaxKind::TYPE_DECL),
        SyntaxKind::MEMBER => {
            if tokens.any(|kind| kind == SyntaxKind::FUNCTION_KW) {
                SyntaxKind::METHOD_DECL
            } else {
                SyntaxKind::FIELD_DECL
            }
        }
        SyntaxKind::HXML_LINE if tokens.next() == Some(SyntaxKind::HXML_FLAG) => SyntaxKind::HXML_OPTION,
        kind => kind,
    }
}

//! Incremental reparse
//!
//! An edit is confined to the interior of the smallest self-contained node
//! that can absorb it:
//!
//! ```text
//! class Foo {  public var x:Int;  }
//!           ^^^^^^^^^^^^^^^^^^^^^^      interior of CLASS_BODY
//!          {                      }     opener and closer, kept by identity
//! ```
//!
//! The interior is re-lexed from the mode recorded at its start, parsed
//! with the node's body rule under a barrier, and spliced into a clone of
//! the old arena. Anything that could make the result differ from a full
//! parse rejects the candidate and the next ancestor is tried; when none
//! qualifies the document is parsed from scratch.

use text_size::TextRange;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::base::{EditError, GrammarKind, TextEdit};
use crate::config::ParseConfig;
use crate::parser::grammar::{self, MAX_LOOKAHEAD};
use crate::parser::{Engine, LexMode, SelfContained, SyntaxKind, Token, Tokenizer, parse_with};
use crate::tree::builder::build_interior;
use crate::tree::{Element, NodeId, SyntaxTree, TokenId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReparseError {
    #[error("reparse was cancelled")]
    Cancelled,
    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Why a whole-document parse was used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Incremental reparse is turned off in the configuration
    Disabled,
    /// No self-contained ancestor holds the edit
    NoCandidate,
    /// Every candidate tried was rejected
    Rejected(Rejection),
    /// The configured number of candidates was exhausted
    CandidateLimit,
}

/// Why a single candidate could not absorb the edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The opener or closer of the node is missing
    MissingDelimiter,
    /// The edit reaches outside the interior
    EditOutside,
    /// The interior starts in a mode the lexer cannot restart from
    NotResumable,
    /// No token ends exactly where the interior ends
    NoBoundary,
    /// The lexer state before the closer changed
    ModeMismatch,
    /// The closer would lex differently
    CloserChanged,
    /// Brackets in the interior do not balance
    Unbalanced,
    /// Tokens a decision outside the interior looked at changed
    LookaheadChanged,
    /// Nothing significant is left in an interior without opener
    EmptyInterior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReparseOutcome {
    /// The interior of `node` was reparsed; everything outside kept its ids
    Incremental { node: NodeId },
    Full { reason: FallbackReason },
}

impl ReparseOutcome {
    pub fn is_incremental(&self) -> bool {
        matches!(self, ReparseOutcome::Incremental { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Reparsed {
    pub tree: SyntaxTree,
    pub text: String,
    pub outcome: ReparseOutcome,
}

/// Apply `edit` to `old_text` and produce the tree for the new text
pub fn reparse(
    old: &SyntaxTree,
    old_text: &str,
    edit: &TextEdit,
    config: &ParseConfig,
    cancel: Option<&CancellationToken>,
) -> Result<Reparsed, ReparseError> {
    let new_text = edit.apply(old_text)?;
    check_cancelled(cancel)?;

    let reason = if config.incremental {
        match incremental(old, &new_text, edit, config, cancel)? {
            Ok((tree, node)) => {
                tracing::debug!(kind = ?tree.kind(node), "incremental reparse");
                return Ok(Reparsed {
                    tree,
                    text: new_text,
                    outcome: ReparseOutcome::Incremental { node },
                });
            }
            Err(reason) => reason,
        }
    } else {
        FallbackReason::Disabled
    };

    tracing::debug!(?reason, "falling back to full reparse");
    let tree = full(old, &new_text, config, cancel)?;
    Ok(Reparsed {
        tree,
        text: new_text,
        outcome: ReparseOutcome::Full { reason },
    })
}

fn check_cancelled(cancel: Option<&CancellationToken>) -> Result<(), ReparseError> {
    match cancel {
        Some(token) if token.is_cancelled() => Err(ReparseError::Cancelled),
        _ => Ok(()),
    }
}

fn full(
    old: &SyntaxTree,
    new_text: &str,
    config: &ParseConfig,
    cancel: Option<&CancellationToken>,
) -> Result<SyntaxTree, ReparseError> {
    let parse = parse_with(new_text, old.grammar(), config, cancel);
    if parse.cancelled {
        return Err(ReparseError::Cancelled);
    }
    Ok(SyntaxTree::from_parse_stamped(&parse, old.stamp() + 1))
}

fn incremental(
    old: &SyntaxTree,
    new_text: &str,
    edit: &TextEdit,
    config: &ParseConfig,
    cancel: Option<&CancellationToken>,
) -> Result<Result<(SyntaxTree, NodeId), FallbackReason>, ReparseError> {
    let mut last_rejection = None;
    let mut tried = 0;
    for node in old.ancestors(old.node_at(edit.offset)) {
        let grammar = grammar::grammar(grammar_for(old, node));
        let Some(sc) = grammar.self_contained(old[node].raw_kind) else {
            continue;
        };
        if tried == config.max_reparse_candidates {
            return Ok(Err(FallbackReason::CandidateLimit));
        }
        tried += 1;
        check_cancelled(cancel)?;

        let candidate = Candidate {
            old,
            node,
            sc,
            grammar: grammar.kind(),
        };
        match candidate.try_reparse(new_text, edit, config, cancel)? {
            Ok(tree) => return Ok(Ok((tree, node))),
            Err(rejection) => {
                tracing::debug!(kind = ?old.kind(node), ?rejection, "candidate rejected");
                last_rejection = Some(rejection);
            }
        }
    }
    Ok(Err(match last_rejection {
        Some(rejection) => FallbackReason::Rejected(rejection),
        None => FallbackReason::NoCandidate,
    }))
}

/// Grammar whose rules produced `node`
fn grammar_for(tree: &SyntaxTree, node: NodeId) -> GrammarKind {
    if tree.in_embedding(node) {
        GrammarKind::Metadata
    } else {
        tree.grammar()
    }
}

struct Candidate<'a> {
    old: &'a SyntaxTree,
    node: NodeId,
    sc: SelfContained,
    grammar: GrammarKind,
}

/// Where the interior sits in the old tree
struct Region {
    opener: Option<TokenId>,
    closer: TokenId,
    /// Children strictly between opener and closer
    interior: Vec<Element>,
    range: TextRange,
    mode: LexMode,
}

impl Candidate<'_> {
    fn try_reparse(
        &self,
        new_text: &str,
        edit: &TextEdit,
        config: &ParseConfig,
        cancel: Option<&CancellationToken>,
    ) -> Result<Result<SyntaxTree, Rejection>, ReparseError> {
        let region = match self.region() {
            Ok(region) => region,
            Err(rejection) => return Ok(Err(rejection)),
        };
        let removed = edit.removed_range();
        let starts_inside = match region.opener {
            Some(_) => removed.start() >= region.range.start(),
            // Text glued to the front of the first token would change it
            None => removed.start() > region.range.start(),
        };
        if !starts_inside || removed.end() > region.range.end() {
            return Ok(Err(Rejection::EditOutside));
        }
        if !region.mode.is_resumable() {
            return Ok(Err(Rejection::NotResumable));
        }

        // Text inserted right before the closer belongs to the interior
        let new_range = TextRange::new(region.range.start(), edit.shift_end(region.range.end()));
        let tokens = match self.relex(new_text, &region, new_range) {
            Ok(tokens) => tokens,
            Err(rejection) => return Ok(Err(rejection)),
        };
        tracing::debug!(
            kind = ?self.old.kind(self.node),
            start = u32::from(new_range.start()),
            end = u32::from(new_range.end()),
            tokens = tokens.len(),
            "reparsing interior"
        );

        let output = Engine::new(
            grammar::grammar(self.grammar),
            new_text,
            &tokens,
            cancel,
            config.cancel_check_interval,
        )
        .parse_interior(
            self.old[self.node].raw_kind,
            self.sc,
            new_range.start(),
            region.opener.map(|id| self.old[id].kind),
        );
        if output.cancelled {
            return Err(ReparseError::Cancelled);
        }

        let mut tree = self.old.clone();
        tree.bump_stamp();
        self.splice(&mut tree, &region, &output.green, &tokens, output.errors);
        Ok(Ok(tree))
    }

    fn region(&self) -> Result<Region, Rejection> {
        let old = self.old;
        let children = old.children(self.node);
        let closer = match children.last() {
            Some(Element::Token(id)) if old[*id].kind == self.sc.close => *id,
            _ => return Err(Rejection::MissingDelimiter),
        };
        let (opener, first) = match self.sc.open {
            Some(open) => match children.first() {
                Some(Element::Token(id)) if old[*id].kind == open && children.len() >= 2 => (Some(*id), 1),
                _ => return Err(Rejection::MissingDelimiter),
            },
            None => (None, 0),
        };
        let interior = children[first..children.len() - 1].to_vec();

        let end = old.token_text_range(closer).start();
        let (start, mode) = match opener {
            Some(opener) => {
                let start = old.token_text_range(opener).end();
                let data = &old[opener];
                let mode = match data.trailing.first() {
                    Some(trivia) => trivia.mode,
                    None => first_mode_after(old, &interior, closer),
                };
                (start, mode)
            }
            None => {
                let first = interior
                    .iter()
                    .find_map(|&e| first_token_of(old, e))
                    .ok_or(Rejection::EmptyInterior)?;
                (old.token_text_range(first).start(), old[first].mode)
            }
        };
        Ok(Region {
            opener,
            closer,
            interior,
            range: TextRange::new(start, end.max(start)),
            mode,
        })
    }

    /// Tokens of the edited interior, checked against everything the
    /// surrounding parse depends on
    fn relex(&self, new_text: &str, region: &Region, range: TextRange) -> Result<Vec<Token>, Rejection> {
        let mut lexer = Tokenizer::at(new_text, range.start(), region.mode);
        let mut tokens = Vec::new();
        let mut end = range.start();
        while end < range.end() {
            let Some(token) = lexer.next() else {
                break;
            };
            end = token.range.end();
            tokens.push(token);
        }
        if end != range.end() {
            return Err(Rejection::NoBoundary);
        }
        let closer = &self.old[region.closer];
        if lexer.mode() != closer.mode {
            return Err(Rejection::ModeMismatch);
        }
        match lexer.next() {
            Some(next) if next.kind == closer.kind && next.range.len() == closer.text_len() => {}
            _ => return Err(Rejection::CloserChanged),
        }
        if !balanced(&tokens, self.sc.close) {
            return Err(Rejection::Unbalanced);
        }
        if region.opener.is_none() && !tokens.iter().any(|t| !t.is_trivia()) {
            return Err(Rejection::EmptyInterior);
        }
        if !self.same_lookahead(new_text, region, &tokens) {
            return Err(Rejection::LookaheadChanged);
        }
        Ok(tokens)
    }

    /// Guards at or before the opener peek into the interior; those tokens
    /// must not change
    fn same_lookahead(&self, new_text: &str, region: &Region, tokens: &[Token]) -> bool {
        let old = self.old;
        let old_tokens: Vec<TokenId> = region
            .interior
            .iter()
            .flat_map(|&e| match e {
                Element::Token(id) => vec![id],
                Element::Node(id) => old.tokens(id),
            })
            .take(MAX_LOOKAHEAD - 1)
            .collect();
        let new_tokens: Vec<&Token> = tokens
            .iter()
            .filter(|t| !t.is_trivia())
            .take(MAX_LOOKAHEAD - 1)
            .collect();
        old_tokens.len() == new_tokens.len()
            && old_tokens.iter().zip(&new_tokens).all(|(&old_id, new)| {
                let before = &old[old_id];
                before.kind == new.kind && (new.kind != SyntaxKind::IDENT || before.text == new.text(new_text))
            })
    }

    fn splice(
        &self,
        tree: &mut SyntaxTree,
        region: &Region,
        green: &rowan::GreenNode,
        tokens: &[Token],
        errors: Vec<crate::parser::SyntaxError>,
    ) {
        let leading = match region.opener {
            Some(opener) => {
                tree[opener].trailing.clear();
                Vec::new()
            }
            None => region
                .interior
                .iter()
                .find_map(|&e| first_token_of(tree, e))
                .map(|first| tree[first].leading.clone())
                .unwrap_or_default(),
        };
        for &element in &region.interior {
            tree.free(element);
        }

        let interior = build_interior(tree, green, tokens, errors, region.opener, leading);
        tree[region.closer].leading = interior.pending;

        let mut children = Vec::with_capacity(interior.children.len() + 2);
        children.extend(region.opener.map(Element::Token));
        children.extend(interior.children);
        children.push(Element::Token(region.closer));
        for (index, &child) in children.iter().enumerate() {
            tree.set_parent(child, self.node, index as u32);
        }
        tree[self.node].children = children;
        tree.recompute_upwards(self.node);
    }
}

fn first_token_of(tree: &SyntaxTree, element: Element) -> Option<TokenId> {
    match element {
        Element::Token(id) => Some(id),
        Element::Node(id) => tree.first_token(id),
    }
}

/// Mode of the first piece of text after an opener with no trailing trivia
fn first_mode_after(tree: &SyntaxTree, interior: &[Element], closer: TokenId) -> LexMode {
    let next = interior
        .iter()
        .find_map(|&e| first_token_of(tree, e))
        .unwrap_or(closer);
    let data = &tree[next];
    data.leading.first().map(|t| t.mode).unwrap_or(data.mode)
}

/// Brackets nest properly and `close` never appears unmatched
fn balanced(tokens: &[Token], close: SyntaxKind) -> bool {
    let mut open: Vec<SyntaxKind> = Vec::new();
    for token in tokens.iter().filter(|t| !t.is_trivia()) {
        if let Some(closing) = token.kind.closing_bracket() {
            open.push(closing);
        } else if token.kind.is_closing_bracket() {
            if open.pop() != Some(token.kind) {
                return false;
            }
        } else if token.kind == close && open.is_empty() {
            return false;
        }
    }
    open.is_empty()
}

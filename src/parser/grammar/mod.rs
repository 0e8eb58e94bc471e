//! Grammar descriptors
//!
//! Each grammar is a set of named rules built from tagged-variant
//! descriptors ([`Rule`]) and compiled once into a flat expression arena
//! ([`Grammar`]) that the grammar-agnostic engine interprets:
//!
//! - `host` - the general-purpose language
//! - `metadata` - `@:name(args)` annotations, embedded in host text
//! - `hxml` - line-oriented build configuration
//!
//! Alternatives are tried in declaration order and the first one whose
//! FIRST set (and guard, if any) accepts the lookahead wins.

pub mod host;
pub mod hxml;
pub mod metadata;

use std::sync::LazyLock;

use rustc_hash::FxHashMap;

use super::errors::ErrorCode;
use super::syntax_kind::SyntaxKind;
use super::token_set::TokenSet;
use crate::base::GrammarKind;

/// Longest lookahead a guard may inspect
pub const MAX_LOOKAHEAD: usize = 3;

static HOST: LazyLock<Grammar> = LazyLock::new(host::grammar);
static METADATA: LazyLock<Grammar> = LazyLock::new(metadata::grammar);
static HXML: LazyLock<Grammar> = LazyLock::new(hxml::grammar);

/// The compiled grammar for `kind`
pub fn grammar(kind: GrammarKind) -> &'static Grammar {
    match kind {
        GrammarKind::Host => &HOST,
        GrammarKind::Metadata => &METADATA,
        GrammarKind::Hxml => &HXML,
    }
}

// =============================================================================
// Descriptors
// =============================================================================

/// Handle to a named rule inside a [`GrammarBuilder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleRef(u32);

/// Associativity of a binary precedence level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

/// One precedence level of a [`binary`] rule
#[derive(Debug, Clone)]
pub struct Level {
    ops: Vec<Vec<SyntaxKind>>,
    assoc: Assoc,
    /// `cond ? a : b` form, with the separator token
    ternary: Option<SyntaxKind>,
}

impl Level {
    /// Operators are sequences of glued tokens, so `>>=` is `[GT, GT, EQ]`
    pub fn new(assoc: Assoc, ops: &[&[SyntaxKind]]) -> Self {
        Self {
            ops: ops.iter().map(|op| op.to_vec()).collect(),
            assoc,
            ternary: None,
        }
    }

    pub fn ternary(question: SyntaxKind, colon: SyntaxKind) -> Self {
        Self {
            ops: vec![vec![question]],
            assoc: Assoc::Right,
            ternary: Some(colon),
        }
    }
}

/// A grammar rule descriptor
#[derive(Debug, Clone)]
pub enum Rule {
    Token(SyntaxKind),
    Any(TokenSet),
    /// Tokens with no trivia between them
    Glued(Vec<SyntaxKind>),
    /// An identifier with exact text
    Contextual(&'static str),
    Seq(Vec<Rule>),
    Choice(Vec<Rule>),
    Repeat(Box<Rule>),
    Opt(Box<Rule>),
    Separated {
        item: Box<Rule>,
        sep: SyntaxKind,
        trailing: bool,
    },
    Node(SyntaxKind, Box<Rule>),
    Call(RuleRef),
    /// A recovery barrier between `open` and `close`. Without an opener the
    /// closer may be missing at the end of input.
    Delimited {
        open: Option<SyntaxKind>,
        body: Box<Rule>,
        close: SyntaxKind,
    },
    Guard(Vec<TokenSet>, Box<Rule>),
    /// Required unless the previous token is `relaxed_after`
    Terminator {
        kind: SyntaxKind,
        relaxed_after: SyntaxKind,
    },
    Embed(GrammarKind),
    Postfix {
        base: Box<Rule>,
        suffixes: Vec<(SyntaxKind, Rule)>,
    },
    Binary {
        node: SyntaxKind,
        ternary_node: SyntaxKind,
        operand: Box<Rule>,
        levels: Vec<Level>,
    },
    Sync(TokenSet, Box<Rule>),
    Coded(ErrorCode, Box<Rule>),
    SelfContained(SyntaxKind, Box<Rule>),
}

impl Rule {
    /// Attach a synchronization set used while this rule is active
    pub fn sync(self, set: TokenSet) -> Rule {
        Rule::Sync(set, Box::new(self))
    }

    /// Error code reported when this rule is required but absent
    pub fn code(self, code: ErrorCode) -> Rule {
        Rule::Coded(code, Box::new(self))
    }
}

pub fn token(kind: SyntaxKind) -> Rule {
    Rule::Token(kind)
}

pub fn any(set: TokenSet) -> Rule {
    Rule::Any(set)
}

pub fn glued(kinds: &[SyntaxKind]) -> Rule {
    Rule::Glued(kinds.to_vec())
}

pub fn contextual(text: &'static str) -> Rule {
    Rule::Contextual(text)
}

pub fn seq(items: Vec<Rule>) -> Rule {
    Rule::Seq(items)
}

pub fn choice(alts: Vec<Rule>) -> Rule {
    Rule::Choice(alts)
}

pub fn repeat(rule: Rule) -> Rule {
    Rule::Repeat(Box::new(rule))
}

pub fn opt(rule: Rule) -> Rule {
    Rule::Opt(Box::new(rule))
}

pub fn separated(item: Rule, sep: SyntaxKind, trailing: bool) -> Rule {
    Rule::Separated {
        item: Box::new(item),
        sep,
        trailing,
    }
}

pub fn node(kind: SyntaxKind, rule: Rule) -> Rule {
    Rule::Node(kind, Box::new(rule))
}

pub fn call(rule: RuleRef) -> Rule {
    Rule::Call(rule)
}

pub fn delimited(open: SyntaxKind, body: Rule, close: SyntaxKind) -> Rule {
    Rule::Delimited {
        open: Some(open),
        body: Box::new(body),
        close,
    }
}

/// A delimited region with no opener, closed by `close` or the end of input
pub fn closed_by(body: Rule, close: SyntaxKind) -> Rule {
    Rule::Delimited {
        open: None,
        body: Box::new(body),
        close,
    }
}

/// Enter `rule` only when the next tokens fall in `lookahead`, one set per token
pub fn guard(lookahead: &[TokenSet], rule: Rule) -> Rule {
    Rule::Guard(lookahead.to_vec(), Box::new(rule))
}

pub fn terminator(kind: SyntaxKind, relaxed_after: SyntaxKind) -> Rule {
    Rule::Terminator { kind, relaxed_after }
}

pub fn embed(grammar: GrammarKind) -> Rule {
    Rule::Embed(grammar)
}

pub fn postfix(base: Rule, suffixes: Vec<(SyntaxKind, Rule)>) -> Rule {
    Rule::Postfix {
        base: Box::new(base),
        suffixes,
    }
}

/// Precedence climbing over `levels`, lowest precedence first
pub fn binary(node: SyntaxKind, ternary_node: SyntaxKind, operand: Rule, levels: Vec<Level>) -> Rule {
    Rule::Binary {
        node,
        ternary_node,
        operand: Box::new(operand),
        levels,
    }
}

/// A node that is a valid incremental reparse boundary. `rule` must be a
/// [`delimited`] or [`closed_by`] rule.
pub fn self_contained(kind: SyntaxKind, rule: Rule) -> Rule {
    Rule::SelfContained(kind, Box::new(rule))
}

/// Collects named rules before compilation
#[derive(Default)]
pub struct GrammarBuilder {
    names: Vec<&'static str>,
    defs: Vec<Option<Rule>>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a rule so it can be referenced before it is defined
    pub fn declare(&mut self, name: &'static str) -> RuleRef {
        self.names.push(name);
        self.defs.push(None);
        RuleRef(self.names.len() as u32 - 1)
    }

    pub fn define(&mut self, rule: RuleRef, def: Rule) {
        self.defs[rule.0 as usize] = Some(def);
    }

    /// Declare and define in one step
    pub fn rule(&mut self, name: &'static str, def: Rule) -> RuleRef {
        let id = self.declare(name);
        self.define(id, def);
        id
    }
}

// =============================================================================
// Compiled form
// =============================================================================

pub type ExprId = u32;

#[derive(Debug, Clone)]
pub(crate) struct BinaryOp {
    pub tokens: Box<[SyntaxKind]>,
    pub level: usize,
}

#[derive(Debug, Clone)]
pub(crate) enum Expr {
    Token(SyntaxKind),
    Any(TokenSet),
    Glued(Box<[SyntaxKind]>),
    Contextual(&'static str),
    /// Items with the FIRST set of everything after each item
    Seq(Box<[ExprId]>, Box<[TokenSet]>),
    Choice(Box<[ExprId]>),
    Repeat(ExprId),
    Opt(ExprId),
    Separated {
        item: ExprId,
        sep: SyntaxKind,
        trailing: bool,
    },
    Node(SyntaxKind, ExprId),
    Call(u32),
    Delimited {
        open: Option<SyntaxKind>,
        body: ExprId,
        close: SyntaxKind,
    },
    Guard(Box<[TokenSet]>, ExprId),
    Terminator {
        kind: SyntaxKind,
        relaxed_after: SyntaxKind,
    },
    Embed(GrammarKind),
    Postfix {
        base: ExprId,
        suffixes: Box<[(SyntaxKind, ExprId)]>,
    },
    Binary {
        node: SyntaxKind,
        ternary_node: SyntaxKind,
        operand: ExprId,
        /// Sorted longest first for maximal munch
        ops: Box<[BinaryOp]>,
        levels: Box<[(Assoc, Option<SyntaxKind>)]>,
    },
    Sync(TokenSet, ExprId),
}

/// Where a self-contained node's interior lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfContained {
    pub open: Option<SyntaxKind>,
    pub body: ExprId,
    pub close: SyntaxKind,
}

/// A compiled grammar
#[derive(Debug)]
pub struct Grammar {
    kind: GrammarKind,
    pub(crate) exprs: Vec<Expr>,
    pub(crate) first: Vec<TokenSet>,
    pub(crate) nullable: Vec<bool>,
    /// FIRST is an over-approximation and needs a dynamic check
    pub(crate) refine: Vec<bool>,
    pub(crate) codes: Vec<Option<ErrorCode>>,
    rule_names: Vec<&'static str>,
    pub(crate) rule_roots: Vec<ExprId>,
    root_kind: SyntaxKind,
    root_body: ExprId,
    self_contained: FxHashMap<SyntaxKind, SelfContained>,
    /// Code for tokens skipped inside a delimited body
    pub(crate) body_code: ErrorCode,
}

impl Grammar {
    /// Flatten `builder` and compute FIRST sets and nullability.
    ///
    /// The root is `root_kind` wrapping `root_body`, which is parsed
    /// repeatedly until the end of input.
    ///
    /// # Panics
    ///
    /// On malformed descriptors: an undefined rule, a guard longer than
    /// [`MAX_LOOKAHEAD`], or a self-contained rule that is not delimited.
    pub fn compile(
        kind: GrammarKind,
        builder: GrammarBuilder,
        root_kind: SyntaxKind,
        root_body: RuleRef,
        body_code: ErrorCode,
    ) -> Grammar {
        let mut compiler = Compiler::default();
        let mut rule_roots = Vec::with_capacity(builder.defs.len());
        for (name, def) in builder.names.iter().zip(builder.defs) {
            let def = def.unwrap_or_else(|| panic!("rule `{name}` declared but never defined"));
            rule_roots.push(compiler.lower(def));
        }

        let mut grammar = Grammar {
            kind,
            first: vec![TokenSet::EMPTY; compiler.exprs.len()],
            nullable: vec![false; compiler.exprs.len()],
            refine: vec![false; compiler.exprs.len()],
            codes: compiler.codes,
            exprs: compiler.exprs,
            rule_names: builder.names,
            root_body: rule_roots[root_body.0 as usize],
            rule_roots,
            root_kind,
            self_contained: compiler.self_contained,
            body_code,
        };
        grammar.compute_first_sets();
        grammar.compute_seq_tails();
        grammar
    }

    pub fn kind(&self) -> GrammarKind {
        self.kind
    }

    pub fn root_kind(&self) -> SyntaxKind {
        self.root_kind
    }

    pub(crate) fn root_body(&self) -> ExprId {
        self.root_body
    }

    /// Expression of a named rule
    pub fn rule(&self, name: &str) -> Option<ExprId> {
        let index = self.rule_names.iter().position(|n| *n == name)?;
        Some(self.rule_roots[index])
    }

    pub fn self_contained(&self, kind: SyntaxKind) -> Option<SelfContained> {
        self.self_contained.get(&kind).copied()
    }

    pub fn is_self_contained(&self, kind: SyntaxKind) -> bool {
        self.self_contained.contains_key(&kind)
    }

    pub fn first(&self, expr: ExprId) -> TokenSet {
        self.first[expr as usize]
    }

    pub fn nullable(&self, expr: ExprId) -> bool {
        self.nullable[expr as usize]
    }

    fn compute_first_sets(&mut self) {
        // Fixed point over the whole arena; grammars are small
        let mut changed = true;
        while changed {
            changed = false;
            for id in 0..self.exprs.len() {
                let (first, nullable, refine) = self.step(id);
                changed |= self.first[id].insert_all(first);
                if nullable && !self.nullable[id] {
                    self.nullable[id] = true;
                    changed = true;
                }
                if refine && !self.refine[id] {
                    self.refine[id] = true;
                    changed = true;
                }
            }
        }
    }

    fn step(&self, id: usize) -> (TokenSet, bool, bool) {
        let of = |e: ExprId| {
            (
                self.first[e as usize],
                self.nullable[e as usize],
                self.refine[e as usize],
            )
        };
        match &self.exprs[id] {
            Expr::Token(kind) => (TokenSet::single(*kind), false, false),
            Expr::Any(set) => (*set, false, false),
            Expr::Glued(kinds) => (TokenSet::single(kinds[0]), false, kinds.len() > 1),
            Expr::Contextual(_) => (TokenSet::single(SyntaxKind::IDENT), false, true),
            Expr::Seq(items, _) => {
                let mut first = TokenSet::EMPTY;
                let mut refine = false;
                for item in items.iter() {
                    let (f, n, r) = of(*item);
                    first = first.union(f);
                    refine |= r;
                    if !n {
                        return (first, false, refine);
                    }
                }
                (first, true, refine)
            }
            Expr::Choice(alts) => alts.iter().fold((TokenSet::EMPTY, false, false), |acc, alt| {
                let (f, n, r) = of(*alt);
                (acc.0.union(f), acc.1 || n, acc.2 || r)
            }),
            Expr::Repeat(inner) | Expr::Opt(inner) => {
                let (f, _, r) = of(*inner);
                (f, true, r)
            }
            Expr::Separated { item, .. } => {
                let (f, _, r) = of(*item);
                (f, true, r)
            }
            Expr::Node(_, inner) | Expr::Sync(_, inner) => of(*inner),
            Expr::Call(rule) => of(self.rule_roots[*rule as usize]),
            Expr::Delimited { open: Some(open), .. } => (TokenSet::single(*open), false, false),
            Expr::Delimited { open: None, body, .. } => {
                let (f, _, r) = of(*body);
                (f, false, r)
            }
            Expr::Guard(_, inner) => {
                let (f, n, _) = of(*inner);
                (f, n, true)
            }
            Expr::Terminator { kind, .. } => (TokenSet::single(*kind), true, false),
            Expr::Embed(_) => (TokenSet::single(SyntaxKind::AT), false, true),
            Expr::Postfix { base, .. } => of(*base),
            Expr::Binary { operand, .. } => of(*operand),
        }
    }

    fn compute_seq_tails(&mut self) {
        for id in 0..self.exprs.len() {
            let Expr::Seq(items, _) = &self.exprs[id] else {
                continue;
            };
            let mut tails = vec![TokenSet::EMPTY; items.len()];
            let mut acc = TokenSet::EMPTY;
            for (i, item) in items.iter().enumerate().rev() {
                tails[i] = acc;
                acc = acc.union(self.first[*item as usize]);
            }
            let items = items.clone();
            self.exprs[id] = Expr::Seq(items, tails.into_boxed_slice());
        }
    }
}

#[derive(Default)]
struct Compiler {
    exprs: Vec<Expr>,
    codes: Vec<Option<ErrorCode>>,
    self_contained: FxHashMap<SyntaxKind, SelfContained>,
}

impl Compiler {
    fn push(&mut self, expr: Expr) -> ExprId {
        self.exprs.push(expr);
        self.codes.push(None);
        self.exprs.len() as ExprId - 1
    }

    fn lower(&mut self, rule: Rule) -> ExprId {
        match rule {
            Rule::Token(kind) => self.push(Expr::Token(kind)),
            Rule::Any(set) => self.push(Expr::Any(set)),
            Rule::Glued(kinds) => {
                assert!(!kinds.is_empty(), "glued rule needs at least one token");
                self.push(Expr::Glued(kinds.into_boxed_slice()))
            }
            Rule::Contextual(text) => self.push(Expr::Contextual(text)),
            Rule::Seq(items) => {
                let items: Vec<_> = items.into_iter().map(|r| self.lower(r)).collect();
                self.push(Expr::Seq(items.into_boxed_slice(), Box::new([])))
            }
            Rule::Choice(alts) => {
                let alts: Vec<_> = alts.into_iter().map(|r| self.lower(r)).collect();
                self.push(Expr::Choice(alts.into_boxed_slice()))
            }
            Rule::Repeat(inner) => {
                let inner = self.lower(*inner);
                self.push(Expr::Repeat(inner))
            }
            Rule::Opt(inner) => {
                let inner = self.lower(*inner);
                self.push(Expr::Opt(inner))
            }
            Rule::Separated { item, sep, trailing } => {
                let item = self.lower(*item);
                self.push(Expr::Separated { item, sep, trailing })
            }
            Rule::Node(kind, inner) => {
                let inner = self.lower(*inner);
                self.push(Expr::Node(kind, inner))
            }
            Rule::Call(rule) => self.push(Expr::Call(rule.0)),
            Rule::Delimited { open, body, close } => {
                let body = self.lower(*body);
                self.push(Expr::Delimited { open, body, close })
            }
            Rule::Guard(lookahead, inner) => {
                assert!(
                    !lookahead.is_empty() && lookahead.len() <= MAX_LOOKAHEAD,
                    "guard lookahead must be 1..={MAX_LOOKAHEAD} tokens"
                );
                let inner = self.lower(*inner);
                self.push(Expr::Guard(lookahead.into_boxed_slice(), inner))
            }
            Rule::Terminator { kind, relaxed_after } => self.push(Expr::Terminator { kind, relaxed_after }),
            Rule::Embed(grammar) => self.push(Expr::Embed(grammar)),
            Rule::Postfix { base, suffixes } => {
                let base = self.lower(*base);
                let suffixes: Vec<_> = suffixes.into_iter().map(|(kind, r)| (kind, self.lower(r))).collect();
                self.push(Expr::Postfix {
                    base,
                    suffixes: suffixes.into_boxed_slice(),
                })
            }
            Rule::Binary {
                node,
                ternary_node,
                operand,
                levels,
            } => {
                let operand = self.lower(*operand);
                let mut ops = Vec::new();
                let mut shape = Vec::with_capacity(levels.len());
                for (level, def) in levels.into_iter().enumerate() {
                    shape.push((def.assoc, def.ternary));
                    ops.extend(def.ops.into_iter().map(|tokens| BinaryOp {
                        tokens: tokens.into_boxed_slice(),
                        level,
                    }));
                }
                ops.sort_by(|a, b| b.tokens.len().cmp(&a.tokens.len()));
                self.push(Expr::Binary {
                    node,
                    ternary_node,
                    operand,
                    ops: ops.into_boxed_slice(),
                    levels: shape.into_boxed_slice(),
                })
            }
            Rule::Sync(set, inner) => {
                let inner = self.lower(*inner);
                self.push(Expr::Sync(set, inner))
            }
            Rule::Coded(code, inner) => {
                let inner = self.lower(*inner);
                self.codes[inner as usize] = Some(code);
                inner
            }
            Rule::SelfContained(kind, inner) => {
                let inner = self.lower(*inner);
                let Expr::Delimited { open, body, close } = self.exprs[inner as usize] else {
                    panic!("self-contained {kind:?} must wrap a delimited rule");
                };
                self.self_contained
                    .insert(kind, SelfContained { open, body, close });
                self.push(Expr::Node(kind, inner))
            }
        }
    }
}

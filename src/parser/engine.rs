//! Grammar-agnostic predictive engine
//!
//! Interprets a compiled [`Grammar`] over a token slice and emits a rowan
//! green tree. Decisions look at the next significant token (guards look
//! up to [`MAX_LOOKAHEAD`](super::grammar::MAX_LOOKAHEAD) tokens ahead);
//! trivia never influences a decision and is flushed into the tree before
//! each significant token.
//!
//! Recovery is driven by a stack of synchronization sets and barriers:
//!
//! ```text
//! [Sync(tail of seq), Sync(member set), Barrier(`}`), Sync(..), ...]
//!                                       ^^^^^^^^^^^^ innermost barrier
//! ```
//!
//! Only frames above the innermost barrier are consulted, so recovery
//! inside a delimited region never depends on what encloses it.

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder};
use text_size::{TextRange, TextSize};
use tokio_util::sync::CancellationToken;

use super::errors::{ErrorCode, RelatedInfo, SyntaxError};
use super::grammar::{self, Assoc, Expr, ExprId, Grammar, SelfContained};
use super::lexer::Token;
use super::syntax_kind::SyntaxKind;
use super::token_set::TokenSet;

#[derive(Debug, Clone, Copy)]
enum Recovery {
    Sync(TokenSet),
    /// Hard boundary; the closer (if any) is always a recovery point
    Barrier(Option<SyntaxKind>),
}

/// Result of running the engine
pub(crate) struct EngineOutput {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
    pub cancelled: bool,
}

pub(crate) struct Engine<'a> {
    grammar: &'static Grammar,
    source: &'a str,
    tokens: &'a [Token],
    /// Indices of significant tokens
    significant: Vec<usize>,
    cursor: usize,
    /// Significant tokens at or past this index read as end of input
    limit: usize,
    /// Next raw token not yet in the tree
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
    recovery: Vec<Recovery>,
    last_kind: Option<SyntaxKind>,
    last_end: TextSize,
    /// A token was consumed outside error skipping since the last error
    progress: bool,
    cancel: Option<&'a CancellationToken>,
    check_interval: usize,
    until_check: usize,
    cancelled: bool,
}

impl<'a> Engine<'a> {
    pub(crate) fn new(
        grammar: &'static Grammar,
        source: &'a str,
        tokens: &'a [Token],
        cancel: Option<&'a CancellationToken>,
        check_interval: usize,
    ) -> Self {
        let significant: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_trivia())
            .map(|(i, _)| i)
            .collect();
        let start = tokens.first().map(|t| t.range.start()).unwrap_or_default();
        Self {
            grammar,
            source,
            tokens,
            limit: significant.len(),
            significant,
            cursor: 0,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
            recovery: Vec::new(),
            last_kind: None,
            last_end: start,
            progress: true,
            cancel,
            check_interval: check_interval.max(1),
            until_check: check_interval.max(1),
            cancelled: false,
        }
    }

    /// Parse a whole document: the root node, its body until end of input,
    /// then the zero-width EOF token
    pub(crate) fn parse_root(mut self) -> EngineOutput {
        let grammar = self.grammar;
        self.builder.start_node(grammar.root_kind().into());
        self.parse_region(grammar.root_body(), grammar.body_code);
        self.flush_all();
        self.builder.token(SyntaxKind::EOF.into(), "");
        self.builder.finish_node();
        self.finish()
    }

    /// Parse the interior of a self-contained node. `tokens` cover exactly
    /// the interior, which begins at `start`; `after` is the opener's kind,
    /// if any.
    pub(crate) fn parse_interior(
        mut self,
        kind: SyntaxKind,
        sc: SelfContained,
        start: TextSize,
        after: Option<SyntaxKind>,
    ) -> EngineOutput {
        self.last_kind = after;
        self.last_end = start;
        self.builder.start_node(kind.into());
        self.recovery.push(Recovery::Barrier(Some(sc.close)));
        self.parse_region(sc.body, self.grammar.body_code);
        self.recovery.pop();
        self.flush_all();
        self.builder.finish_node();
        self.finish()
    }

    /// Parse a single rule wrapped in the grammar's root node
    pub(crate) fn parse_entry(mut self, entry: ExprId) -> EngineOutput {
        let grammar = self.grammar;
        self.builder.start_node(grammar.root_kind().into());
        self.parse_region(entry, grammar.body_code);
        self.flush_all();
        self.builder.token(SyntaxKind::EOF.into(), "");
        self.builder.finish_node();
        self.finish()
    }

    fn finish(self) -> EngineOutput {
        EngineOutput {
            green: self.builder.finish(),
            errors: self.errors,
            cancelled: self.cancelled,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current_index(&self) -> Option<usize> {
        if self.cancelled || self.cursor >= self.limit {
            return None;
        }
        self.significant.get(self.cursor).copied()
    }

    fn current(&self) -> Option<Token> {
        self.current_index().map(|i| self.tokens[i])
    }

    fn current_kind(&self) -> SyntaxKind {
        self.current().map(|t| t.kind).unwrap_or(SyntaxKind::EOF)
    }

    fn current_text(&self) -> &'a str {
        self.current().map(|t| t.text(self.source)).unwrap_or("")
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        let index = self.cursor + n;
        if self.cancelled || index >= self.limit {
            return SyntaxKind::EOF;
        }
        self.significant
            .get(index)
            .map(|i| self.tokens[*i].kind)
            .unwrap_or(SyntaxKind::EOF)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current_kind() == kind
    }

    fn at_end(&self) -> bool {
        self.current_index().is_none()
    }

    /// Whether `kinds` appear next with no trivia between them
    fn at_glued(&self, kinds: &[SyntaxKind]) -> bool {
        if self.cursor + kinds.len() > self.limit || self.cancelled {
            return false;
        }
        kinds.iter().enumerate().all(|(i, kind)| {
            let Some(&index) = self.significant.get(self.cursor + i) else {
                return false;
            };
            let adjacent = i == 0 || self.significant[self.cursor + i - 1] + 1 == index;
            adjacent && self.tokens[index].kind == *kind
        })
    }

    fn lookahead_matches(&self, lookahead: &[TokenSet]) -> bool {
        lookahead.iter().enumerate().all(|(n, set)| set.contains(self.nth(n)))
    }

    /// Whether `expr` can begin at the current token
    fn starts(&self, expr: ExprId) -> bool {
        let grammar = self.grammar;
        let kind = self.current_kind();
        if !grammar.first[expr as usize].contains(kind) {
            return false;
        }
        if !grammar.refine[expr as usize] {
            return true;
        }
        match &grammar.exprs[expr as usize] {
            Expr::Glued(kinds) => self.at_glued(kinds),
            Expr::Contextual(text) => self.current_text() == *text,
            Expr::Seq(items, _) => {
                for item in items.iter() {
                    if self.starts(*item) {
                        return true;
                    }
                    if !grammar.nullable(*item) {
                        return false;
                    }
                }
                false
            }
            Expr::Choice(alts) => alts.iter().any(|alt| self.starts(*alt)),
            Expr::Repeat(inner) | Expr::Opt(inner) | Expr::Node(_, inner) | Expr::Sync(_, inner) => {
                self.starts(*inner)
            }
            Expr::Separated { item, .. } => self.starts(*item),
            Expr::Call(rule) => self.starts(grammar.rule_roots[*rule as usize]),
            Expr::Delimited { body, .. } => self.starts(*body),
            Expr::Guard(lookahead, inner) => self.lookahead_matches(lookahead) && self.starts(*inner),
            Expr::Embed(_) => self.current().is_some_and(|t| t.mode.is_metadata()),
            Expr::Postfix { base, .. } => self.starts(*base),
            Expr::Binary { operand, .. } => self.starts(*operand),
            Expr::Token(_) | Expr::Any(_) | Expr::Terminator { .. } => true,
        }
    }

    fn nullable_now(&self, expr: ExprId) -> bool {
        match &self.grammar.exprs[expr as usize] {
            Expr::Terminator { relaxed_after, .. } => self.last_kind == Some(*relaxed_after),
            _ => self.grammar.nullable(expr),
        }
    }

    // =========================================================================
    // Tree building
    // =========================================================================

    fn flush_trivia(&mut self) {
        let until = self.current_index().unwrap_or(self.pos);
        while self.pos < until {
            let token = self.tokens[self.pos];
            self.builder.token(token.kind.into(), token.text(self.source));
            self.pos += 1;
        }
    }

    /// Everything left, trivia and any unconsumed tokens of a cancelled parse
    fn flush_all(&mut self) {
        while self.pos < self.tokens.len() {
            let token = self.tokens[self.pos];
            self.builder.token(token.kind.into(), token.text(self.source));
            self.pos += 1;
        }
    }

    fn start_node(&mut self, kind: SyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.flush_trivia();
        self.builder.checkpoint()
    }

    fn bump(&mut self) {
        let Some(index) = self.current_index() else {
            return;
        };
        self.flush_trivia();
        let token = self.tokens[index];
        self.builder.token(token.kind.into(), token.text(self.source));
        self.pos = index + 1;
        self.cursor += 1;
        self.last_kind = Some(token.kind);
        self.last_end = token.range.end();
        self.progress = true;
        self.tick();
    }

    fn tick(&mut self) {
        self.until_check -= 1;
        if self.until_check > 0 {
            return;
        }
        self.until_check = self.check_interval;
        if self.cancel.is_some_and(CancellationToken::is_cancelled) {
            tracing::trace!(offset = u32::from(self.last_end), "parse cancelled");
            self.cancelled = true;
        }
    }

    // =========================================================================
    // Error recovery
    // =========================================================================

    fn recovery_set(&self) -> TokenSet {
        let mut set = TokenSet::EMPTY;
        for frame in self.recovery.iter().rev() {
            match frame {
                Recovery::Sync(sync) => set = set.union(*sync),
                Recovery::Barrier(close) => {
                    if let Some(close) = close {
                        set = set.with(*close);
                    }
                    break;
                }
            }
        }
        set
    }

    fn barrier_close(&self) -> Option<SyntaxKind> {
        self.recovery.iter().rev().find_map(|frame| match frame {
            Recovery::Barrier(close) => Some(*close),
            Recovery::Sync(_) => None,
        })?
    }

    /// Error code reported when `expr` is required but absent
    fn code_for(&self, expr: ExprId) -> ErrorCode {
        let grammar = self.grammar;
        let mut expr = expr;
        loop {
            if let Some(code) = grammar.codes[expr as usize] {
                return code;
            }
            match &grammar.exprs[expr as usize] {
                Expr::Call(rule) => expr = grammar.rule_roots[*rule as usize],
                Expr::Node(_, inner) | Expr::Sync(_, inner) | Expr::Guard(_, inner) => expr = *inner,
                _ => break,
            }
        }
        let first = grammar.first(expr);
        match first.iter().next() {
            Some(kind) if first.len() == 1 => ErrorCode::for_missing(kind),
            _ => ErrorCode::E0902,
        }
    }

    /// An error directly after the previous one extends it instead of
    /// opening a new ERROR node
    fn merge_error(&mut self, expected: TokenSet) -> bool {
        if self.progress {
            return false;
        }
        match self.errors.last_mut() {
            Some(last) => {
                last.merge_expected(expected);
                true
            }
            None => false,
        }
    }

    /// Record a zero-width error after the last significant token
    fn missing(&mut self, expected: TokenSet, code: ErrorCode) {
        if self.merge_error(expected) {
            return;
        }
        tracing::trace!(offset = u32::from(self.last_end), ?expected, "missing");
        self.builder.start_node(SyntaxKind::ERROR.into());
        self.builder.finish_node();
        self.errors
            .push(SyntaxError::expected(expected, TextRange::empty(self.last_end), code));
        self.progress = false;
    }

    /// Wrap tokens into an ERROR node until one in `expected` or the
    /// recovery set appears. Consumes at least one token; bracket groups
    /// opened while skipping are skipped whole.
    fn skip(&mut self, expected: TokenSet, code: ErrorCode) {
        let Some(first) = self.current() else {
            return;
        };
        let misplaced_metadata = first.kind == SyntaxKind::AT && first.mode.is_metadata();
        let code = if misplaced_metadata {
            ErrorCode::E0501
        } else if first.kind.is_closing_bracket() {
            ErrorCode::E0205
        } else {
            code
        };
        let stop = expected.union(self.recovery_set());
        let barrier_close = self.barrier_close();
        tracing::trace!(offset = u32::from(first.range.start()), kind = ?first.kind, "skipping");

        self.start_node(SyntaxKind::ERROR);
        let mut open: Vec<SyntaxKind> = Vec::new();
        let mut consumed = false;
        while let Some(token) = self.current() {
            // A misplaced metadata region goes as a whole
            if misplaced_metadata {
                if consumed && !token.mode.is_metadata() {
                    break;
                }
                self.bump();
                consumed = true;
                continue;
            }
            if consumed && open.is_empty() && stop.contains(token.kind) {
                break;
            }
            if Some(token.kind) == barrier_close && !open.contains(&token.kind) {
                break;
            }
            if let Some(close) = token.kind.closing_bracket() {
                open.push(close);
            } else if let Some(depth) = open.iter().rposition(|k| *k == token.kind) {
                open.truncate(depth);
            }
            self.bump();
            consumed = true;
        }
        self.finish_node();

        let range = TextRange::new(first.range.start(), self.last_end.max(first.range.start()));
        let mut error = SyntaxError::expected(expected, range, code);
        if misplaced_metadata {
            error = error.with_hint("metadata goes directly before a declaration, member or enum constructor");
        }
        self.errors.push(error);
        self.progress = false;
    }

    /// Report `expected` as absent here: a zero-width error when the current
    /// token is a recovery point, otherwise skip ahead
    fn recover(&mut self, expected: TokenSet, code: ErrorCode) {
        let kind = self.current_kind();
        if self.at_end() || self.recovery_set().contains(kind) || Some(kind) == self.barrier_close() {
            self.missing(expected, code);
        } else {
            self.skip(expected, code);
        }
    }

    fn expect(&mut self, kind: SyntaxKind) {
        if self.at(kind) {
            self.bump();
            return;
        }
        self.recover(TokenSet::single(kind), ErrorCode::for_missing(kind));
        if self.at(kind) {
            self.bump();
        }
    }

    /// Parse `expr`, recovering if it cannot start here
    fn required(&mut self, expr: ExprId) {
        if self.starts(expr) || self.nullable_now(expr) {
            self.parse(expr);
            return;
        }
        self.recover(self.grammar.first(expr), self.code_for(expr));
        if self.starts(expr) {
            self.parse(expr);
        }
    }

    /// `body` repeated until the end of input, skipping what it rejects
    fn parse_region(&mut self, body: ExprId, code: ErrorCode) {
        self.required(body);
        while !self.at_end() {
            self.skip(self.grammar.first(body), code);
            if self.starts(body) {
                self.parse(body);
            }
        }
    }

    // =========================================================================
    // Interpretation
    // =========================================================================

    fn parse(&mut self, expr: ExprId) {
        let grammar = self.grammar;
        match &grammar.exprs[expr as usize] {
            Expr::Token(kind) => self.expect(*kind),
            Expr::Any(_) | Expr::Contextual(_) => {
                if self.starts(expr) {
                    self.bump();
                }
            }
            Expr::Glued(kinds) => {
                if self.at_glued(kinds) {
                    for _ in kinds.iter() {
                        self.bump();
                    }
                }
            }
            Expr::Seq(items, tails) => {
                for (item, tail) in items.iter().zip(tails.iter()) {
                    self.recovery.push(Recovery::Sync(*tail));
                    self.required(*item);
                    self.recovery.pop();
                }
            }
            Expr::Choice(alts) => {
                // Declaration order decides
                if let Some(alt) = alts.iter().find(|alt| self.starts(**alt)) {
                    self.parse(*alt);
                } else if let Some(alt) = alts.iter().find(|alt| grammar.nullable(**alt)) {
                    self.parse(*alt);
                }
            }
            Expr::Repeat(inner) => {
                while self.starts(*inner) {
                    let before = self.cursor;
                    self.parse(*inner);
                    if self.cursor == before {
                        break;
                    }
                }
            }
            Expr::Opt(inner) => {
                if self.starts(*inner) {
                    self.parse(*inner);
                }
            }
            Expr::Separated { item, sep, trailing } => {
                if !self.starts(*item) {
                    return;
                }
                self.recovery.push(Recovery::Sync(TokenSet::single(*sep)));
                self.parse(*item);
                while self.at(*sep) {
                    self.bump();
                    if *trailing && !self.starts(*item) {
                        break;
                    }
                    self.required(*item);
                }
                self.recovery.pop();
            }
            Expr::Node(kind, inner) => {
                self.start_node(*kind);
                self.parse(*inner);
                self.finish_node();
            }
            Expr::Call(rule) => self.parse(grammar.rule_roots[*rule as usize]),
            Expr::Delimited { open, body, close } => self.parse_delimited(*open, *body, *close),
            Expr::Guard(_, inner) => self.parse(*inner),
            Expr::Terminator { kind, .. } => {
                if self.at(*kind) {
                    self.bump();
                }
            }
            Expr::Embed(kind) => self.parse_embedded(*kind),
            Expr::Postfix { base, suffixes } => {
                let checkpoint = self.checkpoint();
                self.parse(*base);
                while let Some((kind, suffix)) = suffixes.iter().find(|(_, s)| self.starts(*s)) {
                    self.builder.start_node_at(checkpoint, (*kind).into());
                    self.parse(*suffix);
                    self.finish_node();
                }
            }
            Expr::Binary { .. } => self.parse_binary(expr, 0),
            Expr::Sync(set, inner) => {
                self.recovery.push(Recovery::Sync(*set));
                self.parse(*inner);
                self.recovery.pop();
            }
        }
    }

    fn parse_delimited(&mut self, open: Option<SyntaxKind>, body: ExprId, close: SyntaxKind) {
        let mut opener = None;
        if let Some(open) = open {
            opener = self.current().filter(|t| t.kind == open).map(|t| t.range);
            self.expect(open);
        }
        self.recovery.push(Recovery::Barrier(Some(close)));
        self.required(body);
        while !self.at_end() && !self.at(close) {
            self.skip(self.grammar.first(body), self.grammar.body_code);
            if self.starts(body) {
                self.parse(body);
            }
        }
        self.recovery.pop();
        if self.at(close) {
            self.bump();
        } else if let Some(open) = open {
            self.missing(TokenSet::single(close), ErrorCode::for_missing(close));
            if let (Some(range), Some(error)) = (opener, self.errors.last_mut()) {
                error.related.push(RelatedInfo::new(format!("{} opened here", open.describe()), range));
            }
        }
    }

    /// Hand the contiguous run of metadata tokens to the metadata grammar.
    /// The nested parse shares this engine's tree builder and error sink.
    fn parse_embedded(&mut self, kind: crate::base::GrammarKind) {
        let outer = self.grammar;
        if !outer.kind().can_embed(kind) {
            self.skip(TokenSet::EMPTY, ErrorCode::E0501);
            return;
        }
        let inner = grammar::grammar(kind);
        let mut limit = self.cursor;
        while limit < self.limit && self.tokens[self.significant[limit]].mode.is_metadata() {
            limit += 1;
        }
        // Trivia inside the region belongs to it too
        let saved_limit = self.limit;
        self.grammar = inner;
        self.limit = limit;

        self.start_node(SyntaxKind::EMBEDDING);
        self.recovery.push(Recovery::Barrier(None));
        self.parse_region(inner.root_body(), inner.body_code);
        self.recovery.pop();
        self.finish_node();

        self.grammar = outer;
        self.limit = saved_limit;
    }

    /// Precedence climbing; operators are matched longest first across
    /// the whole table so `>>=` is never read as `>` `>=`
    fn parse_binary(&mut self, expr: ExprId, min_level: usize) {
        let grammar = self.grammar;
        let Expr::Binary {
            node,
            ternary_node,
            operand,
            ops,
            levels,
        } = &grammar.exprs[expr as usize]
        else {
            return;
        };
        let checkpoint = self.checkpoint();
        self.required(*operand);
        while let Some(op) = ops.iter().find(|op| self.at_glued(&op.tokens)) {
            if op.level < min_level {
                break;
            }
            let (assoc, ternary) = levels[op.level];
            if let Some(colon) = ternary {
                self.builder.start_node_at(checkpoint, (*ternary_node).into());
                self.bump();
                self.recovery.push(Recovery::Sync(TokenSet::single(colon)));
                self.parse_binary(expr, 0);
                self.recovery.pop();
                self.expect(colon);
                self.parse_binary(expr, op.level);
                self.finish_node();
                continue;
            }
            self.builder.start_node_at(checkpoint, (*node).into());
            for _ in op.tokens.iter() {
                self.bump();
            }
            let next = match assoc {
                Assoc::Left => op.level + 1,
                Assoc::Right => op.level,
            };
            self.parse_binary(expr, next);
            self.finish_node();
        }
    }
}

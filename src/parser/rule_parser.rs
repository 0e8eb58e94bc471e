//! Rule-based parser for testing individual grammar rules
//!
//! Parses a single construct without surrounding file context. The rule is
//! run repeatedly until the input ends, so anything it cannot account for
//! shows up as an error.
//!
//! # Example
//!
//! ```
//! use haxe_syntax::parser::rule_parser::{Rule, parse_rule};
//!
//! let result = parse_rule(Rule::Expression, "a + b * c");
//! assert!(result.is_ok());
//! ```

use super::engine::Engine;
use super::errors::SyntaxError;
use super::grammar;
use super::lexer::{LexMode, Token, tokenize};
use super::syntax_kind::{CstNode, SyntaxKind};
use crate::base::GrammarKind;
use crate::config::ParseConfig;

/// Grammar rules that can be parsed individually
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// expr = binary operators over unary and postfix forms
    Expression,
    /// type = type atom, optionally `->` function type
    Type,
    /// member = modifiers (var | final | function) ...
    ClassMember,
    /// statement = local var | expression statement | `;`
    Statement,
    /// type_params = `<` param (`,` param)* `>`
    TypeParams,
    /// entry = `@` `:`? name args?
    MetadataEntry,
    /// line = (FLAG | ARG)+ NEWLINE?
    HxmlLine,
}

impl Rule {
    fn grammar_kind(self) -> GrammarKind {
        match self {
            Rule::MetadataEntry => GrammarKind::Metadata,
            Rule::HxmlLine => GrammarKind::Hxml,
            _ => GrammarKind::Host,
        }
    }

    fn rule_name(self) -> &'static str {
        match self {
            Rule::Expression => "expr",
            Rule::Type => "type",
            Rule::ClassMember => "member",
            Rule::Statement => "statement",
            Rule::TypeParams => "type_params",
            Rule::MetadataEntry => "entry",
            Rule::HxmlLine => "line",
        }
    }
}

/// Result of parsing a single rule
#[derive(Debug)]
pub struct RuleParseResult {
    pub rule: Rule,
    pub input: String,
    green: rowan::GreenNode,
    errors: Vec<SyntaxError>,
    tokens: Vec<Token>,
}

impl RuleParseResult {
    /// No syntax errors and no error-flagged tokens
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty() && !self.tokens.iter().any(Token::is_error)
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// Root node wrapping the parsed rule
    pub fn syntax(&self) -> CstNode {
        CstNode::new_root(self.green.clone())
    }

    /// Kind of the first node under the root
    pub fn node_kind(&self) -> Option<SyntaxKind> {
        self.syntax().first_child().map(|n| n.kind())
    }
}

/// Parse `input` as a single `rule`
pub fn parse_rule(rule: Rule, input: &str) -> RuleParseResult {
    let kind = rule.grammar_kind();
    let grammar = grammar::grammar(kind);
    let tokens: Vec<Token> = tokenize(input, LexMode::initial(kind)).collect();
    let (green, errors) = match grammar.rule(rule.rule_name()) {
        Some(entry) => {
            let output = Engine::new(
                grammar,
                input,
                &tokens,
                None,
                ParseConfig::default().cancel_check_interval,
            )
            .parse_entry(entry);
            (output.green, output.errors)
        }
        None => {
            tracing::warn!(?rule, "rule not present in grammar; parsing whole document");
            let parse = super::parser::parse(input, kind);
            (parse.green, parse.errors)
        }
    };
    RuleParseResult {
        rule,
        input: input.to_string(),
        green,
        errors,
        tokens,
    }
}

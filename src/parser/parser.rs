//! Parse entry points
//!
//! Tokenizes the whole input up front, then runs the engine with the
//! grammar for the document kind. A parse never fails: errors are carried
//! in the result next to a complete, lossless tree.

use rowan::GreenNode;
use tokio_util::sync::CancellationToken;

use super::engine::Engine;
use super::errors::SyntaxError;
use super::grammar;
use super::lexer::{LexMode, Token, tokenize};
use super::syntax_kind::CstNode;
use crate::base::GrammarKind;
use crate::config::ParseConfig;

/// Parse result containing the green tree, errors and the token stream
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
    /// Every token, trivia included, in source order
    pub tokens: Vec<Token>,
    pub grammar: GrammarKind,
    /// The parse was abandoned; the tree is lossless but incomplete
    pub cancelled: bool,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> CstNode {
        CstNode::new_root(self.green.clone())
    }

    /// No syntax errors and no error-flagged tokens
    pub fn ok(&self) -> bool {
        self.errors.is_empty() && !self.tokens.iter().any(Token::is_error)
    }
}

/// Parse `text` with the grammar for `grammar`
pub fn parse(text: &str, grammar: GrammarKind) -> Parse {
    parse_with(text, grammar, &ParseConfig::default(), None)
}

/// Parse with explicit configuration and an optional cancellation token
pub fn parse_with(
    text: &str,
    grammar_kind: GrammarKind,
    config: &ParseConfig,
    cancel: Option<&CancellationToken>,
) -> Parse {
    let tokens: Vec<Token> = tokenize(text, LexMode::initial(grammar_kind)).collect();
    let output = Engine::new(
        grammar::grammar(grammar_kind),
        text,
        &tokens,
        cancel,
        config.cancel_check_interval,
    )
    .parse_root();
    Parse {
        green: output.green,
        errors: output.errors,
        tokens,
        grammar: grammar_kind,
        cancelled: output.cancelled,
    }
}

/// Parse host language source
pub fn parse_host(text: &str) -> Parse {
    parse(text, GrammarKind::Host)
}

/// Parse standalone metadata entries
pub fn parse_metadata(text: &str) -> Parse {
    parse(text, GrammarKind::Metadata)
}

/// Parse a build configuration file
pub fn parse_hxml(text: &str) -> Parse {
    parse(text, GrammarKind::Hxml)
}

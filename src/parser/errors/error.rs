//! Syntax errors as the engine records them. Each carries the set of token
//! kinds that would have been accepted, so messages and editor quick-fixes
//! read from the same data.

use text_size::{TextRange, TextSize};

use super::codes::ErrorCode;
use crate::parser::TokenSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Hint,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Hint => "hint",
        }
    }
}

/// A second location an error points at, such as the opener of an
/// unclosed bracket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub message: String,
    pub range: TextRange,
}

impl RelatedInfo {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// A syntax error attached to an ERROR node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    /// Zero-width for missing tokens
    pub range: TextRange,
    pub code: ErrorCode,
    /// Token kinds accepted at the point of failure
    pub expected: TokenSet,
    pub severity: Severity,
    pub hint: Option<String>,
    pub related: Vec<RelatedInfo>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            range,
            code,
            expected: TokenSet::EMPTY,
            severity: Severity::Error,
            hint: None,
            related: vec![],
        }
    }

    /// Zero-width error at `offset`
    pub fn at_offset(message: impl Into<String>, offset: TextSize, code: ErrorCode) -> Self {
        Self::new(message, TextRange::empty(offset), code)
    }

    /// Error for a position where one of `expected` was required
    pub fn expected(expected: TokenSet, range: TextRange, code: ErrorCode) -> Self {
        let mut error = Self::new(String::new(), range, code);
        error.expected = expected;
        error.message = expected_message(&expected);
        error
    }

    /// Fold another error reported at the same point into this one
    pub fn merge_expected(&mut self, expected: TokenSet) {
        if self.expected.insert_all(expected) {
            self.message = expected_message(&self.expected);
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// `E0201: expected ';'`, followed by the hint and related
    /// locations on their own lines
    pub fn format(&self) -> String {
        let mut lines = vec![format!("{}: {}", self.code, self.message)];
        lines.extend(self.hint.iter().map(|hint| format!("  hint: {hint}")));
        lines.extend(self.related.iter().map(|info| {
            format!(
                "  note: {} at {}..{}",
                info.message,
                u32::from(info.range.start()),
                u32::from(info.range.end())
            )
        }));
        lines.join("\n")
    }
}

fn expected_message(expected: &TokenSet) -> String {
    let mut names: Vec<&'static str> = expected.iter().map(|kind| kind.describe()).collect();
    names.dedup();
    match names.as_slice() {
        [] => "unexpected input".to_string(),
        [one] => format!("expected {}", one),
        [rest @ .., last] => format!("expected {} or {}", rest.join(", "), last),
    }
}

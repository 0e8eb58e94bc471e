//! Parser configuration

/// Tuning knobs for parsing and incremental reparse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConfig {
    /// How many tokens the engine consumes between cancellation checks
    pub cancel_check_interval: usize,
    /// Try an incremental reparse before falling back to a full parse
    pub incremental: bool,
    /// Self-contained ancestors tried before giving up on incremental reparse
    pub max_reparse_candidates: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            cancel_check_interval: 256,
            incremental: true,
            max_reparse_candidates: 8,
        }
    }
}

impl ParseConfig {
    /// Configuration that always reparses whole documents
    pub fn full_only() -> Self {
        Self {
            incremental: false,
            ..Self::default()
        }
    }
}

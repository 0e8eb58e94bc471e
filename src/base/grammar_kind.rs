//! The three grammars and their embedding relation
//!
//! ```text
//! Host  ⊃ Metadata      (annotations before declarations)
//! Hxml                  (standalone build configuration)
//! ```
//!
//! The relation is a plain table: a grammar lists what it may embed, and
//! nothing embedded may embed further.

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarKind {
    /// The general-purpose host language
    Host,
    /// The annotation mini-grammar embedded in host text
    Metadata,
    /// Line-oriented build configuration files
    Hxml,
}

impl GrammarKind {
    pub const ALL: [GrammarKind; 3] = [GrammarKind::Host, GrammarKind::Metadata, GrammarKind::Hxml];

    /// Grammars that may appear inside this one
    pub fn embeds(self) -> &'static [GrammarKind] {
        match self {
            GrammarKind::Host => &[GrammarKind::Metadata],
            GrammarKind::Metadata | GrammarKind::Hxml => &[],
        }
    }

    pub fn can_embed(self, inner: GrammarKind) -> bool {
        self.embeds().contains(&inner)
    }

    /// Grammar for a file, chosen by extension
    pub fn from_path(path: impl AsRef<Path>) -> Option<GrammarKind> {
        match path.as_ref().extension()?.to_str()? {
            "hx" => Some(GrammarKind::Host),
            "hxml" => Some(GrammarKind::Hxml),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GrammarKind::Host => "host",
            GrammarKind::Metadata => "metadata",
            GrammarKind::Hxml => "hxml",
        }
    }
}

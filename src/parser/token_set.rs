//! Bitset of syntax kinds
//!
//! FIRST sets, synchronization sets and expected-token sets are all
//! `TokenSet`s. Every `SyntaxKind` fits into the 256 available bits.

use std::fmt;

use super::syntax_kind::SyntaxKind;

const SLOTS: usize = 4;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TokenSet {
    bits: [u64; SLOTS],
}

impl TokenSet {
    pub const EMPTY: Self = Self { bits: [0; SLOTS] };
    const BITS_PER_SLOT: u16 = u64::BITS as u16;

    pub const fn single(kind: SyntaxKind) -> Self {
        let kind = kind as u16;
        let slot = (kind / Self::BITS_PER_SLOT) as usize;
        let mut bits = [0; SLOTS];
        bits[slot] = 1 << (kind % Self::BITS_PER_SLOT);
        Self { bits }
    }

    pub const fn new<const N: usize>(kinds: [SyntaxKind; N]) -> Self {
        let mut set = Self::EMPTY;
        let mut i = 0;
        while i < kinds.len() {
            set = set.union(Self::single(kinds[i]));
            i += 1;
        }
        set
    }

    pub const fn union(mut self, other: Self) -> Self {
        let mut i = 0;
        while i < SLOTS {
            self.bits[i] |= other.bits[i];
            i += 1;
        }
        self
    }

    pub const fn with(self, kind: SyntaxKind) -> Self {
        self.union(Self::single(kind))
    }

    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        let slot = (kind / Self::BITS_PER_SLOT) as usize;
        self.bits[slot] & (1 << (kind % Self::BITS_PER_SLOT)) != 0
    }

    pub const fn is_empty(&self) -> bool {
        let mut i = 0;
        while i < SLOTS {
            if self.bits[i] != 0 {
                return false;
            }
            i += 1;
        }
        true
    }

    /// Returns true if the union added any new kind
    pub fn insert_all(&mut self, other: TokenSet) -> bool {
        let before = self.bits;
        *self = self.union(other);
        before != self.bits
    }

    pub fn iter(&self) -> impl Iterator<Item = SyntaxKind> + '_ {
        (0..SyntaxKind::__LAST as u16)
            .map(|raw| SyntaxKind::from(rowan::SyntaxKind(raw)))
            .filter(|kind| self.contains(*kind))
    }

    pub fn len(&self) -> usize {
        self.bits.iter().map(|slot| slot.count_ones() as usize).sum()
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<SyntaxKind> for TokenSet {
    fn from_iter<I: IntoIterator<Item = SyntaxKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, |set, kind| set.with(kind))
    }
}

//! Text edits
//!
//! An edit replaces `removed` bytes at `offset` with `inserted`.

use text_size::{TextRange, TextSize};
use thiserror::Error;

/// Errors raised by invalid edits
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("edit range {start:?}..{end:?} is outside the document (length {len:?})")]
    OutOfBounds {
        start: TextSize,
        end: TextSize,
        len: TextSize,
    },

    #[error("edit boundary {0:?} is not on a character boundary")]
    NotCharBoundary(TextSize),
}

/// A single text replacement
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextEdit {
    pub offset: TextSize,
    pub removed: TextSize,
    pub inserted: String,
}

impl TextEdit {
    pub fn new(offset: TextSize, removed: TextSize, inserted: impl Into<String>) -> Self {
        Self {
            offset,
            removed,
            inserted: inserted.into(),
        }
    }

    pub fn insert(offset: TextSize, text: impl Into<String>) -> Self {
        Self::new(offset, TextSize::new(0), text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::new(range.start(), range.len(), String::new())
    }

    pub fn replace(range: TextRange, text: impl Into<String>) -> Self {
        Self::new(range.start(), range.len(), text)
    }

    /// Range of the old text that this edit removes
    pub fn removed_range(&self) -> TextRange {
        TextRange::at(self.offset, self.removed)
    }

    /// Range of the new text that holds the inserted text
    pub fn inserted_range(&self) -> TextRange {
        TextRange::at(self.offset, TextSize::of(self.inserted.as_str()))
    }

    /// Signed change in document length
    pub fn delta(&self) -> i64 {
        i64::from(u32::from(TextSize::of(self.inserted.as_str()))) - i64::from(u32::from(self.removed))
    }

    pub fn is_noop(&self) -> bool {
        self.removed == TextSize::new(0) && self.inserted.is_empty()
    }

    pub fn validate(&self, text: &str) -> Result<(), EditError> {
        let len = TextSize::of(text);
        let end = self.offset.checked_add(self.removed).ok_or(EditError::OutOfBounds {
            start: self.offset,
            end: self.offset,
            len,
        })?;
        if end > len {
            return Err(EditError::OutOfBounds {
                start: self.offset,
                end,
                len,
            });
        }
        for boundary in [self.offset, end] {
            if !text.is_char_boundary(boundary.into()) {
                return Err(EditError::NotCharBoundary(boundary));
            }
        }
        Ok(())
    }

    pub fn apply(&self, text: &str) -> Result<String, EditError> {
        self.validate(text)?;
        let range = self.removed_range();
        let mut result = String::with_capacity(text.len() + self.inserted.len());
        result.push_str(&text[..usize::from(range.start())]);
        result.push_str(&self.inserted);
        result.push_str(&text[usize::from(range.end())..]);
        Ok(result)
    }

    /// Shift an offset of the old text past this edit
    ///
    /// Offsets inside the removed range are not meaningful after the edit and
    /// map to the end of the inserted text.
    pub fn shift(&self, offset: TextSize) -> TextSize {
        let removed = self.removed_range();
        if offset <= removed.start() {
            offset
        } else if offset >= removed.end() {
            offset - self.removed + TextSize::of(self.inserted.as_str())
        } else {
            self.inserted_range().end()
        }
    }

    /// Like [`shift`](Self::shift), but an offset at the end of the removed
    /// range lands after the inserted text. Use it for the end of a range
    /// that must take in text inserted at its end.
    pub fn shift_end(&self, offset: TextSize) -> TextSize {
        if offset >= self.removed_range().end() {
            offset - self.removed + TextSize::of(self.inserted.as_str())
        } else {
            self.shift(offset)
        }
    }

    /// The single edit turning `old` into `new`
    ///
    /// Covers everything between the common prefix and the common suffix, so
    /// a queue of edits collapses into one reparse request.
    pub fn diff(old: &str, new: &str) -> TextEdit {
        let prefix = common_prefix(old, new);
        let suffix = common_suffix(&old[prefix..], &new[prefix..]);
        let removed_end = old.len() - suffix;
        let inserted_end = new.len() - suffix;
        TextEdit::new(
            TextSize::new(prefix as u32),
            TextSize::new((removed_end - prefix) as u32),
            &new[prefix..inserted_end],
        )
    }
}

fn common_prefix(a: &str, b: &str) -> usize {
    let mut len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    while !a.is_char_boundary(len) {
        len -= 1;
    }
    len
}

fn common_suffix(a: &str, b: &str) -> usize {
    let mut len = a
        .bytes()
        .rev()
        .zip(b.bytes().rev())
        .take_while(|(x, y)| x == y)
        .count();
    while !a.is_char_boundary(a.len() - len) || !b.is_char_boundary(b.len() - len) {
        len -= 1;
    }
    len
}

//! Line/column positions
//!
//! The tree works in byte offsets; editors talk in lines and columns.
//! [`LineIndex`] converts between the two.

use text_size::{TextRange, TextSize};

/// A position in source code (0-indexed, column in UTF-8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// A line/column span, suitable for editor markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: LineCol,
    pub end: LineCol,
}

impl Span {
    pub fn new(start: LineCol, end: LineCol) -> Self {
        Self { start, end }
    }

    /// Check if a position falls within this span
    pub fn contains(&self, position: LineCol) -> bool {
        self.start <= position && position <= self.end
    }
}

/// Maps byte offsets to line/column pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Offset of the first byte of every line
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, byte)| *byte == b'\n')
                .map(|(i, _)| TextSize::new(i as u32 + 1)),
        );
        Self {
            line_starts,
            len: TextSize::of(text),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line/column of an offset; offsets past the end clamp to the end
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.len);
        let line = self.line_starts.partition_point(|start| *start <= offset) - 1;
        let col = offset - self.line_starts[line];
        LineCol::new(line as u32, col.into())
    }

    /// Offset of a line/column, if it lies inside the text
    pub fn offset(&self, position: LineCol) -> Option<TextSize> {
        let start = *self.line_starts.get(position.line as usize)?;
        let end = self
            .line_starts
            .get(position.line as usize + 1)
            .copied()
            .unwrap_or(self.len);
        let offset = start + TextSize::new(position.col);
        (offset <= end).then_some(offset)
    }

    pub fn span(&self, range: TextRange) -> Span {
        Span::new(self.line_col(range.start()), self.line_col(range.end()))
    }
}

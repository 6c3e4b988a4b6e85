//! Line index for offset ↔ line/column conversion.

use crate::{ByteOffset, Position};
use text_size::TextSize;

/// An index for efficient conversion between byte offsets and line/column positions.
///
/// The index stores the byte offset of the start of each line, enabling O(log n)
/// line lookups in both directions. Line breaks follow the same rules as
/// [`Position::advance`], so positions computed here agree with the ones the
/// scanner stamps on tokens.
#[derive(Debug, Clone)]
pub struct LineIndex<'src> {
    text: &'src str,
    /// `line_starts[i]` is the offset where line `i` begins.
    line_starts: Vec<ByteOffset>,
}

impl<'src> LineIndex<'src> {
    /// Creates a new line index from source text.
    pub fn new(text: &'src str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        let bytes = text.as_bytes();

        for (offset, &b) in bytes.iter().enumerate() {
            let is_break = match b {
                b'\n' => true,
                b'\r' => bytes.get(offset + 1) != Some(&b'\n'),
                _ => false,
            };
            if is_break {
                line_starts.push(TextSize::from((offset + 1) as u32));
            }
        }

        Self { text, line_starts }
    }

    /// Returns the number of lines in the source.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Converts a byte offset to a line/column position.
    ///
    /// Returns `None` if the offset is past the end of the text or does not
    /// fall on a character boundary.
    pub fn position(&self, offset: ByteOffset) -> Option<Position> {
        let raw = u32::from(offset) as usize;
        if raw > self.text.len() || !self.text.is_char_boundary(raw) {
            return None;
        }

        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };

        let line_start = u32::from(self.line_starts[line]) as usize;
        let column = self.text[line_start..raw].chars().count() as u32;

        Some(Position::new(line as u32, column))
    }

    /// Converts a line/column position to a byte offset.
    ///
    /// Returns `None` if the line is out of bounds. Columns past the end of
    /// the line clamp to the line end.
    pub fn offset(&self, position: Position) -> Option<ByteOffset> {
        let line = position.line as usize;
        let start = u32::from(*self.line_starts.get(line)?) as usize;
        let end = self.line_end(position.line).map_or(self.text.len(), |end| {
            u32::from(end) as usize
        });

        let column_offset = self.text[start..end]
            .char_indices()
            .nth(position.column as usize)
            .map_or(end - start, |(i, _)| i);

        Some(TextSize::from((start + column_offset) as u32))
    }

    /// Returns the byte offset where a line starts.
    pub fn line_start(&self, line: u32) -> Option<ByteOffset> {
        self.line_starts.get(line as usize).copied()
    }

    /// Returns the byte offset where a line ends (before its line break).
    pub fn line_end(&self, line: u32) -> Option<ByteOffset> {
        let line = line as usize;
        if line >= self.line_starts.len() {
            return None;
        }

        let end = match self.line_starts.get(line + 1) {
            Some(&next) => {
                let next = u32::from(next) as usize;
                let bytes = self.text.as_bytes();
                if next >= 2 && bytes[next - 2] == b'\r' && bytes[next - 1] == b'\n' {
                    next - 2
                } else {
                    next - 1
                }
            }
            None => self.text.len(),
        };

        Some(TextSize::from(end as u32))
    }

    /// Returns the text of a line without its line break.
    pub fn line_text(&self, line: u32) -> Option<&'src str> {
        let start = u32::from(self.line_start(line)?) as usize;
        let end = u32::from(self.line_end(line)?) as usize;
        Some(&self.text[start..end])
    }
}

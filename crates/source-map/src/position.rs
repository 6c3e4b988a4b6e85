//! Line/column positions.

/// A line and column position (0-indexed).
///
/// Columns count characters, not bytes. A `\r\n` pair, a lone `\n` and a
/// lone `\r` each end a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// 0-indexed line number.
    pub line: u32,
    /// 0-indexed column.
    pub column: u32,
}

impl Position {
    /// Creates a new line/column position.
    #[inline]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Returns the position reached after consuming `text` from this one.
    ///
    /// `after_cr` tells whether the character immediately before `text` was
    /// a `\r`, so a `\n` starting `text` completes that line break instead of
    /// starting a new one.
    pub fn advance(self, text: &str, after_cr: bool) -> Self {
        let mut position = self;
        let mut prev_cr = after_cr;
        for c in text.chars() {
            match c {
                '\n' if prev_cr => {}
                '\n' | '\r' => {
                    position.line += 1;
                    position.column = 0;
                }
                _ => position.column += 1,
            }
            prev_cr = c == '\r';
        }
        position
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_advance_single_line() {
        assert_eq!(Position::default().advance("hello", false), Position::new(0, 5));
    }

    #[test]
    fn test_advance_line_breaks() {
        let start = Position::default();
        assert_eq!(start.advance("a\nb", false), Position::new(1, 1));
        assert_eq!(start.advance("a\r\nb", false), Position::new(1, 1));
        assert_eq!(start.advance("a\rb", false), Position::new(1, 1));
        assert_eq!(start.advance("\n\n", false), Position::new(2, 0));
    }

    #[test]
    fn test_advance_split_crlf() {
        let after_cr = Position::default().advance("a\r", false);
        assert_eq!(after_cr, Position::new(1, 0));
        assert_eq!(after_cr.advance("\nb", true), Position::new(1, 1));
    }

    #[test]
    fn test_advance_counts_chars() {
        assert_eq!(Position::default().advance("äö", false), Position::new(0, 2));
    }

    #[test]
    fn test_display_is_one_based() {
        assert_eq!(Position::new(0, 4).to_string(), "1:5");
    }
}

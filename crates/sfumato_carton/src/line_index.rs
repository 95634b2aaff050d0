//! Offset to line/column conversion.
//!
//! Virtual documents keep every line break of the original, so one index
//! built over the original text answers for all of them.

use memchr::memchr_iter;
use serde::Serialize;

/// A 0-based line and character column.
///
/// Columns count Unicode scalar values, matching how the editor-facing layer
/// counts characters within a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinePosition {
    pub line: u32,
    pub column: u32,
}

impl LinePosition {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Precomputed line starts for a text.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    /// Byte offset of the first character of every line
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(memchr_iter(b'\n', text.as_bytes()).map(|i| i + 1));
        Self { text, line_starts }
    }

    /// Number of lines (a trailing newline opens one more, empty line).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset into a line/column position.
    ///
    /// Offsets past the end clamp to the end of the text.
    pub fn position_of(&self, offset: usize) -> LinePosition {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = self
            .text
            .get(line_start..)
            .map(|rest| {
                rest.char_indices()
                    .take_while(|(i, _)| line_start + i < offset)
                    .count()
            })
            .unwrap_or(0);

        LinePosition {
            line: line as u32,
            column: column as u32,
        }
    }

    /// Convert a line/column position into a byte offset.
    ///
    /// Columns past the end of the line clamp to the line break; lines past
    /// the end clamp to the end of the text.
    pub fn offset_of(&self, position: LinePosition) -> usize {
        let Some(&line_start) = self.line_starts.get(position.line as usize) else {
            return self.text.len();
        };
        let line_end = self
            .line_starts
            .get(position.line as usize + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());

        let line_text = self.text.get(line_start..line_end).unwrap_or_default();
        line_text
            .char_indices()
            .nth(position.column as usize)
            .map(|(i, _)| line_start + i)
            .unwrap_or(line_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_of() {
        let index = LineIndex::new("ab\ncd\n");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.position_of(0), LinePosition::new(0, 0));
        assert_eq!(index.position_of(2), LinePosition::new(0, 2));
        assert_eq!(index.position_of(3), LinePosition::new(1, 0));
        assert_eq!(index.position_of(6), LinePosition::new(2, 0));
        assert_eq!(index.position_of(600), LinePosition::new(2, 0));
    }

    #[test]
    fn test_offset_of() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.offset_of(LinePosition::new(1, 1)), 4);
        assert_eq!(index.offset_of(LinePosition::new(0, 99)), 2);
        assert_eq!(index.offset_of(LinePosition::new(9, 0)), 5);
    }

    #[test]
    fn test_multibyte_columns() {
        let text = "é<div>";
        let index = LineIndex::new(text);
        assert_eq!(index.position_of(2), LinePosition::new(0, 1));
        assert_eq!(index.offset_of(LinePosition::new(0, 1)), 2);
    }
}

/// Byte offsets at which each line of a text begins.
///
/// Lines and columns are zero-based throughout; a column is a byte offset
/// within its line.
#[derive(Clone, Debug)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            len: text.len(),
        }
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset of the zero-based `(line, column)` position, if it lies
    /// within the text (the end-of-text position included).
    #[must_use]
    pub fn offset(&self, line: usize, column: usize) -> Option<usize> {
        let start = *self.line_starts.get(line)?;
        let next = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.len + 1);
        let offset = start + column;
        (offset < next).then_some(offset)
    }

    /// Zero-based `(line, column)` of a byte offset. `offset` must be at most
    /// the text length.
    #[must_use]
    pub fn line_column(&self, offset: usize) -> (usize, usize) {
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        (line, offset - self.line_starts[line])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_starts() {
        let index = LineIndex::new("ab\nc\n\nd");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.offset(0, 0), Some(0));
        assert_eq!(index.offset(0, 2), Some(2)); // the newline itself
        assert_eq!(index.offset(1, 0), Some(3));
        assert_eq!(index.offset(2, 0), Some(5));
        assert_eq!(index.offset(3, 0), Some(6));
        assert_eq!(index.offset(0, 3), None);
        assert_eq!(index.offset(4, 0), None);
    }

    #[test]
    fn last_line_allows_end_of_text() {
        let index = LineIndex::new("ab");
        assert_eq!(index.offset(0, 2), Some(2));
        assert_eq!(index.offset(0, 3), None);
    }

    #[test]
    fn round_trip() {
        let text = "ab\nc\n\nd";
        let index = LineIndex::new(text);
        for offset in 0..=text.len() {
            let (line, column) = index.line_column(offset);
            assert_eq!(index.offset(line, column), Some(offset), "offset {offset}");
        }
    }

    #[test]
    fn empty_text() {
        let index = LineIndex::new("");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.offset(0, 0), Some(0));
        assert_eq!(index.line_column(0), (0, 0));
    }
}

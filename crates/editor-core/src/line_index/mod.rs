//! Line ↔ byte-offset view over a materialized document.
//!
//! Lines are derived, not stored: the index is rebuilt from the document bytes
//! after every batch of edits. A final `\n` terminates the last line and does
//! not start an empty one.

/// Line boundaries of a document, addressed with 1-based line numbers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineIndex {
    /// Content range of each line, newline excluded.
    lines: Vec<std::ops::Range<u64>>,
    byte_len: u64,
}

impl LineIndex {
    /// Scans `bytes` for newlines.
    ///
    /// # Errors
    ///
    /// Fails only if an offset does not fit in a `u64`.
    pub fn new(bytes: &[u8]) -> crate::errors::MathResult<Self> {
        let mut lines = Vec::new();
        let mut line_start = 0u64;

        for newline in memchr::memchr_iter(b'\n', bytes) {
            let newline = <usize as TryInto<u64>>::try_into(newline)?;

            lines.push(line_start..newline);
            line_start = newline + 1;
        }

        let byte_len = <usize as TryInto<u64>>::try_into(bytes.len())?;

        // Trailing text without a final newline is still a line.
        if line_start < byte_len {
            lines.push(line_start..byte_len);
        }

        Ok(Self { lines, byte_len })
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }

    /// Whether the last line is missing its terminating newline.
    #[inline]
    pub fn missing_final_newline(&self) -> bool {
        self.lines.last().is_some_and(|last| last.end == self.byte_len)
    }

    /// Content range of line `line` (1-based), newline excluded.
    pub fn line_range(&self, line: usize) -> Option<std::ops::Range<u64>> {
        line.checked_sub(1).and_then(|idx| self.lines.get(idx)).cloned()
    }

    /// Byte offset at which line `line` (1-based) starts: the sum of the
    /// lengths of all lines before it, newlines included.
    ///
    /// Line `0` starts at offset 0; any line past the last one resolves to
    /// the end of the document, which makes it the append position.
    pub fn line_start(&self, line: usize) -> u64 {
        match line {
            0 => 0,
            n if n > self.lines.len() => self.byte_len,
            n => self.lines[n - 1].start,
        }
    }

    /// Byte offset just past line `line`'s newline (or the end of the
    /// document for an unterminated last line). Equal to
    /// `line_start(line + 1)`.
    pub fn line_end(&self, line: usize) -> u64 {
        self.line_start(line + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::LineIndex;

    #[test]
    fn empty_document_has_no_lines() {
        let index = LineIndex::new(b"").unwrap();

        assert_eq!(index.line_count(), 0);
        assert_eq!(index.line_start(1), 0);
        assert!(!index.missing_final_newline());
    }

    #[test]
    fn final_newline_does_not_add_a_line() {
        let index = LineIndex::new(b"a\nb\nc\n").unwrap();

        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_range(3), Some(4..5));
        assert!(!index.missing_final_newline());
    }

    #[test]
    fn unterminated_last_line_is_counted() {
        let index = LineIndex::new(b"a\nb\nc").unwrap();

        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_range(3), Some(4..5));
        assert!(index.missing_final_newline());
    }

    #[test]
    fn trailing_blank_lines_are_kept() {
        let index = LineIndex::new(b"a\n\n").unwrap();

        assert_eq!(index.line_count(), 2);
        assert_eq!(index.line_range(2), Some(2..2));
    }

    #[test]
    fn line_start_sums_previous_lines() {
        let index = LineIndex::new(b"one\ntwo\nthree").unwrap();

        assert_eq!(index.line_start(0), 0);
        assert_eq!(index.line_start(1), 0);
        assert_eq!(index.line_start(2), 4);
        assert_eq!(index.line_start(3), 8);
        // Past the end clamps to the document length.
        assert_eq!(index.line_start(4), 13);
        assert_eq!(index.line_start(99), 13);
        assert_eq!(index.line_end(2), 8);
    }

    #[test]
    fn line_range_rejects_zero_and_past_end() {
        let index = LineIndex::new(b"x\n").unwrap();

        assert_eq!(index.line_range(0), None);
        assert_eq!(index.line_range(2), None);
    }

    #[test]
    fn blank_lines_have_empty_ranges() {
        let index = LineIndex::new(b"ab\n\ncd").unwrap();

        assert_eq!(index.line_range(1), Some(0..2));
        assert_eq!(index.line_range(2), Some(3..3));
        assert_eq!(index.line_range(3), Some(4..6));
    }
}

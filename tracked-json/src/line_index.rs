//! Byte offset ⇄ line/column conversion over a source text.

/// Precomputed per-line starting byte offsets for a text.
///
/// Lines are split on `\n` with the terminator belonging to the line it ends
/// (so `\r\n` stays in one piece). Empty text has a single empty line, and a
/// trailing newline does not open a phantom extra line; this mirrors how the
/// rest of the crate counts lines when it records positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = Vec::new();
        let mut acc = 0;
        for line in text.split_inclusive('\n') {
            line_starts.push(acc);
            acc += line.len();
        }
        if line_starts.is_empty() {
            line_starts.push(0);
        }
        LineIndex { line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a 0-based byte offset to a 1-based (line, column) pair.
    ///
    /// Offsets past the last line start land on the last line, so the end of
    /// the text (and anything beyond) still maps to a valid position.
    pub fn position_at(&self, offset: usize) -> (usize, usize) {
        let line_idx = self.line_starts.partition_point(|&start| start <= offset) - 1;
        (line_idx + 1, offset - self.line_starts[line_idx] + 1)
    }

    /// Convert a 1-based (line, column) pair back to a 0-based byte offset.
    ///
    /// The line number is clamped into the valid range; the column is taken
    /// as-is so that `offset_at(position_at(o)) == o` for any offset.
    pub fn offset_at(&self, line: usize, column: usize) -> usize {
        let line_idx = line.clamp(1, self.line_starts.len()) - 1;
        self.line_starts[line_idx] + column.saturating_sub(1)
    }
}

/// Byte length of the given 1-based line, excluding its terminator.
///
/// The line number is clamped into the valid range; empty text has length 0.
pub fn line_length(text: &str, line: usize) -> usize {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return 0;
    }
    let idx = line.clamp(1, lines.len()) - 1;
    lines[idx].len()
}

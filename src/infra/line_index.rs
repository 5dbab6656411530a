//! Line index with LF/CRLF-robust line slicing.
//!
//! Goals
//! - Single memchr pass over the bytes.
//! - 1-based external line numbers.
//! - O(1) access to any line's text without its terminator.
//!
//! Notes
//! - An empty buffer has 0 lines.
//! - A trailing '\n' terminates the last line; it does not open a new one.
//! - A '\r' directly before '\n' is never part of the line text.

#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    /// (start, end) byte span of each line, end exclusive, terminator excluded.
    spans: Vec<(usize, usize)>,
}

impl LineIndex {
    /// Build the index by scanning for '\n' once.
    pub fn build(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut spans = Vec::with_capacity(bytes.len() / 40 + 1);
        let mut start = 0usize;

        while let Some(pos) = memchr::memchr(b'\n', &bytes[start..]) {
            let nl = start + pos;
            spans.push((start, trim_cr(bytes, start, nl)));
            start = nl + 1;
        }

        // Unterminated final line
        if start < bytes.len() {
            spans.push((start, trim_cr(bytes, start, bytes.len())));
        }

        Self { spans }
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.spans.len()
    }

    /// Text of a 1-based line, or None when out of range.
    pub fn line<'a>(&self, text: &'a str, line1: usize) -> Option<&'a str> {
        let &(s, e) = self.spans.get(line1.checked_sub(1)?)?;
        text.get(s..e)
    }

    /// Inclusive 1-based line range joined with '\n'.
    /// The end is clamped to the last line; an empty or inverted
    /// range yields None.
    pub fn lines(&self, text: &str, start1: usize, end1: usize) -> Option<String> {
        if start1 == 0 || start1 > end1 || start1 > self.line_count() {
            return None;
        }
        let end1 = end1.min(self.line_count());

        let mut out = String::with_capacity((end1 - start1 + 1) * 48);
        for n in start1..=end1 {
            if n != start1 {
                out.push('\n');
            }
            out.push_str(self.line(text, n)?);
        }
        Some(out)
    }

    /// Leading whitespace width of a line in characters.
    pub fn indentation(&self, text: &str, line1: usize) -> Option<usize> {
        let line = self.line(text, line1)?;
        Some(line.chars().take_while(|c| c.is_whitespace()).count())
    }

    /// True when the line is empty or whitespace only.
    pub fn is_blank(&self, text: &str, line1: usize) -> bool {
        self.line(text, line1).is_none_or(|l| l.trim().is_empty())
    }
}

/// Exclude a '\r' immediately before `end`.
fn trim_cr(bytes: &[u8], start: usize, end: usize) -> usize {
    if end > start && bytes[end - 1] == b'\r' {
        end - 1
    } else {
        end
    }
}

//! Filepath: src/parsers/python_parser.rs
//! ------------------------------------------------------------------
//! Python front end for the indentation-block family.
//! Goals:
//!   - One regex pass over the lines, no grammar dependency.
//!   - Record the indentation of every non-blank line.
//!   - Record every `def` / `class` header with its name.
//!
//! Notes:
//!   - `async def` counts as a `def` header.
//!   - Indentation is the number of leading whitespace characters;
//!     a tab counts as one, the same as a space.
//!   - Lines inside open brackets, triple-quoted strings or after a
//!     trailing backslash are continuations: they carry no indentation
//!     and never hold a header.
//!   - Comment-only lines are treated as blank.
//! ------------------------------------------------------------------

use std::path::Path;

use regex::Regex;

use crate::core::error::ParseFailure;
use crate::core::language::LanguageFamily;
use crate::core::source::{ParsedSource, SourceParser};
use crate::infra::line_index::LineIndex;

/// Role of one physical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Empty, whitespace-only or comment-only.
    Blank,
    /// First line of a logical line, with its indentation.
    Start(usize),
    /// Continues a logical line started above.
    Continuation,
}

/// One `def` / `class` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    /// 1-based line of the header
    pub line: usize,
    /// Leading whitespace width of the header line
    pub indent: usize,
    pub name: String,
}

/// Line-level view of a Python file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndentedSource {
    kinds: Vec<LineKind>,
    /// Headers in line order.
    headers: Vec<BlockHeader>,
}

impl IndentedSource {
    pub fn line_count(&self) -> usize {
        self.kinds.len()
    }

    /// Role of a 1-based line; out-of-range lines are blank.
    pub fn kind(&self, line1: usize) -> LineKind {
        line1
            .checked_sub(1)
            .and_then(|i| self.kinds.get(i).copied())
            .unwrap_or(LineKind::Blank)
    }

    /// Indentation of a line that starts a logical line, None for
    /// blank, continuation or out-of-range lines.
    pub fn indent(&self, line1: usize) -> Option<usize> {
        match self.kind(line1) {
            LineKind::Start(indent) => Some(indent),
            LineKind::Blank | LineKind::Continuation => None,
        }
    }

    /// Header starting on `line1`, if that line is one.
    pub fn header_at(&self, line1: usize) -> Option<&BlockHeader> {
        self.headers
            .binary_search_by_key(&line1, |h| h.line)
            .ok()
            .map(|i| &self.headers[i])
    }

    /// True when `line1` is a header that defines `name`.
    pub fn defines(&self, line1: usize, name: &str) -> bool {
        self.header_at(line1).is_some_and(|h| h.name == name)
    }
}

/// Bracket and string state carried from one line to the next.
#[derive(Debug, Default)]
struct Continuation {
    depth: usize,
    /// Quote byte of an open triple-quoted string.
    triple: Option<u8>,
    backslash: bool,
}

impl Continuation {
    fn is_open(&self) -> bool {
        self.depth > 0 || self.triple.is_some() || self.backslash
    }

    /// Update the state with one line of source.
    fn advance(&mut self, line: &str) {
        let bytes = line.as_bytes();
        let mut i = 0;
        self.backslash = false;

        while i < bytes.len() {
            if let Some(q) = self.triple {
                if bytes[i] == b'\\' {
                    i += 2;
                } else if bytes[i..].starts_with(&[q; 3]) {
                    self.triple = None;
                    i += 3;
                } else {
                    i += 1;
                }
                continue;
            }

            match bytes[i] {
                b'#' => break,
                b'(' | b'[' | b'{' => self.depth += 1,
                b')' | b']' | b'}' => self.depth = self.depth.saturating_sub(1),
                b'\\' if i + 1 == bytes.len() => self.backslash = true,
                q @ (b'"' | b'\'') => {
                    if bytes[i..].starts_with(&[q; 3]) {
                        self.triple = Some(q);
                        i += 3;
                        continue;
                    }
                    // Skip a single-line string up to its closing quote
                    i += 1;
                    while i < bytes.len() && bytes[i] != q {
                        i += if bytes[i] == b'\\' { 2 } else { 1 };
                    }
                }
                _ => {}
            }
            i += 1;
        }
    }
}

/// Scans Python sources into `IndentedSource`.
#[derive(Debug, Clone)]
pub struct PythonParser {
    /// `def` / `class` header, capturing the name.
    header: Regex,
}

impl PythonParser {
    /// Compile the header pattern once for reuse.
    pub fn new() -> Result<Self, regex::Error> {
        let header = Regex::new(r"^\s*(?:async\s+)?(?:def|class)\s+([^\W\d]\w*)")?;
        Ok(Self { header })
    }

    /// Build the line-level view of `source`.
    pub fn scan(&self, source: &str) -> IndentedSource {
        let index = LineIndex::build(source);

        // Pre-size from the line count; headers are far fewer.
        let mut kinds = Vec::with_capacity(index.line_count());
        let mut headers = Vec::with_capacity(16);
        let mut state = Continuation::default();

        for n in 1..=index.line_count() {
            let line = index.line(source, n).unwrap_or_default();

            if state.is_open() {
                kinds.push(LineKind::Continuation);
                state.advance(line);
                continue;
            }

            if index.is_blank(source, n) || line.trim_start().starts_with('#') {
                kinds.push(LineKind::Blank);
                continue;
            }

            let indent = index.indentation(source, n).unwrap_or_default();
            kinds.push(LineKind::Start(indent));

            // Record the header when this line opens a def/class.
            if let Some(caps) = self.header.captures(line) {
                headers.push(BlockHeader {
                    line: n,
                    indent,
                    name: caps[1].to_string(),
                });
            }

            state.advance(line);
        }

        IndentedSource { kinds, headers }
    }
}

impl SourceParser for PythonParser {
    fn family(&self) -> LanguageFamily {
        LanguageFamily::Indentation
    }

    /// Line scanning accepts any text.
    fn parse(&self, _path: &Path, text: &str) -> Result<ParsedSource, ParseFailure> {
        Ok(ParsedSource::Indentation(self.scan(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(src: &str) -> IndentedSource {
        PythonParser::new().unwrap().scan(src)
    }

    #[test]
    fn records_headers_and_indentation() {
        let src = "class Calculator:\n    def add(self, a, b):\n\n        return a + b\n";
        let s = scan(src);

        assert_eq!(s.line_count(), 4);
        assert_eq!(s.indent(1), Some(0));
        assert_eq!(s.indent(2), Some(4));
        assert_eq!(s.indent(3), None);
        assert_eq!(s.indent(4), Some(8));
        assert_eq!(s.indent(9), None);

        assert_eq!(s.header_at(1).unwrap().name, "Calculator");
        assert_eq!(s.header_at(2).unwrap().indent, 4);
        assert!(s.header_at(4).is_none());
    }

    #[test]
    fn async_def_is_a_header() {
        let s = scan("async def fetch(url):\n    return await get(url)\n");
        assert!(s.defines(1, "fetch"));
        assert!(!s.defines(2, "get"));
    }

    #[test]
    fn name_must_match_whole_identifier() {
        let s = scan("def greeting():\n    pass\n");
        assert!(s.defines(1, "greeting"));
        assert!(!s.defines(1, "greet"));
    }

    #[test]
    fn definitions_inside_strings_are_not_anchored_headers() {
        // Only a leading `def` counts
        let s = scan("x = 'def fake(): pass'\n");
        assert!(s.header_at(1).is_none());
    }

    #[test]
    fn multiline_signature_lines_are_continuations() {
        let s = scan("def handler(\n    request,\n) -> None:\n    greet(request)\n");
        assert_eq!(s.kind(1), LineKind::Start(0));
        assert_eq!(s.kind(2), LineKind::Continuation);
        assert_eq!(s.kind(3), LineKind::Continuation);
        assert_eq!(s.kind(4), LineKind::Start(4));
        assert!(s.defines(1, "handler"));
    }

    #[test]
    fn docstring_body_is_continuation_and_hides_headers() {
        let src = "def f():\n    \"\"\"Doc\ndef fake():\n    \"\"\"\n    greet()\n";
        let s = scan(src);
        assert_eq!(s.kind(2), LineKind::Start(4));
        assert_eq!(s.kind(3), LineKind::Continuation);
        assert_eq!(s.kind(4), LineKind::Continuation);
        assert_eq!(s.kind(5), LineKind::Start(4));
        assert!(s.header_at(3).is_none());
    }

    #[test]
    fn brackets_in_strings_and_comments_do_not_open() {
        let src = "x = \"(\"  # [\ny = ')'\nz = 1 \\\n  + 2\nw = 3\n";
        let s = scan(src);
        assert_eq!(s.kind(2), LineKind::Start(0));
        assert_eq!(s.kind(3), LineKind::Start(0));
        assert_eq!(s.kind(4), LineKind::Continuation);
        assert_eq!(s.kind(5), LineKind::Start(0));
    }

    #[test]
    fn comment_only_lines_are_blank() {
        let s = scan("def f():\n# note\n    pass\n");
        assert_eq!(s.kind(2), LineKind::Blank);
        assert_eq!(s.indent(2), None);
    }
}

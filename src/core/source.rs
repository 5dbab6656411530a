//! Filepath: src/core/source.rs
//! A loaded source file and the per-family strategy dispatch.
//!
//! Each file is parsed once into a [`ParsedSource`]; reference finding
//! and scope resolution then dispatch on the variant, so the structural
//! and indentation families share one interface without a trait object
//! per file.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::core::error::{ParseFailure, SourceError};
use crate::core::language::{LanguageFamily, detect_language_family};
use crate::core::model::{ScopeInfo, SourceLocation};
use crate::core::references::{CallTarget, find_indented_references, find_structural_references};
use crate::core::scope::{find_indented_scope, find_structural_scope};
use crate::core::syntax::SyntaxTree;
use crate::infra::io::read_source;
use crate::infra::line_index::LineIndex;
use crate::parsers::javascript_parser::JavaScriptParser;
use crate::parsers::python_parser::{IndentedSource, PythonParser};

/// Parsed form of a file, one variant per language family
#[derive(Debug, Clone)]
pub enum ParsedSource
{
    /// Lowered syntax tree
    Structural(SyntaxTree),

    /// Per-line indentation and block headers
    Indentation(IndentedSource),
}

/// Front end for one language family
pub trait SourceParser: Send + Sync
{
    /// Family this parser handles
    fn family(&self) -> LanguageFamily;

    /// Parse decoded text; a failure means the file is skipped
    fn parse(
        &self,
        path: &Path,
        text: &str,
    ) -> Result<ParsedSource, ParseFailure>;
}

/// The parser for each supported family
#[derive(Debug, Clone)]
pub struct ParserRegistry
{
    structural: JavaScriptParser,
    indentation: PythonParser,
}

impl ParserRegistry
{
    /// Build every front end once
    pub fn new() -> anyhow::Result<Self>
    {
        let indentation = PythonParser::new().context("compile Python header pattern")?;

        Ok(Self { structural: JavaScriptParser::new(), indentation })
    }

    /// Parser for a family, or None for unsupported files
    pub fn parser_for(
        &self,
        family: LanguageFamily,
    ) -> Option<&dyn SourceParser>
    {
        match family
        {
            LanguageFamily::Structural => Some(&self.structural),
            LanguageFamily::Indentation => Some(&self.indentation),
            LanguageFamily::Unsupported => None,
        }
    }
}

/// One file's text, line index and parsed form
#[derive(Debug, Clone)]
pub struct SourceFile
{
    path: PathBuf,
    family: LanguageFamily,
    text: String,
    index: LineIndex,
    parsed: ParsedSource,
}

impl SourceFile
{
    /// Parse already-decoded text
    pub fn parse(
        path: impl Into<PathBuf>,
        text: String,
        registry: &ParserRegistry,
    ) -> Result<Self, SourceError>
    {
        let path = path.into();
        let family = detect_language_family(&path);

        // Unsupported files never reach a parser
        let Some(parser) = registry.parser_for(family)
        else
        {
            return Err(SourceError::Unsupported { path });
        };

        let parsed = match parser.parse(&path, &text)
        {
            Ok(parsed) => parsed,
            Err(failure) => return Err(SourceError::Parse { path, failure }),
        };

        let index = LineIndex::build(&text);

        Ok(Self { path, family, text, index, parsed })
    }

    /// Read and parse a file from disk
    pub fn load(
        path: &Path,
        registry: &ParserRegistry,
    ) -> Result<Self, SourceError>
    {
        // Skip the read entirely for files no parser handles
        if !detect_language_family(path).is_supported()
        {
            return Err(SourceError::Unsupported { path: path.to_path_buf() });
        }

        let text = read_source(path)?;
        Self::parse(path, text, registry)
    }

    pub fn path(&self) -> &Path
    {
        &self.path
    }

    pub fn family(&self) -> LanguageFamily
    {
        self.family
    }

    /// Full text, verbatim
    pub fn text(&self) -> &str
    {
        &self.text
    }

    pub fn parsed(&self) -> &ParsedSource
    {
        &self.parsed
    }

    pub fn line_count(&self) -> usize
    {
        self.index
            .line_count()
    }

    /// Text of a 1-based line without its terminator
    pub fn line(
        &self,
        line1: usize,
    ) -> Option<&str>
    {
        self.index
            .line(&self.text, line1)
    }

    /// Inclusive 1-based line range joined with '\n'
    pub fn lines(
        &self,
        start1: usize,
        end1: usize,
    ) -> Option<String>
    {
        self.index
            .lines(&self.text, start1, end1)
    }

    /// Call sites of `target` in source order
    pub fn find_references(
        &self,
        target: &CallTarget,
    ) -> Vec<SourceLocation>
    {
        match &self.parsed
        {
            ParsedSource::Structural(tree) => find_structural_references(tree, &self.path, target),
            ParsedSource::Indentation(lines) =>
            {
                find_indented_references(lines, &self.text, &self.index, &self.path, target)
            }
        }
    }

    /// Innermost function-like scope containing `location`, if any
    pub fn find_enclosing_scope(
        &self,
        location: &SourceLocation,
    ) -> Option<ScopeInfo>
    {
        match &self.parsed
        {
            ParsedSource::Structural(tree) => find_structural_scope(tree, location.line),
            ParsedSource::Indentation(lines) => find_indented_scope(lines, location.line),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn registry() -> ParserRegistry
    {
        ParserRegistry::new().unwrap()
    }

    #[test]
    fn parses_each_family()
    {
        let js = SourceFile::parse("a.js", "run();\n".into(), &registry()).unwrap();
        assert_eq!(js.family(), LanguageFamily::Structural);
        assert!(matches!(js.parsed(), ParsedSource::Structural(_)));

        let py = SourceFile::parse("a.py", "run()\n".into(), &registry()).unwrap();
        assert_eq!(py.family(), LanguageFamily::Indentation);
        assert!(matches!(py.parsed(), ParsedSource::Indentation(_)));
    }

    #[test]
    fn unsupported_and_broken_files_fail_typed()
    {
        let err = SourceFile::parse("a.rs", "fn main() {}".into(), &registry()).unwrap_err();
        assert!(matches!(err, SourceError::Unsupported { .. }));

        let err = SourceFile::parse("b.ts", "function (".into(), &registry()).unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
        assert_eq!(err.path(), Path::new("b.ts"));
    }

    #[test]
    fn empty_file_parses_with_no_lines()
    {
        let src = SourceFile::parse("empty.js", String::new(), &registry()).unwrap();
        assert_eq!(src.line_count(), 0);
        assert_eq!(src.line(1), None);
    }

    #[test]
    fn load_reads_from_disk()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir
            .path()
            .join("m.py");
        std::fs::write(&path, "def f():\n    g()\n").unwrap();

        let src = SourceFile::load(&path, &registry()).unwrap();
        assert_eq!(src.line(2), Some("    g()"));
        assert_eq!(src.path(), path.as_path());

        let missing = SourceFile::load(&dir.path().join("gone.py"), &registry()).unwrap_err();
        assert!(matches!(missing, SourceError::Read { .. }));
    }
}

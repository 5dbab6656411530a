//! Filepath: src/core/model.rs
//! Value types shared by the finder, resolver, extractor and
//! orchestrator. Everything here is built once per analysis
//! call and treated as immutable afterwards.
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// One point in one file: 1-based line, 0-based byte column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation
{
    /// File the location points into
    pub file_path: PathBuf,

    /// 1-based line number
    pub line: usize,

    /// 0-based byte offset within the line
    pub column: usize,
}

impl SourceLocation
{
    /// Build a location from its parts
    pub fn new(
        file_path: impl Into<PathBuf>,
        line: usize,
        column: usize,
    ) -> Self
    {
        Self { file_path: file_path.into(), line, column }
    }

    /// Borrow the file path
    pub fn path(&self) -> &Path
    {
        &self.file_path
    }
}

impl std::fmt::Display for SourceLocation
{
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result
    {
        write!(f, "{}:{}:{}", self.file_path.display(), self.line, self.column)
    }
}

/// Innermost enclosing function-like construct of a location.
/// Lines are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeInfo
{
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl ScopeInfo
{
    /// Name reported for scopes without an identifier
    pub const ANONYMOUS: &'static str = "anonymous";

    /// Build a scope, normalizing an inverted range
    pub fn new(
        name: impl Into<String>,
        start_line: usize,
        end_line: usize,
    ) -> Self
    {
        Self { name: name.into(), start_line, end_line: end_line.max(start_line) }
    }

    /// Number of lines covered by the scope
    pub fn line_count(&self) -> usize
    {
        self.end_line - self.start_line + 1
    }
}

/// How much text to report around a call site.
/// Variants are declared in increasing order of size.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ContextDepth
{
    /// The call-site line only
    Snippet,

    /// The enclosing function or method
    #[default]
    Logic,

    /// The whole file
    Module,
}

impl std::fmt::Display for ContextDepth
{
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result
    {
        match self
        {
            ContextDepth::Snippet => write!(f, "snippet"),
            ContextDepth::Logic => write!(f, "logic"),
            ContextDepth::Module => write!(f, "module"),
        }
    }
}

/// A recorded call site plus the text extracted around it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference
{
    /// Where the call expression starts
    pub location: SourceLocation,

    /// Extracted source text
    pub context: String,

    /// Depth the context was extracted at
    pub depth: ContextDepth,

    /// Name of the enclosing scope (LOGIC depth with a resolved scope only)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub enclosing_scope: Option<String>,
}

/// All references to one function name.
/// `count` always equals `references.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult
{
    function_name: String,
    references: Vec<Reference>,
    count: usize,
}

impl AnalysisResult
{
    /// Wrap the references found for `function_name`
    pub fn new(
        function_name: impl Into<String>,
        references: Vec<Reference>,
    ) -> Self
    {
        let count = references.len();
        Self { function_name: function_name.into(), references, count }
    }

    /// Result with no references
    pub fn empty(function_name: impl Into<String>) -> Self
    {
        Self::new(function_name, Vec::new())
    }

    pub fn function_name(&self) -> &str
    {
        &self.function_name
    }

    pub fn references(&self) -> &[Reference]
    {
        &self.references
    }

    pub fn count(&self) -> usize
    {
        self.count
    }

    pub fn is_empty(&self) -> bool
    {
        self.count == 0
    }
}

/// Aggregate of several single-name analyses, keyed by name in
/// caller order, with summary counters.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAnalysis
{
    results: IndexMap<String, AnalysisResult>,
    total_matches: usize,
    files_matched: usize,
}

impl BatchAnalysis
{
    /// Build the aggregate and compute its counters
    pub fn new(results: IndexMap<String, AnalysisResult>) -> Self
    {
        // Sum reference counts across every analyzed name
        let total_matches = results
            .values()
            .map(AnalysisResult::count)
            .sum();

        // Count distinct files holding at least one reference
        let files: IndexSet<&Path> = results
            .values()
            .flat_map(|r| {
                r.references()
                    .iter()
            })
            .map(|r| {
                r.location
                    .path()
            })
            .collect();
        let files_matched = files.len();

        Self { results, total_matches, files_matched }
    }

    pub fn results(&self) -> &IndexMap<String, AnalysisResult>
    {
        &self.results
    }

    /// Lookup the result for one name
    pub fn get(
        &self,
        function_name: &str,
    ) -> Option<&AnalysisResult>
    {
        self.results
            .get(function_name)
    }

    pub fn total_matches(&self) -> usize
    {
        self.total_matches
    }

    pub fn files_matched(&self) -> usize
    {
        self.files_matched
    }

    /// Number of analyzed names
    pub fn len(&self) -> usize
    {
        self.results
            .len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.results
            .is_empty()
    }
}

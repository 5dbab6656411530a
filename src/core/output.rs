//! Filepath: src/core/output.rs
//! Render analysis results as markdown, JSON or plain text.
//!
//! Paths are shown relative to the analysis root when possible. JSON
//! keeps the serialized model as-is (camelCase keys, absolute paths).

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::language::fence_language;
use crate::core::model::{AnalysisResult, BatchAnalysis, Reference};

/// Output format for rendered results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat
{
    #[default]
    Markdown,
    Json,
    Plain,
}

/// Render one single-name analysis
pub fn render_analysis(
    result: &AnalysisResult,
    format: OutputFormat,
    root: &Path,
) -> Result<String>
{
    match format
    {
        OutputFormat::Json => serde_json::to_string_pretty(result).context("serialize analysis to JSON"),
        OutputFormat::Markdown =>
        {
            let mut out = String::new();
            markdown_section(&mut out, result, root, "#");
            Ok(out)
        }
        OutputFormat::Plain =>
        {
            let mut out = String::new();
            plain_section(&mut out, result, root);
            Ok(out)
        }
    }
}

/// Render a multi-name analysis with its summary counters
pub fn render_batch(
    batch: &BatchAnalysis,
    format: OutputFormat,
    root: &Path,
) -> Result<String>
{
    match format
    {
        OutputFormat::Json => serde_json::to_string_pretty(batch).context("serialize batch analysis to JSON"),
        OutputFormat::Markdown =>
        {
            let mut out = String::new();
            let _ = writeln!(out, "# Function references\n");
            let _ = writeln!(
                out,
                "{} functions, {} references in {} files\n",
                batch.len(),
                batch.total_matches(),
                batch.files_matched()
            );
            for result in batch
                .results()
                .values()
            {
                markdown_section(&mut out, result, root, "##");
            }
            Ok(out)
        }
        OutputFormat::Plain =>
        {
            let mut out = String::new();
            for result in batch
                .results()
                .values()
            {
                let _ = writeln!(out, "== {} ({}) ==", result.function_name(), result.count());
                plain_section(&mut out, result, root);
            }
            let _ = writeln!(
                out,
                "total: {} references in {} files",
                batch.total_matches(),
                batch.files_matched()
            );
            Ok(out)
        }
    }
}

/// Path relative to `root`, or unchanged when outside it
fn display_path(
    path: &Path,
    root: &Path,
) -> String
{
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn location_label(
    reference: &Reference,
    root: &Path,
) -> String
{
    format!(
        "{}:{}:{}",
        display_path(reference.location.path(), root),
        reference
            .location
            .line,
        reference
            .location
            .column
    )
}

fn markdown_section(
    out: &mut String,
    result: &AnalysisResult,
    root: &Path,
    heading: &str,
)
{
    let _ = writeln!(out, "{heading} `{}`\n", result.function_name());

    let noun = if result.count() == 1 { "reference" } else { "references" };
    let _ = writeln!(out, "{} {noun}\n", result.count());

    for reference in result.references()
    {
        let _ = writeln!(out, "{heading}# {}\n", location_label(reference, root));

        if let Some(scope) = &reference.enclosing_scope
        {
            let _ = writeln!(out, "In `{scope}` ({})\n", reference.depth);
        }

        // Longer fences when the context itself contains backticks
        let fence = fence_for(&reference.context);
        let lang = fence_language(reference.location.path());
        let _ = writeln!(out, "{fence}{lang}");
        out.push_str(&reference.context);
        if !reference
            .context
            .ends_with('\n')
        {
            out.push('\n');
        }
        let _ = writeln!(out, "{fence}\n");
    }
}

fn plain_section(
    out: &mut String,
    result: &AnalysisResult,
    root: &Path,
)
{
    for reference in result.references()
    {
        let _ = writeln!(out, "{}", location_label(reference, root));
        out.push_str(&reference.context);
        if !reference
            .context
            .ends_with('\n')
        {
            out.push('\n');
        }
        out.push('\n');
    }
}

/// Backtick fence longer than any run inside `text`
fn fence_for(text: &str) -> String
{
    let mut longest = 0usize;
    let mut run = 0usize;
    for c in text.chars()
    {
        if c == '`'
        {
            run += 1;
            longest = longest.max(run);
        }
        else
        {
            run = 0;
        }
    }
    "`".repeat(longest.max(2) + 1)
}

//! Filepath: src/core/scope.rs
//! Scope resolver: innermost function-like construct around a line.
//!
//! Structural trees are walked in pre-order and every containing
//! function node overwrites the current best, so the innermost one is
//! the last written. Indentation-family files walk backwards from the
//! target line to the nearest less-indented `def`/`class` header.
//! Continuation lines (bracketed signatures, docstring bodies) carry
//! no indentation there, so only logical line starts close a block.

use crate::core::model::ScopeInfo;
use crate::core::syntax::{NodeKind, SyntaxNode, SyntaxTree, Visitor};
use crate::parsers::python_parser::{BlockHeader, IndentedSource, LineKind};

/// Tracks the innermost function node containing `line`
struct EnclosingScopeFinder
{
    line: usize,
    best: Option<ScopeInfo>,
}

impl Visitor for EnclosingScopeFinder
{
    fn visit(
        &mut self,
        node: &SyntaxNode,
    )
    {
        let NodeKind::Function { name, .. } = node.kind()
        else
        {
            return;
        };

        let range = node.range();
        if !range.contains_line(self.line)
        {
            return;
        }

        // Keep descending and overwrite; the last containing match wins
        let name = name
            .as_deref()
            .unwrap_or(ScopeInfo::ANONYMOUS);
        self.best = Some(ScopeInfo::new(name, range.start_line, range.end_line));
    }
}

/// Innermost function, arrow or method containing `line`
pub fn find_structural_scope(
    tree: &SyntaxTree,
    line: usize,
) -> Option<ScopeInfo>
{
    let mut finder = EnclosingScopeFinder { line, best: None };
    tree.walk(&mut finder);
    finder.best
}

/// Nearest enclosing `def`/`class` of `line`, or None at module level
pub fn find_indented_scope(
    source: &IndentedSource,
    line: usize,
) -> Option<ScopeInfo>
{
    if line == 0 || line > source.line_count()
    {
        return None;
    }

    // Threshold starts at the line's own indentation
    let mut threshold = reference_indent(source, line)?;

    for n in (1..line).rev()
    {
        let Some(indent) = source.indent(n)
        else
        {
            continue;
        };

        if indent >= threshold
        {
            continue;
        }

        // A less-indented header opens the enclosing block
        if let Some(header) = source.header_at(n)
        {
            let end = block_end(source, header).max(line);
            return Some(ScopeInfo::new(header.name.clone(), header.line, end));
        }

        // An ordinary block opener (if/for/with...) narrows the search
        if indent == 0
        {
            return None;
        }
        threshold = indent;
    }

    None
}

/// Indentation of `line`, or of the nearest non-blank line when blank
/// (searching upward first, then downward)
fn reference_indent(
    source: &IndentedSource,
    line: usize,
) -> Option<usize>
{
    source
        .indent(line)
        .or_else(|| {
            (1..line)
                .rev()
                .find_map(|n| source.indent(n))
        })
        .or_else(|| {
            (line + 1..=source.line_count()).find_map(|n| source.indent(n))
        })
}

/// Last non-blank line of the block opened by `header`: deeper
/// logical lines and every continuation line before the block closes
fn block_end(
    source: &IndentedSource,
    header: &BlockHeader,
) -> usize
{
    let mut end = header.line;

    for n in header.line + 1..=source.line_count()
    {
        match source.kind(n)
        {
            LineKind::Blank => continue,
            LineKind::Continuation => end = n,
            LineKind::Start(indent) if indent > header.indent => end = n,
            LineKind::Start(_) => break,
        }
    }

    end
}

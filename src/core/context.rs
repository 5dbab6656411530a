//! Filepath: src/core/context.rs
//! Context extractor: turn call-site locations into references.
//!
//! - SNIPPET: the call-site line only (empty when out of range)
//! - LOGIC: the enclosing scope; scopes longer than `max_lines` are cut
//!   to a window centered on the call line between two marker comments.
//!   Without a scope this falls back to SNIPPET.
//! - MODULE: the whole file, verbatim and never truncated
//!
//! Sources come from a [`SourceProvider`], so extraction never reads
//! or parses a file on its own.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

use crate::core::model::{ContextDepth, Reference, ScopeInfo, SourceLocation};
use crate::core::source::SourceFile;

/// Default LOGIC line ceiling
pub const DEFAULT_MAX_LINES: usize = 100;

/// Hands out parsed sources by path
pub trait SourceProvider: Send + Sync
{
    /// The parsed file, or None when it cannot be provided
    fn source(
        &self,
        path: &Path,
    ) -> Option<Arc<SourceFile>>;
}

impl<T: SourceProvider + ?Sized> SourceProvider for &T
{
    fn source(
        &self,
        path: &Path,
    ) -> Option<Arc<SourceFile>>
    {
        (**self).source(path)
    }
}

/// Extracts context at a fixed line ceiling
#[derive(Debug, Clone)]
pub struct ContextExtractor<P>
{
    provider: P,
    max_lines: usize,
}

impl<P: SourceProvider> ContextExtractor<P>
{
    /// `max_lines` is clamped to at least 1
    pub fn new(
        provider: P,
        max_lines: usize,
    ) -> Self
    {
        Self { provider, max_lines: max_lines.max(1) }
    }

    pub fn max_lines(&self) -> usize
    {
        self.max_lines
    }

    /// Reference for one location; an unavailable file gives an empty
    /// context and no scope
    pub fn extract_context(
        &self,
        location: &SourceLocation,
        depth: ContextDepth,
    ) -> Reference
    {
        match self
            .provider
            .source(location.path())
        {
            Some(source) => self.extract_from(&source, location, depth),
            None => Reference {
                location: location.clone(),
                context: String::new(),
                depth,
                enclosing_scope: None,
            },
        }
    }

    /// One reference per location, in input order
    pub fn extract_multiple_contexts(
        &self,
        locations: &[SourceLocation],
        depth: ContextDepth,
    ) -> Vec<Reference>
    {
        locations
            .par_iter()
            .map(|loc| self.extract_context(loc, depth))
            .collect()
    }

    /// Reference for a location inside an already loaded source
    pub fn extract_from(
        &self,
        source: &SourceFile,
        location: &SourceLocation,
        depth: ContextDepth,
    ) -> Reference
    {
        let (context, enclosing_scope) = match depth
        {
            ContextDepth::Snippet => (snippet(source, location.line), None),
            ContextDepth::Module => (
                source
                    .text()
                    .to_string(),
                None,
            ),
            ContextDepth::Logic => match source.find_enclosing_scope(location)
            {
                Some(scope) =>
                {
                    let text = self.scope_text(source, &scope, location.line);
                    (text, Some(scope.name))
                }
                // No scope: silently fall back to the call line
                None => (snippet(source, location.line), None),
            },
        };

        Reference { location: location.clone(), context, depth, enclosing_scope }
    }

    /// Full scope text, or a centered window with markers when too long
    fn scope_text(
        &self,
        source: &SourceFile,
        scope: &ScopeInfo,
        line: usize,
    ) -> String
    {
        let span = scope.line_count();

        // Scopes of two lines or fewer cannot be windowed with markers
        if span <= self.max_lines || span <= 2
        {
            return source
                .lines(scope.start_line, scope.end_line)
                .unwrap_or_default();
        }

        // Window plus markers never exceeds the scope itself
        let width = self
            .max_lines
            .min(span - 2)
            .max(1);
        let (start, end) = centered_window(scope, line, width);

        let body = source
            .lines(start, end)
            .unwrap_or_default();
        let prefix = source
            .family()
            .comment_prefix();
        let shown = end - start + 1;

        let mut out = String::with_capacity(body.len() + 160);
        out.push_str(&format!(
            "{prefix} ... truncated: showing lines {start}-{end} of `{}` (lines {}-{}) ...\n",
            scope.name, scope.start_line, scope.end_line
        ));
        out.push_str(&body);
        out.push_str(&format!("\n{prefix} ... truncated: {} of {span} lines hidden ...", span - shown));
        out
    }
}

/// Text of the call line, or empty when out of range
fn snippet(
    source: &SourceFile,
    line: usize,
) -> String
{
    source
        .line(line)
        .unwrap_or_default()
        .to_string()
}

/// Window of `width` lines around `line`, clamped to the scope and
/// re-anchored when it hits the scope end
pub(crate) fn centered_window(
    scope: &ScopeInfo,
    line: usize,
    width: usize,
) -> (usize, usize)
{
    let line = line.clamp(scope.start_line, scope.end_line);

    let start = line
        .saturating_sub(width / 2)
        .max(scope.start_line);
    let end = (start + width - 1).min(scope.end_line);

    // Shift back so the window stays `width` wide near the end
    let start = if end + 1 - start < width
    {
        (end + 1)
            .saturating_sub(width)
            .max(scope.start_line)
    }
    else
    {
        start
    };

    (start, end)
}

#[cfg(test)]
mod tests
{
    use std::collections::HashMap;
    use std::path::PathBuf;

    use super::*;
    use crate::core::source::ParserRegistry;

    /// Fixed in-memory provider
    struct Fixed(HashMap<PathBuf, Arc<SourceFile>>);

    impl SourceProvider for Fixed
    {
        fn source(
            &self,
            path: &Path,
        ) -> Option<Arc<SourceFile>>
        {
            self.0
                .get(path)
                .cloned()
        }
    }

    fn provider(files: &[(&str, String)]) -> Fixed
    {
        let registry = ParserRegistry::new().unwrap();
        let map = files
            .iter()
            .map(|(p, text)| {
                let src = SourceFile::parse(*p, text.clone(), &registry).unwrap();
                (PathBuf::from(p), Arc::new(src))
            })
            .collect();
        Fixed(map)
    }

    /// A function spanning `body + 2` lines with a call on `call_line`
    fn long_function(
        body: usize,
        call_line: usize,
    ) -> String
    {
        let mut out = String::from("function big() {\n");
        for n in 2..body + 2
        {
            if n == call_line
            {
                out.push_str("  target();\n");
            }
            else
            {
                out.push_str(&format!("  step{n}();\n"));
            }
        }
        out.push_str("}\n");
        out
    }

    #[test]
    fn snippet_logic_and_module()
    {
        let text = "function greet() {\n  hello();\n}\ngreet();\n".to_string();
        let ex = ContextExtractor::new(provider(&[("a.js", text.clone())]), 100);

        let loc = SourceLocation::new("a.js", 2, 2);
        let snip = ex.extract_context(&loc, ContextDepth::Snippet);
        assert_eq!(snip.context, "  hello();");
        assert_eq!(snip.enclosing_scope, None);

        let logic = ex.extract_context(&loc, ContextDepth::Logic);
        assert_eq!(logic.context, "function greet() {\n  hello();\n}");
        assert_eq!(logic.enclosing_scope.as_deref(), Some("greet"));
        assert_eq!(logic.depth, ContextDepth::Logic);

        let module = ex.extract_context(&loc, ContextDepth::Module);
        assert_eq!(module.context, text);
    }

    #[test]
    fn logic_without_scope_falls_back_to_snippet()
    {
        let ex = ContextExtractor::new(provider(&[("a.js", "greet();\n".to_string())]), 100);
        let r = ex.extract_context(&SourceLocation::new("a.js", 1, 0), ContextDepth::Logic);
        assert_eq!(r.context, "greet();");
        assert_eq!(r.enclosing_scope, None);
        assert_eq!(r.depth, ContextDepth::Logic);
    }

    #[test]
    fn out_of_range_and_unknown_files_are_empty()
    {
        let ex = ContextExtractor::new(provider(&[("a.js", "f();\n".to_string())]), 100);

        let r = ex.extract_context(&SourceLocation::new("a.js", 40, 0), ContextDepth::Snippet);
        assert_eq!(r.context, "");

        let r = ex.extract_context(&SourceLocation::new("missing.js", 1, 0), ContextDepth::Module);
        assert_eq!(r.context, "");
        assert_eq!(r.enclosing_scope, None);
    }

    #[test]
    fn long_scope_is_windowed_around_the_call()
    {
        // Lines 1..=500, call at 300
        let text = long_function(498, 300);
        let ex = ContextExtractor::new(provider(&[("big.js", text)]), 100);
        let r = ex.extract_context(&SourceLocation::new("big.js", 300, 2), ContextDepth::Logic);

        let lines: Vec<&str> = r
            .context
            .lines()
            .collect();
        assert_eq!(lines.len(), 102);
        assert_eq!(lines[0], "// ... truncated: showing lines 250-349 of `big` (lines 1-500) ...");
        assert_eq!(lines[101], "// ... truncated: 400 of 500 lines hidden ...");
        assert!(lines.contains(&"  target();"));
        assert_eq!(r.enclosing_scope.as_deref(), Some("big"));
    }

    #[test]
    fn python_markers_use_hash_comments()
    {
        let mut text = String::from("def big():\n");
        for n in 0..20
        {
            text.push_str(&format!("    step{n}()\n"));
        }
        let ex = ContextExtractor::new(provider(&[("m.py", text)]), 5);
        let r = ex.extract_context(&SourceLocation::new("m.py", 2, 4), ContextDepth::Logic);

        let lines: Vec<&str> = r
            .context
            .lines()
            .collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("# ... truncated: showing lines 1-5"));
        assert!(lines[6].starts_with("# ... truncated:"));
    }

    #[test]
    fn window_is_reanchored_at_scope_edges()
    {
        let scope = ScopeInfo::new("f", 10, 200);
        assert_eq!(centered_window(&scope, 12, 50), (10, 59));
        assert_eq!(centered_window(&scope, 199, 50), (151, 200));
        assert_eq!(centered_window(&scope, 100, 1), (100, 100));
    }

    #[test]
    fn batch_preserves_order_and_cardinality()
    {
        let ex = ContextExtractor::new(provider(&[("a.js", "a();\nb();\n".to_string())]), 100);
        let locs = vec![
            SourceLocation::new("a.js", 2, 0),
            SourceLocation::new("gone.js", 1, 0),
            SourceLocation::new("a.js", 1, 0),
        ];
        let refs = ex.extract_multiple_contexts(&locs, ContextDepth::Snippet);
        assert_eq!(refs.len(), 3);
        for (r, l) in refs
            .iter()
            .zip(&locs)
        {
            assert_eq!(&r.location, l);
        }
        assert_eq!(refs[1].context, "");
    }

    #[test]
    fn zero_max_lines_is_clamped()
    {
        let ex = ContextExtractor::new(provider(&[]), 0);
        assert_eq!(ex.max_lines(), 1);
    }
}

//! Filepath: src/core/analyze.rs
//! Analysis orchestrator.
//!
//! For a fixed file list: load every file (read, parse, memoize) on a
//! rayon pool, find call sites per file, concatenate in file order and
//! extract context for the whole list. Unreadable or unparseable files
//! are logged and contribute nothing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::core::context::{ContextExtractor, DEFAULT_MAX_LINES, SourceProvider};
use crate::core::error::SourceError;
use crate::core::model::{AnalysisResult, BatchAnalysis, ContextDepth, SourceLocation};
use crate::core::references::CallTarget;
use crate::core::source::{ParserRegistry, SourceFile};
use crate::infra::cache::{Fingerprint, SourceCache};

/// Per-analyzer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerOptions
{
    /// Depth every reference is extracted at
    pub depth: ContextDepth,

    /// LOGIC line ceiling
    pub max_lines: usize,
}

impl Default for AnalyzerOptions
{
    fn default() -> Self
    {
        Self { depth: ContextDepth::default(), max_lines: DEFAULT_MAX_LINES }
    }
}

/// Reads and parses files, going through the injected cache
pub struct SourceLoader
{
    registry: ParserRegistry,
    cache: Arc<dyn SourceCache>,
}

impl SourceLoader
{
    pub fn new(
        registry: ParserRegistry,
        cache: Arc<dyn SourceCache>,
    ) -> Self
    {
        Self { registry, cache }
    }

    /// Cached source when still fresh, else read and parse
    pub fn load(
        &self,
        path: &Path,
    ) -> Result<Arc<SourceFile>, SourceError>
    {
        // Metadata failure means the read below fails too
        let fingerprint = Fingerprint::of(path).ok();

        if let Some(fp) = &fingerprint
            && let Some(hit) = self
                .cache
                .get(path, fp)
        {
            debug!(path = %path.display(), "source cache hit");
            return Ok(hit);
        }

        match SourceFile::load(path, &self.registry)
        {
            Ok(source) =>
            {
                let source = Arc::new(source);
                if let Some(fp) = fingerprint
                {
                    self.cache
                        .set(path, fp, Arc::clone(&source));
                }
                Ok(source)
            }
            Err(e) =>
            {
                // Never keep serving a previous version of a broken file
                self.cache
                    .invalidate(path);
                Err(e)
            }
        }
    }
}

/// Sources loaded during one analysis, keyed by path
#[derive(Debug, Default, Clone)]
pub struct SourceSet
{
    files: HashMap<PathBuf, Arc<SourceFile>>,
}

impl SourceSet
{
    pub fn insert(
        &mut self,
        source: Arc<SourceFile>,
    )
    {
        self.files
            .insert(
                source
                    .path()
                    .to_path_buf(),
                source,
            );
    }

    pub fn len(&self) -> usize
    {
        self.files
            .len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.files
            .is_empty()
    }
}

impl SourceProvider for SourceSet
{
    fn source(
        &self,
        path: &Path,
    ) -> Option<Arc<SourceFile>>
    {
        self.files
            .get(path)
            .cloned()
    }
}

/// Finds and contextualizes call sites across a discovered file list
pub struct Analyzer
{
    files: Vec<PathBuf>,
    options: AnalyzerOptions,
    loader: SourceLoader,
}

impl Analyzer
{
    /// `files` is trusted as-is and analyzed in the given order
    pub fn new(
        files: Vec<PathBuf>,
        options: AnalyzerOptions,
        cache: Arc<dyn SourceCache>,
    ) -> anyhow::Result<Self>
    {
        let registry = ParserRegistry::new()?;

        Ok(Self { files, options, loader: SourceLoader::new(registry, cache) })
    }

    /// All references to `function_name`; never fails
    #[instrument(skip(self), fields(files = self.files.len()))]
    pub fn analyze(
        &self,
        function_name: &str,
    ) -> AnalysisResult
    {
        let sources = self.load_sources();
        self.analyze_sources(&sources, function_name)
    }

    /// One analysis per distinct name, in caller order
    #[instrument(skip_all, fields(files = self.files.len()))]
    pub fn analyze_many<I, S>(
        &self,
        names: I,
    ) -> BatchAnalysis
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        // Load once; every name sees the same parsed files
        let sources = self.load_sources();

        let mut results = IndexMap::new();
        for name in names
        {
            let name = name.as_ref();
            if results.contains_key(name)
            {
                continue;
            }
            let result = self.analyze_sources(&sources, name);
            results.insert(name.to_string(), result);
        }

        BatchAnalysis::new(results)
    }

    /// Load every file in parallel, keeping file order and skipping failures
    fn load_sources(&self) -> Vec<Arc<SourceFile>>
    {
        let loaded: Vec<Arc<SourceFile>> = self
            .files
            .par_iter()
            .filter_map(|path| match self.loader.load(path)
            {
                Ok(source) => Some(source),
                Err(e) =>
                {
                    warn!(path = %e.path().display(), error = %display_chain(&e), "skipping file");
                    None
                }
            })
            .collect();

        debug!(loaded = loaded.len(), skipped = self.files.len() - loaded.len(), "sources loaded");
        loaded
    }

    fn analyze_sources(
        &self,
        sources: &[Arc<SourceFile>],
        function_name: &str,
    ) -> AnalysisResult
    {
        let target = match CallTarget::new(function_name)
        {
            Ok(target) => target,
            Err(e) =>
            {
                warn!(name = function_name, error = %e, "invalid function name");
                return AnalysisResult::empty(function_name);
            }
        };

        // Per-file reference finding, merged in file order
        let per_file: Vec<(Arc<SourceFile>, Vec<SourceLocation>)> = sources
            .par_iter()
            .map(|source| (Arc::clone(source), source.find_references(&target)))
            .collect();

        let mut set = SourceSet::default();
        let mut locations = Vec::new();
        for (source, found) in per_file
        {
            if found.is_empty()
            {
                continue;
            }
            locations.extend(found);
            set.insert(source);
        }

        debug!(name = function_name, matches = locations.len(), files = set.len(), "references found");

        let extractor = ContextExtractor::new(&set, self.options.max_lines);
        let references = extractor.extract_multiple_contexts(&locations, self.options.depth);

        AnalysisResult::new(function_name, references)
    }
}

/// Error with its source chain, joined by ": "
fn display_chain(e: &dyn std::error::Error) -> String
{
    let mut out = e.to_string();
    let mut cur = e.source();
    while let Some(inner) = cur
    {
        out.push_str(": ");
        out.push_str(&inner.to_string());
        cur = inner.source();
    }
    out
}

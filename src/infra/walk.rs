//! Filepath: src/infra/walk.rs
//! Gitignore-aware source discovery.
//! - Respects .gitignore, .git/info/exclude, and global gitignore
//! - Include globs select candidate files
//! - Exclude globs prune directories early and filter files late
//! - Deterministic ordering for stable output and tests
//!
//! Backed by ripgrep's `ignore` crate and `globset`. Patterns match on
//! paths relative to the walk root.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};
use tracing::debug;

use crate::core::language::detect_language_family;

/// Source extensions of both analyzable families
pub const DEFAULT_INCLUDE: &[&str] = &["**/*.{js,jsx,mjs,cjs,ts,tsx,mts,cts,py,pyw,pyi}"];

/// Build output, dependencies and VCS metadata
pub const DEFAULT_EXCLUDE: &[&str] = &[
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/coverage/**",
    "**/.git/**",
    "**/target/**",
    "**/__pycache__/**",
    "**/.venv/**",
    "**/venv/**",
    "**/*.min.js",
];

/// Gitignore-aware walker with include and exclude globs.
/// Exclude globs are applied in two places:
///   1) Early: prune directories during traversal (filter_entry).
///   2) Late: filter out files that still slipped through.
pub struct FileWalker
{
    /// Files must match one of these; None accepts every file
    include_patterns: Option<GlobSet>,

    /// Files matching any of these are dropped
    ignore_patterns: GlobSet,

    /// Directory forms of `dir/**` excludes, used for pruning
    ignore_dirs: GlobSet,

    /// Follow symbolic links; default false
    follow_symlinks: bool,
}

impl FileWalker
{
    /// Build a walker with exclude patterns (e.g., "**/target/**",
    /// "**/*.min.js").
    pub fn new(excludes: &[String]) -> Result<Self>
    {
        let mut files = GlobSetBuilder::new();
        let mut dirs = GlobSetBuilder::new();

        for pattern in excludes
        {
            files.add(Glob::new(pattern).with_context(|| format!("invalid exclude glob `{pattern}`"))?);

            // `x/**` also names the directory `x` itself
            if let Some(dir) = pattern.strip_suffix("/**")
                && !dir.is_empty()
            {
                dirs.add(Glob::new(dir).with_context(|| format!("invalid exclude glob `{pattern}`"))?);
            }
        }

        Ok(Self {
            include_patterns: None,
            ignore_patterns: files.build()?,
            ignore_dirs: dirs.build()?,
            follow_symlinks: false,
        })
    }

    /// Restrict files to those matching `includes`; empty keeps all.
    pub fn with_includes(
        mut self,
        includes: &[String],
    ) -> Result<Self>
    {
        if includes.is_empty()
        {
            self.include_patterns = None;
            return Ok(self);
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in includes
        {
            builder.add(Glob::new(pattern).with_context(|| format!("invalid include glob `{pattern}`"))?);
        }
        self.include_patterns = Some(builder.build()?);

        Ok(self)
    }

    /// Follow or skip symbolic links (default false).
    pub fn with_follow_symlinks(
        mut self,
        follow: bool,
    ) -> Self
    {
        self.follow_symlinks = follow;
        self
    }

    /// Internal: construct a configured WalkBuilder for `root`.
    fn build_walk(
        &self,
        root: &Path,
    ) -> WalkBuilder
    {
        let mut b = WalkBuilder::new(root);

        // Dotfiles are walked; `.git` is pruned by the default excludes
        b.hidden(false);

        // Respect .ignore/.gitignore/.git/info/exclude and global gitignore
        b.git_ignore(true);
        b.git_global(true);
        b.git_exclude(true);
        b.follow_links(self.follow_symlinks);

        // Early directory pruning on root-relative paths
        let dirs = self
            .ignore_dirs
            .clone();
        let root_owned = root.to_path_buf();
        b.filter_entry(move |ent: &DirEntry| {
            let is_dir = ent
                .file_type()
                .is_some_and(|ft| ft.is_dir());

            if !is_dir
            {
                return true;
            }

            let rel = ent
                .path()
                .strip_prefix(&root_owned)
                .unwrap_or(ent.path());
            rel.as_os_str()
                .is_empty()
                || !dirs.is_match(rel)
        });

        b
    }

    /// Traverse files under `root`, respecting ignore rules and globs.
    /// Returns a **sorted** list of file paths for determinism.
    pub fn walk_files<P: AsRef<Path>>(
        &self,
        root: P,
    ) -> Vec<PathBuf>
    {
        let root_path = root.as_ref();
        let walker = self
            .build_walk(root_path)
            .build();

        let mut out: Vec<PathBuf> = walker
            // Drop entries with IO errors
            .filter_map(|res| {
                res.map_err(|e| debug!(error = %e, "walk entry skipped"))
                    .ok()
            })
            // Keep only regular files
            .filter(|entry| {
                entry
                    .file_type()
                    .is_some_and(|ft| ft.is_file())
            })
            .map(|entry| entry.into_path())
            // Late file-level filtering using the RELATIVE path
            .filter(|abs| {
                let rel = abs
                    .strip_prefix(root_path)
                    .unwrap_or(abs);
                let included = self
                    .include_patterns
                    .as_ref()
                    .is_none_or(|set| set.is_match(rel));
                included
                    && !self
                        .ignore_patterns
                        .is_match(rel)
            })
            .collect();

        // Deterministic order (stable CLI & tests)
        out.sort();

        out
    }
}

/// Ordered list of analyzable files under `root`.
/// Fails when `root` is missing or not a directory; unsupported
/// extensions are dropped even if an include glob matched them.
pub fn discover_files(
    root: &Path,
    include: &[String],
    exclude: &[String],
) -> Result<Vec<PathBuf>>
{
    if !root.exists()
    {
        bail!("Root directory does not exist: {}", root.display());
    }
    if !root.is_dir()
    {
        bail!("Root path is not a directory: {}", root.display());
    }

    let walker = FileWalker::new(exclude)?.with_includes(include)?;
    let files: Vec<PathBuf> = walker
        .walk_files(root)
        .into_iter()
        .filter(|p| detect_language_family(p).is_supported())
        .collect();

    debug!(root = %root.display(), files = files.len(), "discovered files");
    Ok(files)
}

/// Default include globs as owned strings
pub fn default_include() -> Vec<String>
{
    DEFAULT_INCLUDE
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Default exclude globs as owned strings
pub fn default_exclude() -> Vec<String>
{
    DEFAULT_EXCLUDE
        .iter()
        .map(|s| s.to_string())
        .collect()
}

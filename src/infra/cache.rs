//! Filepath: src/infra/cache.rs
//! Parsed-source memoization, injected into the analyzer.
//!
//! Entries are keyed by path and validated against a [`Fingerprint`]
//! (size + modification time); a stale fingerprint is a miss. The
//! cache only saves work: every lookup can miss without changing any
//! analysis output.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use moka::sync::Cache;

use crate::core::source::SourceFile;

/// Default number of cached files
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// File identity used to detect stale entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint
{
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl Fingerprint
{
    /// Read the fingerprint from file metadata
    pub fn of(path: &Path) -> std::io::Result<Self>
    {
        let meta = std::fs::metadata(path)?;

        // Some platforms cannot report mtime; size alone still helps
        Ok(Self { size: meta.len(), modified: meta.modified().ok() })
    }
}

/// Memoization service for parsed sources
pub trait SourceCache: Send + Sync
{
    /// Cached source when present and its fingerprint still matches
    fn get(
        &self,
        path: &Path,
        fingerprint: &Fingerprint,
    ) -> Option<Arc<SourceFile>>;

    /// Store a freshly parsed source
    fn set(
        &self,
        path: &Path,
        fingerprint: Fingerprint,
        source: Arc<SourceFile>,
    );

    /// Drop any entry for `path`
    fn invalidate(
        &self,
        path: &Path,
    );
}

/// Cache that never stores anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSourceCache;

impl SourceCache for NoopSourceCache
{
    fn get(
        &self,
        _path: &Path,
        _fingerprint: &Fingerprint,
    ) -> Option<Arc<SourceFile>>
    {
        None
    }

    fn set(
        &self,
        _path: &Path,
        _fingerprint: Fingerprint,
        _source: Arc<SourceFile>,
    )
    {
    }

    fn invalidate(
        &self,
        _path: &Path,
    )
    {
    }
}

/// Value stored per path
#[derive(Clone)]
struct CachedSource
{
    fingerprint: Fingerprint,
    source: Arc<SourceFile>,
}

/// Bounded in-memory cache backed by moka
#[derive(Clone)]
pub struct MokaSourceCache
{
    cache: Cache<PathBuf, CachedSource>,
}

impl MokaSourceCache
{
    /// Cache holding at most `max_entries` files
    pub fn new(max_entries: u64) -> Self
    {
        Self { cache: Cache::new(max_entries) }
    }

    /// Approximate number of entries
    pub fn entry_count(&self) -> u64
    {
        // Pending inserts are applied lazily; flush before counting
        self.cache
            .run_pending_tasks();
        self.cache
            .entry_count()
    }
}

impl Default for MokaSourceCache
{
    fn default() -> Self
    {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl SourceCache for MokaSourceCache
{
    fn get(
        &self,
        path: &Path,
        fingerprint: &Fingerprint,
    ) -> Option<Arc<SourceFile>>
    {
        self.cache
            .get(path)
            .filter(|hit| hit.fingerprint == *fingerprint)
            .map(|hit| hit.source)
    }

    fn set(
        &self,
        path: &Path,
        fingerprint: Fingerprint,
        source: Arc<SourceFile>,
    )
    {
        self.cache
            .insert(path.to_path_buf(), CachedSource { fingerprint, source });
    }

    fn invalidate(
        &self,
        path: &Path,
    )
    {
        self.cache
            .invalidate(path);
    }
}

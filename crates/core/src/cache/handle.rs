//! Shared, lazily-initialized access to the cache database.
//!
//! All loaders within a session share one store handle. The first access
//! runs the open; callers arriving while the open is in flight await the
//! same initialization rather than racing separate opens.

use super::connection::CacheDb;
use crate::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Lazily-initialized, session-wide handle to the cache database.
///
/// Cloning is cheap; all clones resolve to the same underlying connection
/// once the open has completed.
#[derive(Clone, Debug)]
pub struct SharedCache {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    path: PathBuf,
    cell: OnceCell<CacheDb>,
}

impl SharedCache {
    /// Create a handle for a database at the given path without opening it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { inner: Arc::new(Inner { path: path.into(), cell: OnceCell::new() }) }
    }

    /// Create a handle over an already-open database.
    pub fn preopened(db: CacheDb) -> Self {
        Self { inner: Arc::new(Inner { path: PathBuf::new(), cell: OnceCell::new_with(Some(db)) }) }
    }

    /// Get the database, opening it on first use.
    ///
    /// Concurrent callers before the open completes all await the same
    /// initialization. A failed open leaves the handle uninitialized, so a
    /// later access attempts a fresh open; the error is returned to the
    /// caller whose access ran the open.
    pub async fn get(&self) -> Result<&CacheDb, Error> {
        self.inner.cell.get_or_try_init(|| CacheDb::open(&self.inner.path)).await
    }

    /// Path of the backing database file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lazy_open_creates_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.sqlite");
        let cache = SharedCache::new(&path);
        assert!(!path.exists());

        let first = cache.get().await.unwrap() as *const CacheDb;
        assert!(path.exists());
        let second = cache.get().await.unwrap() as *const CacheDb;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_concurrent_gets_share_one_initialization() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SharedCache::new(dir.path().join("telemetry.sqlite"));

        let (a, b) = tokio::join!(cache.get(), cache.get());
        assert!(std::ptr::eq(a.unwrap(), b.unwrap()));
    }

    #[tokio::test]
    async fn test_clones_resolve_to_same_store() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SharedCache::new(dir.path().join("telemetry.sqlite"));
        let clone = cache.clone();

        let table = crate::ParsedTable { headers: vec!["a".to_string()], rows: vec![vec!["1".to_string()]] };
        cache.get().await.unwrap().put_parsed("x.csv", &table).await.unwrap();

        let seen = clone.get().await.unwrap().get_parsed("x.csv").await.unwrap();
        assert_eq!(seen, Some(table));
    }

    #[tokio::test]
    async fn test_failed_open_surfaces_then_allows_retry() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("missing");
        let cache = SharedCache::new(nested.join("telemetry.sqlite"));

        assert!(cache.get().await.is_err());

        std::fs::create_dir_all(&nested).unwrap();
        assert!(cache.get().await.is_ok());
    }
}

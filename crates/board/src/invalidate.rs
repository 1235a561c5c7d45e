//! Cache invalidation trigger.
//!
//! The refresh path: clear the durable store, arm the one-shot bust flag,
//! request a new session cycle. The clear runs off the trigger's path and
//! the cycle restart never waits for it, so a wedged store cannot block a
//! refresh.

use std::sync::Arc;

use pitwall_core::{BustFlag, SharedCache};

use crate::session::ReloadSignal;

/// Triggers a full cache invalidation and session restart.
pub struct Invalidator {
    cache: SharedCache,
    flag: Arc<BustFlag>,
    reload: ReloadSignal,
}

impl Invalidator {
    pub fn new(cache: SharedCache, flag: Arc<BustFlag>, reload: ReloadSignal) -> Self {
        Self { cache, flag, reload }
    }

    /// Arm the bust flag and request a restart, clearing the store best-effort.
    ///
    /// The reload request goes out unconditionally; a failed clear or a
    /// failed flag write degrades to a plain restart.
    pub fn trigger(&self) {
        let cache = self.cache.clone();
        tokio::spawn(async move {
            match cache.get().await {
                Ok(db) => match db.clear_parsed().await {
                    Ok(cleared) => tracing::debug!("cleared {} cached tables", cleared),
                    Err(e) => tracing::warn!("failed to clear parsed cache: {}", e),
                },
                Err(e) => tracing::warn!("skipping cache clear: {}", e),
            }
        });

        self.flag.arm();
        self.reload.request();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitwall_core::{CacheDb, ParsedTable};
    use std::time::Duration;

    fn table() -> ParsedTable {
        ParsedTable { headers: vec!["driver".into()], rows: vec![vec!["VER".into()]] }
    }

    #[tokio::test]
    async fn test_trigger_arms_flag_clears_store_and_requests_reload() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SharedCache::preopened(CacheDb::open_in_memory().await.unwrap());
        let flag = Arc::new(BustFlag::new(dir.path().join("flag")));
        let reload = ReloadSignal::new();

        let db = cache.get().await.unwrap();
        db.put_parsed("lap_times.csv", &table()).await.unwrap();
        db.put_parsed("pit_stops.csv", &table()).await.unwrap();

        let invalidator = Invalidator::new(cache.clone(), Arc::clone(&flag), reload.clone());
        invalidator.trigger();

        // The flag is armed synchronously with a parseable token.
        let token = std::fs::read_to_string(flag.path()).unwrap();
        assert!(token.parse::<i64>().unwrap() > 0);

        // The reload request is already pending.
        tokio::time::timeout(Duration::from_secs(1), reload.requested()).await.unwrap();

        // The clear lands eventually.
        for _ in 0..100 {
            if cache.get().await.unwrap().parsed_len().await.unwrap() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("store was not cleared within 1s");
    }

    #[tokio::test]
    async fn test_trigger_with_unavailable_store_still_arms_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SharedCache::new("/nonexistent/pitwall/cache.sqlite");
        let flag = Arc::new(BustFlag::new(dir.path().join("flag")));
        let reload = ReloadSignal::new();

        let invalidator = Invalidator::new(cache, Arc::clone(&flag), reload.clone());
        invalidator.trigger();

        assert!(flag.path().exists());
        tokio::time::timeout(Duration::from_secs(1), reload.requested()).await.unwrap();
    }
}

//! Session-cycle wiring.
//!
//! A session cycle is one pass of the board: wire the durable cache handle,
//! the one-shot bust flag and the fetch client, load the configured
//! resources, then wait for a reload request. Constructing a fresh `Session`
//! is what resets the flag's memoized read state; the SQLite store and the
//! flag file persist across cycles.

use std::sync::Arc;

use pitwall_client::{Fetch, FetchClient, FetchConfig};
use pitwall_core::{AppConfig, BustFlag, Error, SharedCache};
use url::Url;

use crate::invalidate::Invalidator;
use crate::loader::DataLoader;

/// Signal that a new session cycle should begin.
///
/// A request made while nobody is waiting is remembered, so a trigger fired
/// between cycles still starts the next one promptly.
#[derive(Clone, Debug, Default)]
pub struct ReloadSignal {
    notify: Arc<tokio::sync::Notify>,
}

impl ReloadSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a new session cycle.
    pub fn request(&self) {
        self.notify.notify_one();
    }

    /// Wait until a new cycle is requested.
    pub async fn requested(&self) {
        self.notify.notified().await;
    }
}

/// One session cycle's wiring.
pub struct Session {
    cache: SharedCache,
    flag: Arc<BustFlag>,
    fetcher: Arc<dyn Fetch>,
    base_url: Url,
    reload: ReloadSignal,
}

impl Session {
    /// Wire a session cycle from configuration.
    pub fn new(config: &AppConfig, reload: ReloadSignal) -> Result<Self, Error> {
        let base_url = Url::parse(&config.base_url_normalized())
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let fetcher = FetchClient::new(FetchConfig {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        })?;

        Ok(Self {
            cache: SharedCache::new(&config.db_path),
            flag: Arc::new(BustFlag::new(config.bust_flag_path())),
            fetcher: Arc::new(fetcher),
            base_url,
            reload,
        })
    }

    /// Open the durable store eagerly, surfacing open errors.
    ///
    /// Loads degrade to fetches without it, so a failure here is worth a
    /// warning but not a crash.
    pub async fn init_cache(&self) -> Result<(), Error> {
        self.cache.get().await?;
        Ok(())
    }

    /// Loader for this cycle.
    pub fn loader(&self) -> DataLoader {
        DataLoader::new(
            self.cache.clone(),
            Arc::clone(&self.flag),
            Arc::clone(&self.fetcher),
            self.base_url.clone(),
        )
    }

    /// Invalidation trigger for this cycle.
    pub fn invalidator(&self) -> Invalidator {
        Invalidator::new(self.cache.clone(), Arc::clone(&self.flag), self.reload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_reload_request_is_remembered() {
        let reload = ReloadSignal::new();
        reload.request();

        tokio::time::timeout(Duration::from_secs(1), reload.requested())
            .await
            .expect("stored request should resolve immediately");
    }

    #[tokio::test]
    async fn test_reload_request_wakes_waiter() {
        let reload = ReloadSignal::new();
        let waiter = reload.clone();

        let handle = tokio::spawn(async move {
            waiter.requested().await;
        });

        tokio::task::yield_now().await;
        reload.request();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should be woken")
            .unwrap();
    }

    #[tokio::test]
    async fn test_session_new_wires_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            db_path: dir.path().join("cache.sqlite"),
            session_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let session = Session::new(&config, ReloadSignal::new()).unwrap();
        assert!(session.init_cache().await.is_ok());

        let _ = session.loader();
        let _ = session.invalidator();
    }

    #[tokio::test]
    async fn test_session_init_cache_surfaces_open_error() {
        let config = AppConfig {
            db_path: "/nonexistent/pitwall/cache.sqlite".into(),
            ..Default::default()
        };

        let session = Session::new(&config, ReloadSignal::new()).unwrap();
        assert!(session.init_cache().await.is_err());
    }
}

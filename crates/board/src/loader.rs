//! Cached resource loading.
//!
//! One load walks the two cache tiers in order. The one-shot bust flag
//! decides up front whether the durable store may answer at all; a pending
//! token skips the store read and rides the fetch URL as a version marker.
//! Freshly parsed tables are written back to the store off the caller's
//! path, and every store failure degrades to a plain fetch.

use std::sync::Arc;

use pitwall_client::{Fetch, ParseConfig, parse_table, resolve};
use pitwall_core::{BustFlag, Error, ParsedTable, SharedCache};
use url::Url;

/// Loads named resources through the two-tier cache.
pub struct DataLoader {
    cache: SharedCache,
    flag: Arc<BustFlag>,
    fetcher: Arc<dyn Fetch>,
    base_url: Url,
}

impl DataLoader {
    pub fn new(cache: SharedCache, flag: Arc<BustFlag>, fetcher: Arc<dyn Fetch>, base_url: Url) -> Self {
        Self { cache, flag, fetcher, base_url }
    }

    /// Load a named resource, preferring the durable cache.
    ///
    /// Resolves exactly once per call: with the cached table, with a freshly
    /// fetched and parsed one, or with the first error on the fetch path.
    /// Cache population never blocks the caller and never fails a load.
    pub async fn load(&self, name: &str, config: &ParseConfig) -> Result<ParsedTable, Error> {
        let token = self.flag.consume();

        if token.is_none()
            && let Some(table) = self.cached(name).await
        {
            tracing::debug!("cache hit for {}", name);
            return Ok(table);
        }

        let url = resolve(&self.base_url, name, token.as_deref()).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let response = self.fetcher.fetch(&url).await?;
        let table = parse_table(&response.bytes, config)?;

        self.store(name, &table);

        Ok(table)
    }

    /// Cache read that degrades to a miss on any store failure.
    async fn cached(&self, name: &str) -> Option<ParsedTable> {
        let db = match self.cache.get().await {
            Ok(db) => db,
            Err(e) => {
                tracing::warn!("cache unavailable, falling back to fetch: {}", e);
                return None;
            }
        };

        match db.get_parsed(name).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("cache read failed for {}, falling back to fetch: {}", name, e);
                None
            }
        }
    }

    /// Write the parsed table to the store without blocking the caller.
    fn store(&self, name: &str, table: &ParsedTable) {
        let cache = self.cache.clone();
        let name = name.to_string();
        let table = table.clone();

        tokio::spawn(async move {
            let db = match cache.get().await {
                Ok(db) => db,
                Err(e) => {
                    tracing::warn!("skipping cache write for {}: {}", name, e);
                    return;
                }
            };

            if let Err(e) = db.put_parsed(&name, &table).await {
                tracing::warn!("failed to cache {}: {}", name, e);
            }
        });
    }
}

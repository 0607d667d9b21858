//! Poster resolution: serve fresh entries, fetch and store everything else

use crate::error::{CacheError, Result};
use crate::fetcher::ImageFetcher;
use crate::key::{CacheKey, PosterSize};
use crate::store;
use crate::sweep::PosterStore;
use crate::types::{
    BudgetReport, CacheStats, CacheUsage, EntryMetadata, ExpiryReport, PosterCacheConfig,
    PosterLocator, Resolution,
};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, error, info, warn};

/// Disk cache of remotely hosted posters.
///
/// There is no locking: concurrent misses on one key each fetch and the last
/// writer wins, which is harmless because the remote content is the same.
pub struct PosterCache {
    config: PosterCacheConfig,
    store: PosterStore,
    fetcher: Arc<dyn ImageFetcher>,
    hits: AtomicU64,
    misses: AtomicU64,
    fetch_failures: AtomicU64,
}

impl PosterCache {
    pub fn new(config: PosterCacheConfig, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            store: PosterStore::from_config(&config),
            config,
            fetcher,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
        }
    }

    /// Ensure the cache root exists
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.config.cache_dir)
            .await
            .map_err(|e| CacheError::storage(&self.config.cache_dir, e))?;
        info!(cache_dir = ?self.config.cache_dir, "Poster cache initialized");
        Ok(())
    }

    pub fn cache_dir(&self) -> &Path {
        &self.config.cache_dir
    }

    /// Fetcher-free handle on the same cache root, for maintenance
    pub fn store(&self) -> &PosterStore {
        &self.store
    }

    /// Public locator for a key, without touching disk or network
    pub fn locator(&self, key: &CacheKey) -> PosterLocator {
        PosterLocator {
            url: format!(
                "{}/{}",
                self.config.public_url.trim_end_matches('/'),
                key.relative()
            ),
            path: key.payload_path(&self.config.cache_dir),
        }
    }

    /// Locator for a remote path, `None` when there is no usable path.
    ///
    /// Used where pages only need a URL; the payload is resolved when that
    /// URL is requested.
    pub fn locator_for(&self, remote_path: Option<&str>, size: PosterSize) -> Option<PosterLocator> {
        let remote_path = remote_path.filter(|p| !p.is_empty())?;
        CacheKey::new(size, remote_path)
            .ok()
            .map(|key| self.locator(&key))
    }

    /// Return a locally servable locator for a remote poster.
    ///
    /// Fresh entries (cached less than `max_age` ago) are served without a
    /// network call and have their access time bumped. Anything else is
    /// fetched once and written over whatever was cached before. Failures
    /// never propagate; they come back as [`Resolution::NoImage`] or
    /// [`Resolution::Unavailable`].
    pub async fn resolve(
        &self,
        remote_path: Option<&str>,
        size: PosterSize,
        max_age: Duration,
    ) -> Resolution {
        let Some(remote_path) = remote_path.filter(|p| !p.is_empty()) else {
            return Resolution::NoImage;
        };

        let key = match CacheKey::new(size, remote_path) {
            Ok(key) => key,
            Err(e) => {
                warn!(error = %e, "Refusing to cache poster");
                return Resolution::NoImage;
            }
        };

        let now = Utc::now();
        if let Some(locator) = self.lookup(&key, max_age, now).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Poster cache hit");
            return Resolution::Hit(locator);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        self.fetch_and_store(&key, now).await
    }

    /// Fresh entry for `key`, bumping its access time
    async fn lookup(
        &self,
        key: &CacheKey,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Option<PosterLocator> {
        let root = &self.config.cache_dir;
        let sidecar = key.sidecar_path(root);

        let mut metadata = match store::read_metadata(&sidecar).await {
            Ok(Some(metadata)) => metadata,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Unreadable poster metadata, refetching");
                return None;
            }
        };

        let locator = self.locator(key);
        if store::payload_size(&locator.path).await.is_none() {
            debug!(key = %key, "Metadata without payload, refetching");
            return None;
        }

        // Timestamps from the future count as age zero
        let age = (now - metadata.cached_date).to_std().unwrap_or(Duration::ZERO);
        if age >= max_age {
            debug!(key = %key, age_secs = age.as_secs(), "Poster cache entry stale");
            return None;
        }

        metadata.touch(now);
        if let Err(e) = store::write_metadata(&sidecar, &metadata).await {
            warn!(key = %key, error = %e, "Failed to record poster access");
        }

        Some(locator)
    }

    async fn fetch_and_store(&self, key: &CacheKey, now: DateTime<Utc>) -> Resolution {
        let data = match self.fetcher.fetch(key).await {
            Ok(data) => data,
            Err(e) => {
                self.fetch_failures.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, error = %e, "Failed to download poster");
                return Resolution::Unavailable(e);
            }
        };

        let root = &self.config.cache_dir;
        let locator = self.locator(key);

        // Metadata is only ever written for bytes that made it to disk
        if let Err(e) = store::write_atomic(&locator.path, &data).await {
            error!(key = %key, error = %e, "Failed to store poster");
            return Resolution::Unavailable(e);
        }

        let metadata = EntryMetadata::fresh(
            &self.fetcher.source_url(key),
            key.size().as_str(),
            data.len() as u64,
            now,
        );
        if let Err(e) = store::write_metadata(&key.sidecar_path(root), &metadata).await {
            warn!(key = %key, error = %e, "Failed to write poster metadata");
        }

        info!(key = %key, size = data.len(), "Cached poster");
        Resolution::Fetched(locator)
    }

    /// Entry count and payload bytes currently on disk
    pub async fn usage(&self) -> CacheUsage {
        self.store.usage().await
    }

    /// See [`PosterStore::enforce_size_budget`]
    pub async fn enforce_size_budget(&self, max_total_bytes: u64) -> BudgetReport {
        self.store.enforce_size_budget(max_total_bytes).await
    }

    /// See [`PosterStore::expire_older_than`]
    pub async fn expire_older_than(&self, max_age: Duration, dry_run: bool) -> ExpiryReport {
        self.store.expire_older_than(max_age, dry_run).await
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
        }
    }
}

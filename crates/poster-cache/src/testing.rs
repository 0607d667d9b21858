//! Shared test helpers

use crate::error::{CacheError, Result};
use crate::fetcher::ImageFetcher;
use crate::key::CacheKey;
use crate::store;
use crate::types::{EntryMetadata, PosterCacheConfig};
use crate::PosterCache;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Fetcher double that serves fixed bytes (or always fails) and counts calls
pub(crate) struct StubFetcher {
    body: Option<Vec<u8>>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn serving(body: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            body: Some(body.to_vec()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            body: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for StubFetcher {
    fn source_url(&self, key: &CacheKey) -> String {
        format!("https://images.test/{}", key.relative())
    }

    async fn fetch(&self, key: &CacheKey) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.body {
            Some(body) => Ok(body.clone()),
            None => Err(CacheError::unavailable(&self.source_url(key), "HTTP 404")),
        }
    }
}

pub(crate) fn cache_with(root: &Path, fetcher: Arc<StubFetcher>) -> PosterCache {
    PosterCache::new(
        PosterCacheConfig {
            cache_dir: root.to_path_buf(),
            public_url: "/media/posters/".to_string(),
        },
        fetcher,
    )
}

/// Write a payload at `relative` (e.g. `w500/a.jpg`) with a matching sidecar
pub(crate) async fn seed_entry(
    root: &Path,
    relative: &str,
    body: &[u8],
    cached_date: DateTime<Utc>,
    last_accessed: DateTime<Utc>,
) {
    let payload = root.join(relative);
    store::write_atomic(&payload, body).await.unwrap();

    let size = relative.split('/').next().unwrap_or_default();
    let metadata = EntryMetadata {
        cached_date,
        last_accessed: Some(last_accessed),
        original_url: format!("https://images.test/{}", relative),
        size: size.to_string(),
        file_size: body.len() as u64,
    };
    let sidecar = root.join(format!("{}.meta", relative));
    store::write_metadata(&sidecar, &metadata).await.unwrap();
}

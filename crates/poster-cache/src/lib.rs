//! Disk cache for remotely hosted poster images
//!
//! Posters are fetched from the image host at most once per freshness window
//! and stored under `<cache_dir>/<size>/<remote path>`, with a JSON sidecar
//! (`.meta`) next to each payload recording when it was cached and last read.
//! Two maintenance sweeps keep the cache bounded: age-based expiry and
//! size-budget eviction by least recent access.
//!
//! # Example
//!
//! ```no_run
//! use poster_cache::{HttpImageFetcher, ImageHostConfig, PosterCache, PosterCacheConfig, PosterSize};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = HttpImageFetcher::new(ImageHostConfig::default())?;
//! let cache = PosterCache::new(PosterCacheConfig::default(), Arc::new(fetcher));
//! cache.init().await?;
//!
//! let resolution = cache
//!     .resolve(Some("/abc123.jpg"), PosterSize::W500, Duration::from_secs(14 * 86_400))
//!     .await;
//! if let Some(locator) = resolution.locator() {
//!     println!("serve {}", locator.url);
//! }
//! # Ok(())
//! # }
//! ```

mod cache;
mod error;
mod fetcher;
mod key;
mod store;
mod sweep;
#[cfg(test)]
mod testing;
mod types;

pub use cache::PosterCache;
pub use error::{CacheError, Result};
pub use fetcher::{HttpImageFetcher, ImageFetcher, ImageHostConfig};
pub use key::{CacheKey, PosterSize, SIDECAR_SUFFIX};
pub use sweep::PosterStore;
pub use types::{
    BudgetReport, CacheStats, CacheUsage, EntryMetadata, ExpiredEntry, ExpiryReport,
    PosterCacheConfig, PosterLocator, Resolution,
};

use chrono::{DateTime, Utc};
use poster_cache::{PosterCache, PosterSize};
use std::sync::Arc;
use std::time::Duration;
use tmdb_client::TmdbClient;

/// Shared application state passed to all route handlers
pub struct AppState {
    pub cache: Arc<PosterCache>,
    pub tmdb: TmdbClient,
    /// Entries cached longer ago than this are refetched
    pub poster_max_age: Duration,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(cache: Arc<PosterCache>, tmdb: TmdbClient, poster_max_age: Duration) -> Self {
        Self {
            cache,
            tmdb,
            poster_max_age,
            started_at: Utc::now(),
        }
    }

    /// Public URL of the default-size poster route for a remote path
    pub fn poster_url(&self, remote_path: Option<&str>) -> Option<String> {
        self.cache
            .locator_for(remote_path, PosterSize::default())
            .map(|locator| locator.url)
    }
}

pub type SharedState = Arc<AppState>;

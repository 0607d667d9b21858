use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub cache_dir: PathBuf,
    /// Public prefix posters are served under
    pub media_url: String,
    pub poster_max_age: Duration,
    pub image_base_url: String,
    pub image_fetch_timeout: Duration,
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub cors_origins: Vec<String>,
}

const DAY_SECS: u64 = 24 * 60 * 60;

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let port = var("PORT").and_then(|p| p.parse().ok()).unwrap_or(8000);

        let cache_dir = var("CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./media/posters"));

        let media_url = var("MEDIA_URL").unwrap_or_else(|| "/media/posters".to_string());

        let poster_max_age_days = var("POSTER_MAX_AGE_DAYS")
            .and_then(|d| d.parse::<u64>().ok())
            .unwrap_or(14);

        let image_base_url =
            var("IMAGE_BASE_URL").unwrap_or_else(|| "https://image.tmdb.org/t/p".to_string());

        let image_fetch_timeout_secs = var("IMAGE_FETCH_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);

        let tmdb_api_key = var("TMDB_API_KEY").unwrap_or_default();

        let tmdb_base_url =
            var("TMDB_BASE_URL").unwrap_or_else(|| "https://api.themoviedb.org/3".to_string());

        let cors_origins = var("CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|| vec!["*".to_string()]);

        Self {
            port,
            cache_dir,
            media_url,
            poster_max_age: Duration::from_secs(poster_max_age_days * DAY_SECS),
            image_base_url,
            image_fetch_timeout: Duration::from_secs(image_fetch_timeout_secs),
            tmdb_api_key,
            tmdb_base_url,
            cors_origins,
        }
    }
}

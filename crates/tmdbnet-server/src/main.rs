//! tmdbnet server
//!
//! Serves cached TMDB posters from local disk and exposes the movie and TV
//! browse endpoints as JSON with poster URLs pointing at the local cache.

mod config;
mod error;
mod routes;
mod server;
mod state;

use crate::config::Config;
use crate::error::{Result, ServerError};
use crate::server::{cors_layer, start_server};
use crate::state::{AppState, SharedState};
use poster_cache::{HttpImageFetcher, ImageHostConfig, PosterCache, PosterCacheConfig};
use std::sync::Arc;
use tmdb_client::{TmdbClient, TmdbConfig};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("tmdbnet_server=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    let config = Config::from_env();
    info!(
        port = config.port,
        cache_dir = ?config.cache_dir,
        media_url = %config.media_url,
        poster_max_age_days = config.poster_max_age.as_secs() / 86_400,
        "Starting tmdbnet server"
    );

    let fetcher = HttpImageFetcher::new(ImageHostConfig {
        base_url: config.image_base_url.clone(),
        timeout: config.image_fetch_timeout,
    })
    .map_err(|e| ServerError::Http(Box::new(e)))?;

    let cache = PosterCache::new(
        PosterCacheConfig {
            cache_dir: config.cache_dir.clone(),
            public_url: config.media_url.clone(),
        },
        Arc::new(fetcher),
    );
    cache.init().await?;

    let tmdb = TmdbClient::new(TmdbConfig {
        base_url: config.tmdb_base_url.clone(),
        api_key: config.tmdb_api_key.clone(),
        ..TmdbConfig::default()
    })?;

    let state: SharedState = Arc::new(AppState::new(
        Arc::new(cache),
        tmdb,
        config.poster_max_age,
    ));

    // Start HTTP server (blocking)
    start_server(state, cors_layer(&config.cors_origins), config.port).await?;

    Ok(())
}

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tmdb_client::ConnectionStatus;

use crate::state::SharedState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub cache: CacheHealth,
}

#[derive(Serialize)]
pub struct CacheHealth {
    pub entries: usize,
    pub total_size: u64,
    pub hits: u64,
    pub misses: u64,
    pub fetch_failures: u64,
}

pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let usage = state.cache.usage().await;
    let stats = state.cache.stats();
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        cache: CacheHealth {
            entries: usage.entries,
            total_size: usage.total_size,
            hits: stats.hits,
            misses: stats.misses,
            fetch_failures: stats.fetch_failures,
        },
    })
}

/// Whether the metadata API is reachable with the configured key
pub async fn tmdb_status(State(state): State<SharedState>) -> Json<ConnectionStatus> {
    Json(state.tmdb.test_connection().await)
}

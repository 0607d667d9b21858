//! HTTP router and listener

use axum::http::{header, Method};
use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes;
use crate::state::SharedState;

/// CORS policy for the configured origins; `*` allows any origin
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE])
}

/// Create the HTTP router
pub fn create_router(state: SharedState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/tmdb/status", get(routes::health::tmdb_status))
        // Posters
        .route(
            "/media/posters/{size}/{*path}",
            get(routes::posters::get_poster),
        )
        // Movies - specific routes before the id route
        .route("/api/movies/popular", get(routes::movies::popular))
        .route("/api/movies/search", get(routes::movies::search))
        .route("/api/movies/{id}", get(routes::movies::detail))
        // TV shows
        .route("/api/tv/popular", get(routes::tv::popular))
        .route("/api/tv/search", get(routes::tv::search))
        .route("/api/tv/{id}", get(routes::tv::detail))
        .route("/api/tv/{id}/season/{season}", get(routes::tv::season))
        .route(
            "/api/tv/{id}/season/{season}/episode/{episode}",
            get(routes::tv::episode),
        )
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, cors: CorsLayer, port: u16) -> std::io::Result<()> {
    let router = create_router(state, cors);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

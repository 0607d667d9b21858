//! Error types for the tmdbnet server

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt;

/// Startup failures
#[derive(Debug)]
pub enum ServerError {
    Cache(poster_cache::CacheError),
    Tmdb(tmdb_client::TmdbError),
    Http(Box<dyn std::error::Error + Send + Sync>),
    Io(std::io::Error),
    Config(String),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Cache(err) => write!(f, "Cache error: {}", err),
            ServerError::Tmdb(err) => write!(f, "TMDB client error: {}", err),
            ServerError::Http(err) => write!(f, "HTTP client error: {}", err),
            ServerError::Io(err) => write!(f, "IO error: {}", err),
            ServerError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Cache(err) => Some(err),
            ServerError::Tmdb(err) => Some(err),
            ServerError::Http(err) => Some(err.as_ref()),
            ServerError::Io(err) => Some(err),
            ServerError::Config(_) => None,
        }
    }
}

impl From<poster_cache::CacheError> for ServerError {
    fn from(err: poster_cache::CacheError) -> Self {
        ServerError::Cache(err)
    }
}

impl From<tmdb_client::TmdbError> for ServerError {
    fn from(err: tmdb_client::TmdbError) -> Self {
        ServerError::Tmdb(err)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Io(err)
    }
}

impl From<tracing_subscriber::filter::ParseError> for ServerError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ServerError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

/// Handler error type that converts to HTTP responses
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    /// The metadata API failed for a reason other than a missing resource
    Upstream(tmdb_client::TmdbError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Upstream(e) => {
                tracing::error!(error = %e, "TMDB request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "Failed to fetch data from TMDB".into(),
                )
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

impl From<tmdb_client::TmdbError> for AppError {
    fn from(e: tmdb_client::TmdbError) -> Self {
        if e.is_not_found() {
            AppError::NotFound("Not found".into())
        } else {
            AppError::Upstream(e)
        }
    }
}

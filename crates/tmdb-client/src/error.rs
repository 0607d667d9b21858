//! Error types for the TMDB client

use std::fmt;

/// Errors that can occur when talking to the TMDB API
#[derive(Debug)]
pub enum TmdbError {
    /// HTTP request failed
    Http(reqwest::Error),
    /// Failed to parse a JSON response
    Json(serde_json::Error),
    /// The API answered with a non-2xx status
    Status { status: u16, message: String },
}

impl TmdbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

impl fmt::Display for TmdbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "TMDB HTTP error: {}", e),
            Self::Json(e) => write!(f, "TMDB JSON parse error: {}", e),
            Self::Status { status, message } => {
                write!(f, "TMDB returned status {}: {}", status, message)
            }
        }
    }
}

impl std::error::Error for TmdbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for TmdbError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<serde_json::Error> for TmdbError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Result type for TMDB API operations
pub type Result<T> = std::result::Result<T, TmdbError>;

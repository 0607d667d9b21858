//! Error types for the cache maintenance command

use std::fmt;

#[derive(Debug)]
pub enum CleanCacheError {
    Io(std::io::Error),
    Config(String),
}

impl fmt::Display for CleanCacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanCacheError::Io(err) => write!(f, "IO error: {}", err),
            CleanCacheError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for CleanCacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CleanCacheError::Io(err) => Some(err),
            CleanCacheError::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for CleanCacheError {
    fn from(err: std::io::Error) -> Self {
        CleanCacheError::Io(err)
    }
}

impl From<tracing_subscriber::filter::ParseError> for CleanCacheError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        CleanCacheError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CleanCacheError>;

//! Error types for the poster cache

use std::fmt;
use std::path::PathBuf;

/// Failures inside the poster cache.
///
/// None of these are fatal to a caller of [`crate::PosterCache::resolve`]:
/// they degrade to "no image" there, and to "skip this entry" in the sweeps.
#[derive(Debug)]
pub enum CacheError {
    /// The image host answered with a non-2xx status, or the request failed
    UnavailableSource { url: String, reason: String },
    /// A metadata sidecar could not be read or parsed
    CorruptMetadata { path: PathBuf, reason: String },
    /// A local filesystem operation failed
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The remote path cannot be mapped to a location under the cache root
    InvalidPath(String),
    /// The size label is not one the image host offers
    UnknownSize(String),
}

impl CacheError {
    pub(crate) fn unavailable(url: &str, reason: impl Into<String>) -> Self {
        CacheError::UnavailableSource {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::Storage {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::UnavailableSource { url, reason } => {
                write!(f, "Image source unavailable ({}): {}", url, reason)
            }
            CacheError::CorruptMetadata { path, reason } => {
                write!(f, "Corrupt cache metadata at {}: {}", path.display(), reason)
            }
            CacheError::Storage { path, source } => {
                write!(f, "Storage error at {}: {}", path.display(), source)
            }
            CacheError::InvalidPath(path) => write!(f, "Invalid poster path: {:?}", path),
            CacheError::UnknownSize(size) => write!(f, "Unknown poster size: {}", size),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Storage { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;

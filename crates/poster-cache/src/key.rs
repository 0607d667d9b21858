//! Size variants and cache keys

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Suffix of the JSON metadata file stored next to each payload
pub const SIDECAR_SUFFIX: &str = ".meta";

/// Suffix of in-flight writes; renamed into place once complete
pub(crate) const PARTIAL_SUFFIX: &str = ".part";

/// Image renditions offered by the TMDB image host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PosterSize {
    W92,
    W154,
    W185,
    W342,
    #[default]
    W500,
    W780,
    Original,
}

impl PosterSize {
    pub const ALL: [PosterSize; 7] = [
        Self::W92,
        Self::W154,
        Self::W185,
        Self::W342,
        Self::W500,
        Self::W780,
        Self::Original,
    ];

    /// Label used both in image host URLs and as the cache subdirectory
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::W92 => "w92",
            Self::W154 => "w154",
            Self::W185 => "w185",
            Self::W342 => "w342",
            Self::W500 => "w500",
            Self::W780 => "w780",
            Self::Original => "original",
        }
    }
}

impl fmt::Display for PosterSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PosterSize {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|size| size.as_str() == s)
            .ok_or_else(|| CacheError::UnknownSize(s.to_string()))
    }
}

/// Identifies one cached image: a size variant plus a normalised remote path.
///
/// The remote path mirrors onto the filesystem below the cache root, so
/// construction rejects anything that could escape it or collide with a
/// sidecar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    size: PosterSize,
    path: String,
}

impl CacheKey {
    /// Build a key from a remote path such as `/abc123.jpg`
    pub fn new(size: PosterSize, remote_path: &str) -> Result<Self> {
        let path = remote_path.trim_start_matches('/');

        let invalid = path.is_empty()
            || path.contains('\\')
            || path.contains('\0')
            || path.ends_with(SIDECAR_SUFFIX)
            || path.ends_with(PARTIAL_SUFFIX)
            || path
                .split('/')
                .any(|segment| segment.is_empty() || segment == "." || segment == "..");

        if invalid {
            return Err(CacheError::InvalidPath(remote_path.to_string()));
        }

        Ok(Self {
            size,
            path: path.to_string(),
        })
    }

    pub fn size(&self) -> PosterSize {
        self.size
    }

    /// Remote path without the leading separator
    pub fn path(&self) -> &str {
        &self.path
    }

    /// `<size>/<path>`, the key's position relative to the cache root and to
    /// the public media URL
    pub fn relative(&self) -> String {
        format!("{}/{}", self.size, self.path)
    }

    pub fn payload_path(&self, root: &Path) -> PathBuf {
        let mut path = root.join(self.size.as_str());
        for segment in self.path.split('/') {
            path.push(segment);
        }
        path
    }

    pub fn sidecar_path(&self, root: &Path) -> PathBuf {
        with_suffix(&self.payload_path(root), SIDECAR_SUFFIX)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.size, self.path)
    }
}

/// Append a suffix to the final path component (`a.jpg` -> `a.jpg.meta`)
pub(crate) fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

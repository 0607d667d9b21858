//! Cache types

use crate::error::CacheError;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Where the cache lives and how its payloads are addressed publicly
#[derive(Debug, Clone)]
pub struct PosterCacheConfig {
    /// Root directory holding one subdirectory per size variant
    pub cache_dir: PathBuf,
    /// URL prefix under which `cache_dir` is served
    pub public_url: String,
}

impl Default for PosterCacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./media/posters"),
            public_url: "/media/posters".to_string(),
        }
    }
}

/// Sidecar metadata for a cached payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub cached_date: DateTime<Utc>,
    /// Missing in sidecars written before access tracking existed
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub last_accessed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub original_url: String,
    /// Size variant label
    #[serde(default)]
    pub size: String,
    pub file_size: u64,
}

impl EntryMetadata {
    /// Metadata for a payload fetched at `now`
    pub fn fresh(original_url: &str, size: &str, file_size: u64, now: DateTime<Utc>) -> Self {
        Self {
            cached_date: now,
            last_accessed: Some(now),
            original_url: original_url.to_string(),
            size: size.to_string(),
            file_size,
        }
    }

    /// Timestamp used for least-recently-accessed ordering
    pub fn accessed_at(&self) -> DateTime<Utc> {
        self.last_accessed.unwrap_or(self.cached_date)
    }

    /// Record a read at `now`, never moving access before the cache time
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_accessed = Some(now.max(self.cached_date));
    }
}

/// Accepts RFC 3339 and offset-less ISO-8601 (read as UTC)
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = s.parse::<DateTime<Utc>>() {
        return Some(ts);
    }
    s.parse::<NaiveDateTime>()
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw))),
    }
}

/// A locally servable reference to a cached payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PosterLocator {
    /// Public URL under the configured media prefix
    pub url: String,
    /// Payload location on disk
    pub path: PathBuf,
}

/// Outcome of [`crate::PosterCache::resolve`]
#[derive(Debug)]
pub enum Resolution {
    /// Served from a fresh cache entry without a network call
    Hit(PosterLocator),
    /// Fetched from the image host and stored
    Fetched(PosterLocator),
    /// No remote path was given, or it cannot be cached
    NoImage,
    /// The fetch or the payload write failed; nothing was cached
    Unavailable(CacheError),
}

impl Resolution {
    pub fn locator(&self) -> Option<&PosterLocator> {
        match self {
            Resolution::Hit(locator) | Resolution::Fetched(locator) => Some(locator),
            Resolution::NoImage | Resolution::Unavailable(_) => None,
        }
    }

    pub fn into_locator(self) -> Option<PosterLocator> {
        match self {
            Resolution::Hit(locator) | Resolution::Fetched(locator) => Some(locator),
            Resolution::NoImage | Resolution::Unavailable(_) => None,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Resolution::Hit(_))
    }
}

/// In-process counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub fetch_failures: u64,
}

/// On-disk footprint of the cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheUsage {
    pub entries: usize,
    pub total_size: u64,
}

/// Result of a size-budget sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BudgetReport {
    pub total_before: u64,
    pub total_after: u64,
    pub removed: usize,
}

/// One entry selected by the age sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiredEntry {
    pub payload: PathBuf,
    pub size: u64,
    pub age_days: i64,
}

/// Result of an age sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpiryReport {
    /// Number of sidecars inspected
    pub scanned: usize,
    /// Entries removed, or that would be removed on a dry run
    pub entries: Vec<ExpiredEntry>,
    pub total_bytes: u64,
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_metadata_json_shape() {
        let now = Utc::now();
        let meta = EntryMetadata::fresh(
            "https://image.tmdb.org/t/p/w500/abc.jpg",
            "w500",
            12345,
            now,
        );

        let json: serde_json::Value = serde_json::to_value(&meta).unwrap();
        for field in [
            "cached_date",
            "last_accessed",
            "original_url",
            "size",
            "file_size",
        ] {
            assert!(json.get(field).is_some(), "missing {}", field);
        }
        assert_eq!(json["file_size"], 12345);
        assert_eq!(json["size"], "w500");
    }

    #[test]
    fn test_naive_timestamps_read_as_utc() {
        let json = r#"{
            "cached_date": "2024-03-01T10:15:30.123456",
            "last_accessed": "2024-03-02T08:00:00",
            "original_url": "https://image.tmdb.org/t/p/w500/abc.jpg",
            "size": "w500",
            "file_size": 2048
        }"#;

        let meta: EntryMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(
            meta.cached_date.to_rfc3339(),
            "2024-03-01T10:15:30.123456+00:00"
        );
        assert_eq!(
            meta.accessed_at().to_rfc3339(),
            "2024-03-02T08:00:00+00:00"
        );
    }

    #[test]
    fn test_missing_last_accessed_falls_back_to_cached_date() {
        let json = r#"{"cached_date": "2024-03-01T10:15:30Z", "file_size": 1}"#;
        let meta: EntryMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.last_accessed, None);
        assert_eq!(meta.accessed_at(), meta.cached_date);
    }

    #[test]
    fn test_garbage_timestamp_rejected() {
        let json = r#"{"cached_date": "yesterday", "file_size": 1}"#;
        assert!(serde_json::from_str::<EntryMetadata>(json).is_err());
    }

    #[test]
    fn test_touch_never_precedes_cached_date() {
        let now = Utc::now();
        let mut meta = EntryMetadata::fresh("u", "w500", 1, now);
        meta.touch(now - Duration::days(3));
        assert_eq!(meta.last_accessed, Some(now));

        meta.touch(now + Duration::hours(1));
        assert_eq!(meta.last_accessed, Some(now + Duration::hours(1)));
    }

    #[test]
    fn test_resolution_locator() {
        let locator = PosterLocator {
            url: "/media/posters/w500/a.jpg".to_string(),
            path: PathBuf::from("/cache/w500/a.jpg"),
        };
        let hit = Resolution::Hit(locator.clone());
        assert!(hit.is_hit());
        assert_eq!(hit.locator(), Some(&locator));

        let fetched = Resolution::Fetched(locator.clone());
        assert!(!fetched.is_hit());
        assert_eq!(fetched.into_locator(), Some(locator));

        assert!(Resolution::NoImage.locator().is_none());
        assert!(Resolution::Unavailable(CacheError::InvalidPath("..".into()))
            .locator()
            .is_none());
    }

    #[test]
    fn test_cache_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.fetch_failures, 0);
    }
}

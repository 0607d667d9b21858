//! Maintenance sweeps: age-based expiry and size-budget eviction

use crate::store::{self, ScannedEntry};
use crate::types::{BudgetReport, CacheUsage, ExpiredEntry, ExpiryReport, PosterCacheConfig};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Access time assumed for payloads whose sidecar is missing or unreadable
const UNKNOWN_ACCESS_AGE_DAYS: i64 = 365;

const MB: f64 = 1024.0 * 1024.0;

/// The on-disk side of the poster cache, without an image fetcher.
///
/// Maintenance only ever reads and deletes, so it works from a cache root
/// alone.
#[derive(Debug, Clone)]
pub struct PosterStore {
    cache_dir: PathBuf,
}

/// An entry the age sweep selected, before removal
#[derive(Debug)]
struct ExpiryCandidate {
    payload: PathBuf,
    sidecar: PathBuf,
    size: u64,
    age_days: i64,
}

impl PosterStore {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn from_config(config: &PosterCacheConfig) -> Self {
        Self::new(config.cache_dir.clone())
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Entry count and payload bytes currently on disk
    pub async fn usage(&self) -> CacheUsage {
        let scanned = store::scan(&self.cache_dir).await;
        CacheUsage {
            entries: scanned.len(),
            total_size: scanned.iter().map(|e| e.size).sum(),
        }
    }

    /// Evict least recently accessed entries until the cache fits in
    /// `max_total_bytes`.
    ///
    /// Eviction stops as soon as the freed amount covers the excess. An entry
    /// that cannot be removed is logged and skipped.
    pub async fn enforce_size_budget(&self, max_total_bytes: u64) -> BudgetReport {
        let entries = store::scan(&self.cache_dir).await;
        evict_least_recent(entries, max_total_bytes, Utc::now()).await
    }

    /// Remove entries cached more than `max_age` ago.
    ///
    /// With `dry_run` nothing is deleted and the report lists exactly the
    /// entries a live run would remove.
    pub async fn expire_older_than(&self, max_age: Duration, dry_run: bool) -> ExpiryReport {
        let (scanned, candidates) = expiry_candidates(&self.cache_dir, max_age, Utc::now()).await;
        remove_expired(scanned, candidates, dry_run).await
    }
}

async fn evict_least_recent(
    mut entries: Vec<ScannedEntry>,
    max_total_bytes: u64,
    now: DateTime<Utc>,
) -> BudgetReport {
    let total_before: u64 = entries.iter().map(|e| e.size).sum();

    if total_before <= max_total_bytes {
        debug!(total_before, max_total_bytes, "Poster cache within budget");
        return BudgetReport {
            total_before,
            total_after: total_before,
            removed: 0,
        };
    }

    let unknown_access = now - ChronoDuration::days(UNKNOWN_ACCESS_AGE_DAYS);
    entries.sort_by_key(|e| {
        e.metadata
            .as_ref()
            .map(|m| m.accessed_at())
            .unwrap_or(unknown_access)
    });

    let to_free = total_before - max_total_bytes;
    let mut freed = 0u64;
    let mut removed = 0usize;

    for entry in &entries {
        if freed >= to_free {
            break;
        }
        match store::remove_entry(&entry.payload, &entry.sidecar).await {
            Ok(()) => {
                freed += entry.size;
                removed += 1;
                debug!(payload = ?entry.payload, size = entry.size, "Evicted poster");
            }
            Err(e) => warn!(payload = ?entry.payload, error = %e, "Failed to evict poster"),
        }
    }

    info!(
        freed_mb = freed as f64 / MB,
        removed,
        "Poster cache size cleanup"
    );

    BudgetReport {
        total_before,
        total_after: total_before - freed,
        removed,
    }
}

/// Sidecar count and the entries cached more than `max_age` before `now`
async fn expiry_candidates(
    root: &Path,
    max_age: Duration,
    now: DateTime<Utc>,
) -> (usize, Vec<ExpiryCandidate>) {
    let mut scanned = 0;
    let mut candidates = Vec::new();

    for sidecar in store::walk_files(root).await {
        if !store::is_sidecar(&sidecar) {
            continue;
        }
        scanned += 1;

        let metadata = match store::read_metadata(&sidecar).await {
            Ok(Some(metadata)) => metadata,
            Ok(None) => continue,
            Err(e) => {
                warn!(sidecar = ?sidecar, error = %e, "Skipping unreadable sidecar");
                continue;
            }
        };

        let age = now - metadata.cached_date;
        let expired = age.to_std().map(|age| age > max_age).unwrap_or(false);
        if !expired {
            continue;
        }

        let Some(payload) = store::payload_for(&sidecar) else {
            continue;
        };
        let Some(size) = store::payload_size(&payload).await else {
            continue;
        };

        candidates.push(ExpiryCandidate {
            payload,
            sidecar,
            size,
            age_days: age.num_days(),
        });
    }

    (scanned, candidates)
}

async fn remove_expired(
    scanned: usize,
    candidates: Vec<ExpiryCandidate>,
    dry_run: bool,
) -> ExpiryReport {
    let mut report = ExpiryReport {
        scanned,
        dry_run,
        ..ExpiryReport::default()
    };

    for candidate in candidates {
        if !dry_run {
            if let Err(e) = store::remove_entry(&candidate.payload, &candidate.sidecar).await {
                warn!(payload = ?candidate.payload, error = %e, "Failed to remove expired poster");
                continue;
            }
        }

        debug!(
            payload = ?candidate.payload,
            age_days = candidate.age_days,
            dry_run,
            "Expired poster"
        );
        report.total_bytes += candidate.size;
        report.entries.push(ExpiredEntry {
            payload: candidate.payload,
            size: candidate.size,
            age_days: candidate.age_days,
        });
    }

    info!(
        removed = report.entries.len(),
        removed_mb = report.total_bytes as f64 / MB,
        dry_run,
        "Poster cache age cleanup"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{cache_with, seed_entry, StubFetcher};
    use tempfile::tempdir;

    const FOURTEEN_DAYS: Duration = Duration::from_secs(14 * 24 * 60 * 60);

    /// Ten 60-byte entries; entry `i` was last read `10 - i` hours ago
    async fn seed_ten(root: &std::path::Path) {
        let now = Utc::now();
        for i in 0..10 {
            seed_entry(
                root,
                &format!("w500/poster{}.jpg", i),
                &[b'x'; 60],
                now - ChronoDuration::days(1),
                now - ChronoDuration::hours(10 - i),
            )
            .await;
        }
    }

    #[tokio::test]
    async fn test_budget_noop_when_within_limit() {
        let dir = tempdir().unwrap();
        let cache = cache_with(dir.path(), StubFetcher::failing());
        seed_ten(dir.path()).await;

        let report = cache.enforce_size_budget(600).await;
        assert_eq!(report.total_before, 600);
        assert_eq!(report.total_after, 600);
        assert_eq!(report.removed, 0);
        assert_eq!(cache.usage().await.entries, 10);
    }

    #[tokio::test]
    async fn test_budget_evicts_least_recently_accessed_first() {
        let dir = tempdir().unwrap();
        let cache = cache_with(dir.path(), StubFetcher::failing());
        seed_ten(dir.path()).await;

        let report = cache.enforce_size_budget(500).await;

        assert_eq!(report.total_before, 600);
        assert_eq!(report.total_after, 480);
        assert_eq!(report.removed, 2);

        for i in 0..2 {
            let payload = dir.path().join(format!("w500/poster{}.jpg", i));
            assert!(!payload.exists());
            assert!(!dir.path().join(format!("w500/poster{}.jpg.meta", i)).exists());
        }
        for i in 2..10 {
            assert!(dir.path().join(format!("w500/poster{}.jpg", i)).exists());
        }
        assert_eq!(cache.usage().await.total_size, 480);
    }

    #[tokio::test]
    async fn test_budget_exact_fit_stops_without_overshoot() {
        let dir = tempdir().unwrap();
        let cache = cache_with(dir.path(), StubFetcher::failing());
        seed_ten(dir.path()).await;

        let report = cache.enforce_size_budget(480).await;
        assert_eq!(report.removed, 2);
        assert_eq!(report.total_after, 480);
    }

    #[tokio::test]
    async fn test_budget_zero_evicts_everything() {
        let dir = tempdir().unwrap();
        let cache = cache_with(dir.path(), StubFetcher::failing());
        seed_ten(dir.path()).await;

        let report = cache.enforce_size_budget(0).await;
        assert_eq!(report.removed, 10);
        assert_eq!(report.total_after, 0);
        assert!(store::walk_files(dir.path()).await.is_empty());
    }

    #[tokio::test]
    async fn test_budget_evicts_payloads_without_metadata_first() {
        let dir = tempdir().unwrap();
        let cache = cache_with(dir.path(), StubFetcher::failing());
        seed_ten(dir.path()).await;
        store::write_atomic(&dir.path().join("w92/orphan.jpg"), &[b'o'; 60])
            .await
            .unwrap();

        let report = cache.enforce_size_budget(600).await;

        assert_eq!(report.total_before, 660);
        assert_eq!(report.removed, 1);
        assert!(!dir.path().join("w92/orphan.jpg").exists());
        assert!(dir.path().join("w500/poster0.jpg").exists());
    }

    #[tokio::test]
    async fn test_budget_on_missing_root() {
        let dir = tempdir().unwrap();
        let cache = cache_with(&dir.path().join("absent"), StubFetcher::failing());

        let report = cache.enforce_size_budget(0).await;
        assert_eq!(report.total_before, 0);
        assert_eq!(report.removed, 0);
    }

    #[tokio::test]
    async fn test_expire_removes_only_old_entries() {
        let dir = tempdir().unwrap();
        let cache = cache_with(dir.path(), StubFetcher::failing());
        let now = Utc::now();
        let old = now - ChronoDuration::days(20);
        let recent = now - ChronoDuration::days(3);
        seed_entry(dir.path(), "w500/old.jpg", b"0123456789", old, old).await;
        seed_entry(dir.path(), "w185/recent.jpg", b"0123", recent, recent).await;

        let report = cache.expire_older_than(FOURTEEN_DAYS, false).await;

        assert!(!report.dry_run);
        assert_eq!(report.scanned, 2);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.total_bytes, 10);
        assert_eq!(report.entries[0].age_days, 20);
        assert!(report.entries[0].payload.ends_with("old.jpg"));

        assert!(!dir.path().join("w500/old.jpg").exists());
        assert!(!dir.path().join("w500/old.jpg.meta").exists());
        assert!(dir.path().join("w185/recent.jpg").exists());
        assert!(dir.path().join("w185/recent.jpg.meta").exists());
    }

    #[tokio::test]
    async fn test_expire_dry_run_matches_live_run() {
        let dir = tempdir().unwrap();
        let cache = cache_with(dir.path(), StubFetcher::failing());
        let now = Utc::now();
        for (name, days) in [("a", 30), ("b", 15), ("c", 13), ("d", 1)] {
            let cached = now - ChronoDuration::days(days);
            seed_entry(
                dir.path(),
                &format!("w500/{}.jpg", name),
                b"bytes",
                cached,
                cached,
            )
            .await;
        }

        let dry = cache.expire_older_than(FOURTEEN_DAYS, true).await;
        assert!(dry.dry_run);
        assert_eq!(cache.usage().await.entries, 4);
        assert_eq!(store::walk_files(dir.path()).await.len(), 8);

        let live = cache.expire_older_than(FOURTEEN_DAYS, false).await;
        assert_eq!(dry.entries, live.entries);
        assert_eq!(dry.total_bytes, live.total_bytes);
        assert_eq!(live.entries.len(), 2);
        assert_eq!(cache.usage().await.entries, 2);
    }

    #[tokio::test]
    async fn test_expire_skips_corrupt_sidecars() {
        let dir = tempdir().unwrap();
        let cache = cache_with(dir.path(), StubFetcher::failing());
        store::write_atomic(&dir.path().join("w500/a.jpg"), b"a")
            .await
            .unwrap();
        store::write_atomic(&dir.path().join("w500/a.jpg.meta"), b"{")
            .await
            .unwrap();
        let old = Utc::now() - ChronoDuration::days(40);
        seed_entry(dir.path(), "w500/b.jpg", b"b", old, old).await;

        let report = cache.expire_older_than(FOURTEEN_DAYS, false).await;
        assert_eq!(report.scanned, 2);
        assert_eq!(report.entries.len(), 1);
        assert!(dir.path().join("w500/a.jpg").exists());
    }

    #[tokio::test]
    async fn test_store_sweeps_without_fetcher() {
        let dir = tempdir().unwrap();
        seed_ten(dir.path()).await;
        let old = Utc::now() - ChronoDuration::days(30);
        seed_entry(dir.path(), "w92/old.jpg", &[b'o'; 40], old, old).await;

        let store = PosterStore::from_config(&PosterCacheConfig {
            cache_dir: dir.path().to_path_buf(),
            ..PosterCacheConfig::default()
        });
        assert_eq!(store.cache_dir(), dir.path());
        assert_eq!(store.usage().await.total_size, 640);

        let expiry = store.expire_older_than(FOURTEEN_DAYS, false).await;
        assert_eq!(expiry.entries.len(), 1);

        let budget = store.enforce_size_budget(540).await;
        assert_eq!(budget.total_before, 600);
        assert_eq!(budget.removed, 1);
        assert!(!dir.path().join("w500/poster0.jpg").exists());
    }

    #[tokio::test]
    async fn test_budget_skips_entry_that_cannot_be_removed() {
        let dir = tempdir().unwrap();
        seed_ten(dir.path()).await;
        let entries = store::scan(dir.path()).await;

        // The least recently read entry disappears between scan and eviction
        std::fs::remove_file(dir.path().join("w500/poster0.jpg")).unwrap();

        let report = evict_least_recent(entries, 500, Utc::now()).await;

        assert_eq!(report.total_before, 600);
        assert_eq!(report.removed, 2);
        assert_eq!(report.total_after, 480);
        for i in 1..3 {
            assert!(!dir.path().join(format!("w500/poster{}.jpg", i)).exists());
            assert!(!dir.path().join(format!("w500/poster{}.jpg.meta", i)).exists());
        }
        for i in 3..10 {
            assert!(dir.path().join(format!("w500/poster{}.jpg", i)).exists());
        }
        // The failed entry's sidecar is left alone
        assert!(dir.path().join("w500/poster0.jpg.meta").exists());
    }

    #[tokio::test]
    async fn test_budget_reports_shortfall_when_removals_fail() {
        let dir = tempdir().unwrap();
        seed_ten(dir.path()).await;
        let entries = store::scan(dir.path()).await;
        for i in 0..9 {
            std::fs::remove_file(dir.path().join(format!("w500/poster{}.jpg", i))).unwrap();
        }

        let report = evict_least_recent(entries, 0, Utc::now()).await;

        assert_eq!(report.removed, 1);
        assert_eq!(report.total_after, 540);
        assert!(!dir.path().join("w500/poster9.jpg").exists());
    }

    #[tokio::test]
    async fn test_expire_skips_entry_that_cannot_be_removed() {
        let dir = tempdir().unwrap();
        let now = Utc::now();
        for (name, days) in [("a", 30), ("b", 20), ("c", 15), ("d", 1)] {
            let cached = now - ChronoDuration::days(days);
            seed_entry(
                dir.path(),
                &format!("w500/{}.jpg", name),
                b"bytes",
                cached,
                cached,
            )
            .await;
        }

        let (scanned, candidates) = expiry_candidates(dir.path(), FOURTEEN_DAYS, now).await;
        assert_eq!(scanned, 4);
        assert_eq!(candidates.len(), 3);

        std::fs::remove_file(dir.path().join("w500/b.jpg")).unwrap();
        let report = remove_expired(scanned, candidates, false).await;

        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.total_bytes, 10);
        assert!(report.entries[0].payload.ends_with("a.jpg"));
        assert!(report.entries[1].payload.ends_with("c.jpg"));
        assert!(!dir.path().join("w500/a.jpg").exists());
        assert!(!dir.path().join("w500/c.jpg.meta").exists());
        assert!(dir.path().join("w500/b.jpg.meta").exists());
        assert!(dir.path().join("w500/d.jpg").exists());
    }
}

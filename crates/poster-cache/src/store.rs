//! Payload and sidecar files on disk

use crate::error::{CacheError, Result};
use crate::key::{with_suffix, PARTIAL_SUFFIX, SIDECAR_SUFFIX};
use crate::types::EntryMetadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::warn;

/// A payload file found by a scan, with its sidecar if one could be read
#[derive(Debug)]
pub(crate) struct ScannedEntry {
    pub payload: PathBuf,
    pub sidecar: PathBuf,
    pub size: u64,
    pub metadata: Option<EntryMetadata>,
}

static PARTIAL_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Sibling temp path unique to this write, e.g. `a.jpg.4242-7.part`
fn partial_path(path: &Path) -> PathBuf {
    let n = PARTIAL_COUNTER.fetch_add(1, Ordering::Relaxed);
    with_suffix(
        path,
        &format!(".{}-{}{}", std::process::id(), n, PARTIAL_SUFFIX),
    )
}

/// Write `data` to a private sibling `.part` file, then rename it over `path`.
///
/// Concurrent writers of one path never share a temp file, so readers see
/// either the old payload or one complete new payload.
pub(crate) async fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| CacheError::storage(parent, e))?;
    }

    let partial = partial_path(path);
    if let Err(e) = fs::write(&partial, data).await {
        let _ = fs::remove_file(&partial).await;
        return Err(CacheError::storage(&partial, e));
    }

    if let Err(e) = fs::rename(&partial, path).await {
        let _ = fs::remove_file(&partial).await;
        return Err(CacheError::storage(path, e));
    }
    Ok(())
}

/// Read a sidecar. `Ok(None)` when it does not exist.
pub(crate) async fn read_metadata(sidecar: &Path) -> Result<Option<EntryMetadata>> {
    let raw = match fs::read(sidecar).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(CacheError::CorruptMetadata {
                path: sidecar.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };

    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|e| CacheError::CorruptMetadata {
            path: sidecar.to_path_buf(),
            reason: e.to_string(),
        })
}

pub(crate) async fn write_metadata(sidecar: &Path, metadata: &EntryMetadata) -> Result<()> {
    let json = serde_json::to_vec(metadata).map_err(|e| CacheError::CorruptMetadata {
        path: sidecar.to_path_buf(),
        reason: e.to_string(),
    })?;
    write_atomic(sidecar, &json).await
}

/// Size of a regular file, `None` if it is missing or not a file
pub(crate) async fn payload_size(path: &Path) -> Option<u64> {
    match fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Some(meta.len()),
        _ => None,
    }
}

/// Remove a payload and its sidecar.
///
/// Fails only if the payload itself could not be removed; a sidecar that is
/// already gone is fine, and one that cannot be removed is logged since the
/// entry no longer exists without its payload.
pub(crate) async fn remove_entry(payload: &Path, sidecar: &Path) -> Result<()> {
    fs::remove_file(payload)
        .await
        .map_err(|e| CacheError::storage(payload, e))?;

    match fs::remove_file(sidecar).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(sidecar = ?sidecar, error = %e, "Failed to remove sidecar"),
    }
    Ok(())
}

/// All regular files below `root`, sorted. Unreadable directories are logged
/// and skipped.
pub(crate) async fn walk_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound && dir == root => break,
            Err(e) => {
                warn!(dir = ?dir, error = %e, "Failed to read cache directory");
                continue;
            }
        };

        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => match entry.file_type().await {
                    Ok(kind) if kind.is_dir() => pending.push(entry.path()),
                    Ok(kind) if kind.is_file() => files.push(entry.path()),
                    Ok(_) => {}
                    Err(e) => warn!(path = ?entry.path(), error = %e, "Failed to stat cache file"),
                },
                Ok(None) => break,
                Err(e) => {
                    warn!(dir = ?dir, error = %e, "Failed to list cache directory");
                    break;
                }
            }
        }
    }

    files.sort();
    files
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.ends_with(suffix))
        .unwrap_or(false)
}

pub(crate) fn is_sidecar(path: &Path) -> bool {
    has_suffix(path, SIDECAR_SUFFIX)
}

pub(crate) fn is_partial(path: &Path) -> bool {
    has_suffix(path, PARTIAL_SUFFIX)
}

/// Payload path for a sidecar path
pub(crate) fn payload_for(sidecar: &Path) -> Option<PathBuf> {
    let raw = sidecar.to_str()?;
    raw.strip_suffix(SIDECAR_SUFFIX).map(PathBuf::from)
}

/// Every payload under `root` with its on-disk size and readable metadata
pub(crate) async fn scan(root: &Path) -> Vec<ScannedEntry> {
    let mut scanned = Vec::new();

    for payload in walk_files(root).await {
        if is_sidecar(&payload) || is_partial(&payload) {
            continue;
        }

        let Some(size) = payload_size(&payload).await else {
            continue;
        };

        let sidecar = with_suffix(&payload, SIDECAR_SUFFIX);
        let metadata = match read_metadata(&sidecar).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(payload = ?payload, error = %e, "Unreadable sidecar during scan");
                None
            }
        };

        scanned.push(ScannedEntry {
            payload,
            sidecar,
            size,
            metadata,
        });
    }

    scanned
}

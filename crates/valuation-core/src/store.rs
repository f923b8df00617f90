//! Best-effort disk snapshot of cached industry averages
//!
//! Entries are written as one JSON document after every cache store and
//! read back at startup. A missing or corrupted file means starting empty;
//! neither reading nor writing ever fails a request.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::cache::CacheEntry;
use crate::error::{CompareError, Result};

/// File name inside the cache directory
pub const SNAPSHOT_FILE: &str = "industry_averages.json";

/// On-disk layout
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    /// Unix timestamp of last write
    updated_at: i64,
    entries: Vec<CacheEntry>,
}

/// JSON snapshot file of cache entries
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Store the snapshot inside `cache_dir`
    pub fn in_dir(cache_dir: impl AsRef<Path>) -> Self {
        Self {
            path: cache_dir.as_ref().join(SNAPSHOT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all entries, expired ones included; unreadable files yield nothing
    pub fn load(&self) -> Vec<CacheEntry> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Cannot read averages snapshot"
                    );
                }
                return Vec::new();
            }
        };

        match serde_json::from_str::<Snapshot>(&content) {
            Ok(snapshot) => snapshot.entries,
            Err(e) => {
                // Corrupted snapshot, start fresh
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Ignoring corrupted averages snapshot"
                );
                Vec::new()
            }
        }
    }

    /// Replace the snapshot with `entries`
    pub fn save(&self, entries: &[CacheEntry]) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(dir)?;

        let snapshot = Snapshot {
            updated_at: Utc::now().timestamp(),
            entries: entries.to_vec(),
        };
        let content = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| CompareError::Cache(format!("Serialization failed: {e}")))?;

        // Unique temp file, then rename: readers never see a partial file
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Save, logging instead of returning failures
    pub fn save_or_warn(&self, entries: &[CacheEntry]) {
        if let Err(e) = self.save(entries) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to persist industry averages"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{AveragesCache, ManualClock};
    use crate::model::{IndustryAverage, Metric, RatioSet};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn entry(industry: &str, pb: f64, expires_at: i64) -> CacheEntry {
        CacheEntry {
            industry: industry.to_string(),
            value: IndustryAverage {
                ratios: RatioSet::default().with(Metric::Pb, pb),
                peer_count: 3,
            },
            expires_at,
        }
    }

    fn create_test_store() -> (SnapshotStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::in_dir(temp_dir.path().join("nested"));
        (store, temp_dir)
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let (store, _temp) = create_test_store();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let (store, _temp) = create_test_store();
        let entries = vec![entry("Banks", 1.2, 500), entry("Software", 8.0, 900)];

        store.save(&entries).unwrap();
        let mut loaded = store.load();
        loaded.sort_by(|a, b| a.industry.cmp(&b.industry));
        assert_eq!(loaded, entries);
    }

    #[test]
    fn test_corrupted_file_loads_empty() {
        let (store, _temp) = create_test_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().is_empty());
    }

    #[tokio::test]
    async fn test_unexpired_entries_survive_restart() {
        let (store, _temp) = create_test_store();
        let ttl = Duration::from_secs(100);
        let clock = Arc::new(ManualClock::new(1_000));

        let cache = AveragesCache::persistent(ttl, clock.clone(), store.clone());
        cache
            .get_or_compute("Banks", || async {
                Ok::<_, String>(entry("Banks", 1.5, 0).value)
            })
            .await
            .unwrap();
        drop(cache);

        // Restart before expiry: served without recomputing
        clock.set(1_099);
        let restarted = AveragesCache::persistent(ttl, clock.clone(), store.clone());
        let value = restarted
            .get_or_compute("Banks", || async { Err::<IndustryAverage, _>("should not compute") })
            .await
            .unwrap();
        assert_eq!(value.get(Metric::Pb), Some(1.5));

        // Restart after expiry: entry dropped
        clock.set(1_100);
        let expired = AveragesCache::persistent(ttl, clock, store);
        assert!(expired.peek("Banks").await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_stores_all_persisted() {
        for _ in 0..10 {
            let (store, _temp) = create_test_store();
            let clock = Arc::new(ManualClock::new(0));
            let cache = AveragesCache::persistent(Duration::from_secs(100), clock, store.clone());

            let handles: Vec<_> = (0..16)
                .map(|i| {
                    let cache = cache.clone();
                    tokio::spawn(async move {
                        let label = format!("Industry {i}");
                        cache
                            .get_or_compute(&label, || async move {
                                Ok::<_, String>(entry("x", f64::from(i), 0).value)
                            })
                            .await
                    })
                })
                .collect();
            for handle in handles {
                handle.await.unwrap().unwrap();
            }

            assert_eq!(cache.len().await, 16);
            let mut persisted: Vec<String> = store.load().into_iter().map(|e| e.industry).collect();
            persisted.sort();
            persisted.dedup();
            assert_eq!(persisted.len(), 16);

            let restarted = AveragesCache::persistent(
                Duration::from_secs(100),
                Arc::new(ManualClock::new(50)),
                store,
            );
            assert_eq!(restarted.len().await, 16);
        }
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let (store, _temp) = create_test_store();
        store.save(&[entry("Banks", 1.0, 10)]).unwrap();
        store.save(&[entry("Banks", 2.0, 10)]).unwrap();

        let dir = store.path().parent().unwrap();
        let names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(SNAPSHOT_FILE)]);
    }

    #[test]
    fn test_save_failure_is_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the directory should be
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let store = SnapshotStore::in_dir(&blocker);

        assert!(store.save(&[entry("Banks", 1.0, 10)]).is_err());
        store.save_or_warn(&[entry("Banks", 1.0, 10)]);
    }
}

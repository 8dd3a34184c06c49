use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

use super::loader::load_file;
use super::model::Dataset;
use crate::error::DataLoadError;

// ---------------------------------------------------------------------------
// Dataset cache: parse once, share read-only
// ---------------------------------------------------------------------------

/// Identity of a file on disk at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    fn of(path: &Path) -> Option<Self> {
        let meta = std::fs::metadata(path).ok()?;
        Some(FileStamp {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

struct CacheEntry {
    stamp: FileStamp,
    dataset: Arc<Dataset>,
}

/// Memoizes parsed datasets by canonical path.
///
/// An entry is reused until the file's modification time or length changes,
/// or until it is dropped through [`DatasetCache::invalidate`]. The lock is
/// held across the load so concurrent callers parse a file at most once.
#[derive(Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<PathBuf, CacheEntry>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, loading it on first use or when
    /// the file has changed since it was cached.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<Dataset>, DataLoadError> {
        let key = cache_key(path);
        let Some(stamp) = FileStamp::of(&key) else {
            self.lock().remove(&key);
            return Err(DataLoadError::NotFound(path.to_path_buf()));
        };

        let mut entries = self.lock();
        if let Some(entry) = entries.get(&key) {
            if entry.stamp == stamp {
                log::debug!("dataset cache hit for {}", key.display());
                return Ok(Arc::clone(&entry.dataset));
            }
            log::info!("{} changed on disk, reloading", key.display());
        }

        let dataset = Arc::new(load_file(&key)?);
        entries.insert(
            key,
            CacheEntry {
                stamp,
                dataset: Arc::clone(&dataset),
            },
        );
        Ok(dataset)
    }

    /// Drop the entry for `path`; the next `get_or_load` re-parses the file.
    pub fn invalidate(&self, path: &Path) -> bool {
        self.lock().remove(&cache_key(path)).is_some()
    }

    /// Drop every entry, returning how many were cached.
    pub fn clear(&self) -> usize {
        let mut entries = self.lock();
        let dropped = entries.len();
        entries.clear();
        dropped
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, CacheEntry>> {
        // Entries are only inserted whole, a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn cache_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const BODY: &str = "Order Date,Region,State,Category,Sub-Category,Customer Name,Sales,Profit,Quantity\n\
                        2023-01-01,East,Ohio,Technology,Phones,Ann,10,1,1\n";

    #[test]
    fn repeated_loads_share_one_dataset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orders.csv");
        fs::write(&path, BODY).unwrap();

        let cache = DatasetCache::new();
        let a = cache.get_or_load(&path).unwrap();
        let b = cache.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.clear(), 1);
    }

    #[test]
    fn changed_file_is_reloaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orders.csv");
        fs::write(&path, BODY).unwrap();

        let cache = DatasetCache::new();
        let a = cache.get_or_load(&path).unwrap();
        assert_eq!(a.len(), 1);

        // Appending changes the length even when mtime granularity is coarse.
        fs::write(
            &path,
            format!("{BODY}2023-01-02,West,Utah,Furniture,Chairs,Bob,20,2,2\n"),
        )
        .unwrap();
        let b = cache.get_or_load(&path).unwrap();
        assert_eq!(b.len(), 2);
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn invalidate_forces_reparse() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orders.csv");
        fs::write(&path, BODY).unwrap();

        let cache = DatasetCache::new();
        let a = cache.get_or_load(&path).unwrap();
        assert!(cache.invalidate(&path));
        assert!(!cache.invalidate(&path));
        let b = cache.get_or_load(&path).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn missing_file_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let cache = DatasetCache::new();
        let err = cache.get_or_load(&dir.path().join("gone.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::NotFound(_)));
        assert_eq!(cache.clear(), 0);
    }

    #[test]
    fn clear_drops_every_entry() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");
        fs::write(&first, BODY).unwrap();
        fs::write(&second, BODY).unwrap();

        let cache = DatasetCache::new();
        let a = cache.get_or_load(&first).unwrap();
        cache.get_or_load(&second).unwrap();
        assert_eq!(cache.clear(), 2);
        assert!(!cache.invalidate(&first));
        assert!(!Arc::ptr_eq(&a, &cache.get_or_load(&first).unwrap()));
    }
}

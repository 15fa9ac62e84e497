//! Query-result disk cache.
//!
//! One JSON file per query under the cache directory, named after the query
//! with path separators replaced. Entries never expire; delete the file to
//! force a fresh fetch. Single-process use is assumed — concurrent writers
//! to the same key are out of contract.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::types::RawChange;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache entry is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Persistent query → record-batch store with no TTL.
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    /// Open (and create if needed) the cache directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a query: path separators would escape the cache
    /// directory, so they are replaced.
    fn key(query: &str) -> String {
        query.replace(['/', '\\'], "_")
    }

    fn path_for(&self, query: &str) -> PathBuf {
        self.dir.join(Self::key(query))
    }

    /// Look up a query. A miss is `Ok(None)`, not an error.
    pub fn get(&self, query: &str) -> Result<Option<Vec<RawChange>>, CacheError> {
        let path = self.path_for(query);
        if !path.exists() {
            debug!("cache miss for {query}");
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        let data = serde_json::from_str(&contents)?;
        debug!("cache hit for {query}");
        Ok(Some(data))
    }

    /// Persist a batch under the query's key, silently overwriting any
    /// previous entry.
    pub fn put(&self, query: &str, data: &[RawChange]) -> Result<(), CacheError> {
        let contents = serde_json::to_string(data)?;
        fs::write(self.path_for(query), contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CurrentPatchSet;

    fn change(created_on: i64) -> RawChange {
        RawChange {
            created_on,
            last_updated: created_on + 100,
            owner: None,
            current_patch_set: CurrentPatchSet {
                size_insertions: 1,
                size_deletions: 0,
                approvals: None,
            },
        }
    }

    #[test]
    fn miss_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::open(dir.path()).unwrap();
        assert!(cache.get("status:merged project:p").unwrap().is_none());
    }

    #[test]
    fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::open(dir.path()).unwrap();
        let data = vec![change(10), change(20)];
        cache.put("status:merged project:p", &data).unwrap();
        assert_eq!(cache.get("status:merged project:p").unwrap(), Some(data));
    }

    #[test]
    fn put_overwrites_existing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::open(dir.path()).unwrap();
        cache.put("q", &[change(1)]).unwrap();
        cache.put("q", &[change(2), change(3)]).unwrap();
        let got = cache.get("q").unwrap().unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].created_on, 2);
    }

    #[test]
    fn path_separators_are_replaced_in_keys() {
        assert_eq!(
            CacheStore::key("status:merged project:openstack/neutron"),
            "status:merged project:openstack_neutron"
        );
        assert_eq!(CacheStore::key(r"a\b/c"), "a_b_c");
    }

    #[test]
    fn keys_stay_inside_the_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::open(dir.path()).unwrap();
        cache.put("../escape", &[change(1)]).unwrap();
        assert!(dir.path().join(".._escape").exists());
    }
}

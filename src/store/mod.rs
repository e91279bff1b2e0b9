//! Persisted local store for library data.
//!
//! All library state lives under a small set of well-known cache keys, each
//! holding a JSON array. This module provides:
//! - The `KvStore` backends (in-memory and Sled)
//! - `LocalStore`, the typed accessor layer over the raw keys
//!
//! Reads are fail-soft: a missing or unparseable value yields an empty
//! collection and an error log, never a hard failure. Writes are
//! best-effort; callers may ignore the result. There is no locking across
//! read-modify-write sequences, so concurrent mutations race and the last
//! writer wins.

mod kv;

pub use kv::{KvError, KvResult, KvStore, MemoryStore, SledConfig, SledStore};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::library::{Document, Folder, UserActivity};

/// Cache keys for the persisted collections
pub mod keys {
    /// JSON array of documents
    pub const DOCUMENTS: &str = "documents";
    /// JSON array of folders (the synthetic root is never stored)
    pub const FOLDERS: &str = "folders";
    /// JSON array of activity records, newest first
    pub const USER_ACTIVITIES: &str = "userActivities";
    /// JSON array of recent search terms, newest first
    pub const RECENT_SEARCHES: &str = "recent_searches";
}

/// Errors that can occur while persisting cache state
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Cache backend error: {0}")]
    Backend(#[from] KvError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Typed access to the persisted local cache.
///
/// The only component that touches raw cache keys.
#[derive(Clone)]
pub struct LocalStore {
    kv: Arc<dyn KvStore>,
}

impl LocalStore {
    /// Create a store over the given backend
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Create a store over a fresh in-memory backend
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Open a Sled-backed store at the configured path
    pub fn open_sled(config: SledConfig) -> StoreResult<Self> {
        Ok(Self::new(Arc::new(SledStore::open(config)?)))
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.kv.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                error!("Failed to read cache key '{}': {}", key, e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(e) => {
                error!("Corrupt cache entry under '{}', treating as empty: {}", key, e);
                Vec::new()
            }
        }
    }

    fn write_list<T: Serialize>(&self, key: &str, list: &[T]) -> StoreResult<()> {
        let raw = serde_json::to_string(list)?;
        if let Err(e) = self.kv.put(key, &raw) {
            error!("Failed to persist cache key '{}': {}", key, e);
            return Err(e.into());
        }
        Ok(())
    }

    /// All stored documents; empty when absent or unreadable
    pub fn documents(&self) -> Vec<Document> {
        self.read_list(keys::DOCUMENTS)
    }

    /// Replace the stored document list
    pub fn save_documents(&self, documents: &[Document]) -> StoreResult<()> {
        self.write_list(keys::DOCUMENTS, documents)
    }

    /// All stored folders; empty when absent or unreadable
    pub fn folders(&self) -> Vec<Folder> {
        self.read_list(keys::FOLDERS)
    }

    /// Replace the stored folder list
    pub fn save_folders(&self, folders: &[Folder]) -> StoreResult<()> {
        self.write_list(keys::FOLDERS, folders)
    }

    /// All recorded activity events, newest first; empty when absent or
    /// unreadable
    pub fn activities(&self) -> Vec<UserActivity> {
        self.read_list(keys::USER_ACTIVITIES)
    }

    /// Replace the stored activity list
    pub fn save_activities(&self, activities: &[UserActivity]) -> StoreResult<()> {
        self.write_list(keys::USER_ACTIVITIES, activities)
    }

    /// Recently submitted search terms, newest first
    pub fn recent_searches(&self) -> Vec<String> {
        self.read_list(keys::RECENT_SEARCHES)
    }

    /// Replace the stored recent-search list
    pub fn save_recent_searches(&self, terms: &[String]) -> StoreResult<()> {
        self.write_list(keys::RECENT_SEARCHES, terms)
    }

    /// Remove every persisted collection from the cache.
    ///
    /// A failure part-way leaves earlier removals in place.
    pub fn clear_all(&self) -> StoreResult<()> {
        for key in [
            keys::DOCUMENTS,
            keys::FOLDERS,
            keys::USER_ACTIVITIES,
            keys::RECENT_SEARCHES,
        ] {
            self.kv.remove(key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_cache_reads_as_empty() {
        let store = LocalStore::in_memory();

        assert!(store.documents().is_empty());
        assert!(store.folders().is_empty());
        assert!(store.activities().is_empty());
        assert!(store.recent_searches().is_empty());
    }

    #[test]
    fn test_corrupt_entry_reads_as_empty() {
        let kv = Arc::new(MemoryStore::new());
        kv.put(keys::DOCUMENTS, "this is not json").unwrap();

        let store = LocalStore::new(kv);
        assert!(store.documents().is_empty());
    }

    #[test]
    fn test_documents_roundtrip() {
        let store = LocalStore::in_memory();
        let doc = Document::new("Quarterly Report").with_category("财务");

        store.save_documents(&[doc.clone()]).unwrap();

        let loaded = store.documents();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, doc.id);
        assert_eq!(loaded[0].title, "Quarterly Report");
        assert_eq!(loaded[0].category, "财务");
    }

    #[test]
    fn test_recent_searches_roundtrip() {
        let store = LocalStore::in_memory();

        store
            .save_recent_searches(&["rust".to_string(), "sled".to_string()])
            .unwrap();

        assert_eq!(store.recent_searches(), vec!["rust", "sled"]);
    }

    #[test]
    fn test_clear_all_removes_every_collection() {
        let kv = Arc::new(MemoryStore::new());
        let store = LocalStore::new(kv.clone());

        store.save_documents(&[Document::new("Doc")]).unwrap();
        store.save_folders(&[Folder::new("Reports")]).unwrap();
        store.save_recent_searches(&["term".to_string()]).unwrap();

        store.clear_all().unwrap();

        assert!(store.documents().is_empty());
        assert!(store.folders().is_empty());
        assert!(store.recent_searches().is_empty());
        assert!(kv.get(keys::DOCUMENTS).unwrap().is_none());
        assert!(kv.get(keys::FOLDERS).unwrap().is_none());
    }

    #[test]
    fn test_sled_backed_store() {
        let dir = tempdir().unwrap();
        let config = SledConfig::new(dir.path().join("cache.sled").to_string_lossy().to_string());
        let store = LocalStore::open_sled(config).unwrap();

        store.save_documents(&[Document::new("Persisted")]).unwrap();

        let loaded = store.documents();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "Persisted");
    }
}

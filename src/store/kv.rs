//! Key-value backends for the local cache.
//!
//! This module provides the raw persistence layer underneath the typed
//! store. It supports:
//! - A backend-agnostic `KvStore` trait
//! - `MemoryStore`, a lock-guarded map for tests and ephemeral sessions
//! - `SledStore`, a Sled-backed durable mirror of the cache
//!
//! Values are UTF-8 JSON text; typed access lives in `LocalStore`.

use parking_lot::RwLock;
use sled::{Db, Tree};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur in the cache backends
#[derive(Error, Debug)]
pub enum KvError {
    #[error("Sled database error: {0}")]
    Sled(#[from] sled::Error),

    #[error("Stored value under '{0}' is not valid UTF-8")]
    NotUtf8(String),

    #[error("Cache initialization failed: {0}")]
    InitFailed(String),
}

/// Result type for backend operations
pub type KvResult<T> = Result<T, KvError>;

/// Backend-agnostic key-value access for the local cache
pub trait KvStore: Send + Sync {
    /// Read the value stored under a key
    fn get(&self, key: &str) -> KvResult<Option<String>>;

    /// Store a value under a key, replacing any previous value
    fn put(&self, key: &str, value: &str) -> KvResult<()>;

    /// Remove a key and its value
    fn remove(&self, key: &str) -> KvResult<()>;

    /// List all keys currently present
    fn keys(&self) -> KvResult<Vec<String>>;
}

/// In-memory backend for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty in-memory backend
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> KvResult<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> KvResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> KvResult<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}

/// Tree holding the cache entries
const TREE_CACHE: &str = "cache";

/// Configuration for the Sled-backed cache
#[derive(Debug, Clone)]
pub struct SledConfig {
    /// Path to the Sled database directory
    pub path: String,
    /// Cache size in bytes
    pub cache_size: u64,
    /// Flush interval in milliseconds (0 = immediate)
    pub flush_interval_ms: u64,
}

impl Default for SledConfig {
    fn default() -> Self {
        Self {
            path: "./data/docvault.sled".to_string(),
            cache_size: 64 * 1024 * 1024, // 64MB
            flush_interval_ms: 500,
        }
    }
}

impl SledConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_cache_size(mut self, size: u64) -> Self {
        self.cache_size = size;
        self
    }
}

/// Sled-backed durable store for the local cache
#[derive(Clone)]
pub struct SledStore {
    db: Arc<Db>,
    cache: Tree,
}

impl SledStore {
    /// Open or create a store at the configured path
    pub fn open(config: SledConfig) -> KvResult<Self> {
        let path = Path::new(&config.path);

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                KvError::InitFailed(format!("Failed to create directory: {}", e))
            })?;
        }

        let db = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_size)
            .flush_every_ms(if config.flush_interval_ms > 0 {
                Some(config.flush_interval_ms)
            } else {
                None
            })
            .open()?;

        let cache = db.open_tree(TREE_CACHE)?;

        Ok(Self {
            db: Arc::new(db),
            cache,
        })
    }

    /// Open with default configuration
    pub fn open_default() -> KvResult<Self> {
        Self::open(SledConfig::default())
    }

    /// Force flush all pending writes to disk
    pub fn flush(&self) -> KvResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl KvStore for SledStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        match self.cache.get(key.as_bytes())? {
            Some(data) => {
                let text = String::from_utf8(data.to_vec())
                    .map_err(|_| KvError::NotUtf8(key.to_string()))?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &str) -> KvResult<()> {
        self.cache.insert(key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    fn remove(&self, key: &str) -> KvResult<()> {
        self.cache.remove(key.as_bytes())?;
        Ok(())
    }

    fn keys(&self) -> KvResult<Vec<String>> {
        let mut keys = Vec::new();
        for item in self.cache.iter() {
            let (key, _) = item?;
            keys.push(String::from_utf8_lossy(&key).to_string());
        }
        Ok(keys)
    }
}

impl Drop for SledStore {
    fn drop(&mut self) {
        // Attempt to flush on drop, but don't panic
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sled_store(dir: &Path) -> SledStore {
        let config = SledConfig::new(dir.join("cache.sled").to_string_lossy().to_string());
        SledStore::open(config).unwrap()
    }

    #[test]
    fn test_memory_put_get() {
        let store = MemoryStore::new();

        store.put("documents", "[]").unwrap();

        assert_eq!(store.get("documents").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_memory_missing_key() {
        let store = MemoryStore::new();
        assert!(store.get("documents").unwrap().is_none());
    }

    #[test]
    fn test_memory_remove() {
        let store = MemoryStore::new();

        store.put("folders", "[]").unwrap();
        store.remove("folders").unwrap();

        assert!(store.get("folders").unwrap().is_none());
    }

    #[test]
    fn test_memory_overwrite() {
        let store = MemoryStore::new();

        store.put("recent_searches", r#"["a"]"#).unwrap();
        store.put("recent_searches", r#"["b"]"#).unwrap();

        assert_eq!(
            store.get("recent_searches").unwrap().as_deref(),
            Some(r#"["b"]"#)
        );
    }

    #[test]
    fn test_memory_keys() {
        let store = MemoryStore::new();

        store.put("documents", "[]").unwrap();
        store.put("folders", "[]").unwrap();

        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["documents", "folders"]);
    }

    #[test]
    fn test_sled_put_get() {
        let dir = tempdir().unwrap();
        let store = sled_store(dir.path());

        store.put("documents", r#"[{"id":"a"}]"#).unwrap();

        assert_eq!(
            store.get("documents").unwrap().as_deref(),
            Some(r#"[{"id":"a"}]"#)
        );
    }

    #[test]
    fn test_sled_survives_reopen() {
        let dir = tempdir().unwrap();

        {
            let store = sled_store(dir.path());
            store.put("documents", r#"[{"id":"a"}]"#).unwrap();
            store.flush().unwrap();
        }

        let store = sled_store(dir.path());
        assert_eq!(
            store.get("documents").unwrap().as_deref(),
            Some(r#"[{"id":"a"}]"#)
        );
    }

    #[test]
    fn test_sled_unicode_values() {
        let dir = tempdir().unwrap();
        let store = sled_store(dir.path());

        store.put("documents", r#"[{"title":"测试文档"}]"#).unwrap();

        let loaded = store.get("documents").unwrap().unwrap();
        assert!(loaded.contains("测试文档"));
    }

    #[test]
    fn test_sled_remove() {
        let dir = tempdir().unwrap();
        let store = sled_store(dir.path());

        store.put("userActivities", "[]").unwrap();
        store.remove("userActivities").unwrap();

        assert!(store.get("userActivities").unwrap().is_none());
    }
}

//! Client-side data core for a document vault.
//!
//! This crate implements the local data layer of a document library
//! application:
//! - A persisted local cache with typed, fail-soft accessors
//! - Document, folder, and activity models with bounded retention
//! - Relevance-ranked free-text search with a recent-search list
//! - Dashboard and per-file statistics aggregation
//! - Destructive reconciliation against a storage backend
//! - An audit log query layer with CSV export
//!
//! The embedding application owns the UI, authentication, and tracing
//! subscriber installation; this crate only emits `tracing` events.

pub mod backend;
pub mod library;
pub mod logs;
pub mod reconcile;
pub mod search;
pub mod stats;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use backend::{
    AuditLogBackend, BackendConfig, BackendError, BackendResult, FileStorageBackend, HttpBackend,
};
pub use library::{
    ActivityKind, Document, DocumentPatch, Folder, LibraryError, LibraryManager, UserActivity,
};
pub use logs::{AuditAction, LogExplorer, LogPage, LogQuery};
pub use reconcile::{detect_test_data, ReconcileError, Reconciler, SyncReport};
pub use search::{SearchEngine, SearchResult};
pub use stats::{DashboardStats, FileStatsQuery, StatsAggregator};
pub use store::{LocalStore, SledConfig, StoreError};

use std::sync::Arc;

/// Every component bundled over a shared cache and backend.
///
/// The embedding application builds one of these at startup and hands out
/// the parts it needs.
#[derive(Clone)]
pub struct DocVault {
    pub library: LibraryManager,
    pub search: SearchEngine,
    pub stats: StatsAggregator,
    pub reconciler: Reconciler,
    pub logs: LogExplorer,
}

impl DocVault {
    /// Bundle the components over the given cache and backend
    pub fn new<B>(store: LocalStore, backend: Arc<B>) -> Self
    where
        B: FileStorageBackend + AuditLogBackend + 'static,
    {
        let files: Arc<dyn FileStorageBackend> = backend.clone();
        let audit: Arc<dyn AuditLogBackend> = backend;

        Self {
            library: LibraryManager::new(store.clone()),
            search: SearchEngine::new(store.clone()),
            stats: StatsAggregator::new(store.clone(), files.clone()),
            reconciler: Reconciler::new(store, files),
            logs: LogExplorer::new(audit),
        }
    }

    /// Bundle over an HTTP backend configured from the environment
    pub fn from_env(store: LocalStore) -> Result<Self, BackendError> {
        let backend = Arc::new(HttpBackend::from_env()?);
        Ok(Self::new(store, backend))
    }
}

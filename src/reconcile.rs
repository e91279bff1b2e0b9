//! Test-data detection and backend reconciliation.
//!
//! Reconciliation replaces the local document list wholesale with the
//! backend's file listing. It is deliberately destructive: local-only
//! documents are discarded, folder assignments reset to the root, and
//! counters start from zero. No step is rolled back on failure, so a
//! failed reset can leave the cache cleared but unsynced.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::backend::{download_path, BackendError, FileStorageBackend, RemoteFile};
use crate::library::{Document, DocumentFile, ROOT_FOLDER_ID};
use crate::store::{LocalStore, StoreError};

/// Substring in a title or description marking seeded demo content
pub const TEST_DATA_MARKER: &str = "测试";
/// Category label applied to seeded demo content
pub const TEST_CATEGORY_LABEL: &str = "测试数据";
/// Category assigned to documents reconciled from the backend
pub const SYNCED_CATEGORY: &str = "真实文件";
/// Tag marking documents reconciled from the backend
pub const SYNCED_TAG: &str = "真实数据";

/// Errors that can occur during reconciliation
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Cache error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for reconciliation operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Outcome of a reconciliation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Documents now in the local cache
    pub synced: usize,
    /// Local documents discarded by the replace
    pub discarded: usize,
}

/// True when any document looks like seeded demo content: the marker in
/// its title or description, or the demo category label. The flag is
/// derived on the fly; nothing is stored on the entities.
pub fn detect_test_data(documents: &[Document]) -> bool {
    documents.iter().any(|doc| {
        doc.title.contains(TEST_DATA_MARKER)
            || doc.description.contains(TEST_DATA_MARKER)
            || doc.category == TEST_CATEGORY_LABEL
    })
}

/// Guess a MIME type from a filename extension
pub fn guess_mime(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());

    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("ppt") => "application/vnd.ms-powerpoint",
        Some("pptx") => {
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        }
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("zip") => "application/zip",
        Some("mp4") => "video/mp4",
        Some("mp3") => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

/// Build a fresh local document for a backend file
fn document_from_remote(file: RemoteFile) -> Document {
    let title = file.display_name().to_string();
    let created = file.created_at.unwrap_or_else(Utc::now);
    let updated = file.modified_at.unwrap_or(created);

    let mut doc = Document::new(title)
        .with_category(SYNCED_CATEGORY)
        .with_tags(vec![SYNCED_TAG.to_string()])
        .with_folder(ROOT_FOLDER_ID)
        .with_files(vec![DocumentFile {
            url: download_path(&file.name),
            mime_type: guess_mime(&file.name).to_string(),
            size: file.size,
            name: file.name,
        }]);
    doc.created_at = created;
    doc.updated_at = updated;
    doc
}

/// Orchestrates destructive reconciliation between the local cache and
/// the storage backend
#[derive(Clone)]
pub struct Reconciler {
    store: LocalStore,
    backend: Arc<dyn FileStorageBackend>,
}

impl Reconciler {
    pub fn new(store: LocalStore, backend: Arc<dyn FileStorageBackend>) -> Self {
        Self { store, backend }
    }

    /// Whether the current cache contains seeded demo content
    pub fn has_test_data(&self) -> bool {
        detect_test_data(&self.store.documents())
    }

    /// Replace the local document list with the backend's file listing.
    ///
    /// Local-only documents are discarded; this is a replace, not a merge.
    pub async fn sync_backend_documents(&self) -> ReconcileResult<SyncReport> {
        let files = self.backend.list_files().await?;
        let discarded = self.store.documents().len();

        let documents: Vec<Document> = files.into_iter().map(document_from_remote).collect();
        self.store.save_documents(&documents)?;

        info!(
            "Reconciled {} backend files into the local cache, discarding {} local documents",
            documents.len(),
            discarded
        );

        Ok(SyncReport {
            synced: documents.len(),
            discarded,
        })
    }

    /// Remove every locally cached collection: documents, folders,
    /// activity history, and recent searches. Confirmation is the
    /// caller's concern; a failure part-way leaves earlier removals in
    /// place.
    pub fn clear_all_data(&self) -> ReconcileResult<()> {
        warn!("Clearing all locally cached library data");
        self.store.clear_all()?;
        Ok(())
    }

    /// Clear the local cache, then reconcile from the backend.
    ///
    /// The two steps are not atomic: when the sync fails, the cache stays
    /// cleared.
    pub async fn reset_to_production(&self) -> ReconcileResult<SyncReport> {
        self.clear_all_data()?;
        self.sync_backend_documents().await
    }
}

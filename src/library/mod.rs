//! Document library state and mutation surface.
//!
//! This module provides:
//! - The `Document`, `Folder`, and `UserActivity` models
//! - `LibraryManager`, the mutation surface over the local cache
//! - Activity recording with bounded retention
//!
//! Every operation goes through [`LocalStore`]; nothing here touches raw
//! cache keys. There is no cross-operation locking: concurrent mutations
//! race and the last writer wins.

mod activity;
mod documents;
mod folders;

pub use activity::{
    generate_activity_id, ActivityData, ActivityKind, ActivityRecorder, UserActivity,
    ACTIVITY_RETENTION_CAP,
};
pub use documents::{Document, DocumentFile, DocumentPatch, FilePermissions};
pub use folders::{folder_path, Folder, ROOT_FOLDER_ID, ROOT_FOLDER_NAME};

use thiserror::Error;
use tracing::info;

use crate::store::{LocalStore, StoreError};

/// Document identifier
pub type DocumentId = String;
/// Folder identifier
pub type FolderId = String;

/// Errors that can occur during library operations
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Folder name already exists: {0}")]
    DuplicateFolder(String),

    #[error("Folder name cannot be empty")]
    EmptyFolderName,

    #[error("Cache error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for library operations
pub type LibraryResult<T> = Result<T, LibraryError>;

/// Mutation surface over the persisted library state.
///
/// Reads degrade to empty collections when the cache is unreadable; writes
/// report errors but never roll back previously applied steps.
#[derive(Clone)]
pub struct LibraryManager {
    store: LocalStore,
    recorder: ActivityRecorder,
}

impl LibraryManager {
    pub fn new(store: LocalStore) -> Self {
        let recorder = ActivityRecorder::new(store.clone());
        Self { store, recorder }
    }

    /// The underlying cache handle
    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// The activity recorder
    pub fn recorder(&self) -> &ActivityRecorder {
        &self.recorder
    }

    // ==================== Documents ====================

    /// All documents in the library
    pub fn documents(&self) -> Vec<Document> {
        self.store.documents()
    }

    /// Look up a single document
    pub fn document(&self, id: &str) -> Option<Document> {
        self.store.documents().into_iter().find(|d| d.id == id)
    }

    /// Add a document to the library
    pub fn add_document(&self, document: Document) -> LibraryResult<Document> {
        let mut documents = self.store.documents();
        documents.push(document.clone());
        self.store.save_documents(&documents)?;
        info!("Added document '{}' ({})", document.title, document.id);
        Ok(document)
    }

    /// Apply a partial update to a document's editable fields
    pub fn update_document(&self, id: &str, patch: &DocumentPatch) -> LibraryResult<Document> {
        let mut documents = self.store.documents();
        let doc = documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| LibraryError::DocumentNotFound(id.to_string()))?;

        patch.apply(doc);
        let updated = doc.clone();

        self.store.save_documents(&documents)?;
        Ok(updated)
    }

    /// Remove a document from the library
    pub fn delete_document(&self, id: &str) -> LibraryResult<()> {
        let mut documents = self.store.documents();
        let before = documents.len();
        documents.retain(|d| d.id != id);

        if documents.len() == before {
            return Err(LibraryError::DocumentNotFound(id.to_string()));
        }

        self.store.save_documents(&documents)?;
        info!("Deleted document {}", id);
        Ok(())
    }

    /// Move a document to a folder, or to no folder at all. The target is
    /// not validated; dangling folder references are tolerated.
    pub fn move_document(&self, id: &str, folder_id: Option<FolderId>) -> LibraryResult<Document> {
        let mut documents = self.store.documents();
        let doc = documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| LibraryError::DocumentNotFound(id.to_string()))?;

        doc.folder_id = folder_id;
        doc.touch();
        let updated = doc.clone();

        self.store.save_documents(&documents)?;
        Ok(updated)
    }

    /// Flip a document's starred flag, returning the new value
    pub fn toggle_star(&self, id: &str) -> LibraryResult<bool> {
        let mut documents = self.store.documents();
        let doc = documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| LibraryError::DocumentNotFound(id.to_string()))?;

        doc.starred = !doc.starred;
        doc.touch();
        let starred = doc.starred;

        self.store.save_documents(&documents)?;
        Ok(starred)
    }

    /// Bump a document's view counter and append a view event. The counter
    /// is a local approximation; the activity append is best-effort.
    pub fn record_view(&self, id: &str) -> LibraryResult<()> {
        let doc_id = self.bump_counter(id, |doc| doc.views += 1)?;
        let _ = self.recorder.record_view(doc_id);
        Ok(())
    }

    /// Bump a document's download counter and append a download event
    pub fn record_download(&self, id: &str) -> LibraryResult<()> {
        let doc_id = self.bump_counter(id, |doc| doc.downloads += 1)?;
        let _ = self.recorder.record_download(doc_id);
        Ok(())
    }

    fn bump_counter(
        &self,
        id: &str,
        bump: impl FnOnce(&mut Document),
    ) -> LibraryResult<DocumentId> {
        let mut documents = self.store.documents();
        let doc = documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| LibraryError::DocumentNotFound(id.to_string()))?;

        // Counters do not touch updated_at, so recency ordering only moves
        // on content edits
        bump(doc);
        let doc_id = doc.id.clone();

        self.store.save_documents(&documents)?;
        Ok(doc_id)
    }

    // ==================== Folders ====================

    /// All folders, with the synthetic root ensured exactly once, first
    pub fn folders(&self) -> Vec<Folder> {
        let mut folders = vec![Folder::root()];
        folders.extend(self.store.folders().into_iter().filter(|f| !f.is_root()));
        folders
    }

    /// Look up a folder, including the synthetic root
    pub fn folder(&self, id: &str) -> Option<Folder> {
        self.folders().into_iter().find(|f| f.id == id)
    }

    /// Create a folder. Names collide case-sensitively; a duplicate is
    /// rejected with no change to the stored list.
    pub fn create_folder(&self, name: &str, parent_id: Option<FolderId>) -> LibraryResult<Folder> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::EmptyFolderName);
        }

        // The synthetic root participates in the collision check
        if self.folders().iter().any(|f| f.name == name) {
            return Err(LibraryError::DuplicateFolder(name.to_string()));
        }

        let mut folder = Folder::new(name);
        if let Some(parent) = parent_id {
            folder = folder.with_parent(parent);
        }

        let mut stored = self.store.folders();
        stored.push(folder.clone());
        self.store.save_folders(&stored)?;
        info!("Created folder '{}' at {}", folder.name, folder.path);
        Ok(folder)
    }
}

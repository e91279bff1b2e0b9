//! Document model for the library.
//!
//! Documents are the unit of content in the vault. Each one carries its
//! attached files, free-form tags, local view/download counters, and an
//! optional folder assignment. Counters are local approximations and are
//! never pushed upstream; folder references are not validated, so dangling
//! ids are tolerated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access flags attached to a document. Advisory only; enforcement is the
/// embedding application's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePermissions {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_share: bool,
}

impl Default for FilePermissions {
    fn default() -> Self {
        Self {
            can_view: true,
            can_edit: true,
            can_delete: true,
            can_share: true,
        }
    }
}

impl FilePermissions {
    /// Permissions granting every action
    pub fn full() -> Self {
        Self::default()
    }

    /// Viewing only
    pub fn read_only() -> Self {
        Self {
            can_view: true,
            can_edit: false,
            can_delete: false,
            can_share: false,
        }
    }
}

/// A stored file belonging to a document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFile {
    /// Stored filename
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// MIME type
    pub mime_type: String,
    /// Retrieval path or URL
    pub url: String,
}

/// A document in the library
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Unique document identifier
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Free-form labels, order preserved
    pub tags: Vec<String>,
    /// Files attached to this document
    pub files: Vec<DocumentFile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Local view counter, never pushed upstream
    pub views: u64,
    /// Local download counter, never pushed upstream
    pub downloads: u64,
    pub starred: bool,
    /// Containing folder; dangling references are tolerated
    pub folder_id: Option<String>,
    pub permissions: FilePermissions,
}

impl Document {
    /// Create a document with a fresh id and zeroed counters
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: String::new(),
            category: String::new(),
            tags: Vec::new(),
            files: Vec::new(),
            created_at: now,
            updated_at: now,
            views: 0,
            downloads: 0,
            starred: false,
            folder_id: None,
            permissions: FilePermissions::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }

    pub fn with_files(mut self, files: Vec<DocumentFile>) -> Self {
        self.files = files;
        self
    }

    /// Update modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Partial update applied to a document's editable fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl DocumentPatch {
    /// Apply the patch, bumping the modification timestamp
    pub fn apply(&self, doc: &mut Document) {
        if let Some(title) = &self.title {
            doc.title = title.clone();
        }
        if let Some(description) = &self.description {
            doc.description = description.clone();
        }
        if let Some(category) = &self.category {
            doc.category = category.clone();
        }
        if let Some(tags) = &self.tags {
            doc.tags = tags.clone();
        }
        doc.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_defaults() {
        let doc = Document::new("Handbook");

        assert_eq!(doc.title, "Handbook");
        assert_eq!(doc.views, 0);
        assert_eq!(doc.downloads, 0);
        assert!(!doc.starred);
        assert!(doc.folder_id.is_none());
        assert!(doc.permissions.can_view);
        assert_eq!(doc.created_at, doc.updated_at);
    }

    #[test]
    fn test_builders() {
        let doc = Document::new("Handbook")
            .with_description("Employee handbook")
            .with_category("HR")
            .with_tags(vec!["onboarding".to_string()])
            .with_folder("folder-1");

        assert_eq!(doc.description, "Employee handbook");
        assert_eq!(doc.category, "HR");
        assert_eq!(doc.tags, vec!["onboarding"]);
        assert_eq!(doc.folder_id.as_deref(), Some("folder-1"));
    }

    #[test]
    fn test_unique_ids() {
        let a = Document::new("A");
        let b = Document::new("B");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_patch_applies_only_set_fields() {
        let mut doc = Document::new("Old title").with_category("HR");
        let patch = DocumentPatch {
            title: Some("New title".to_string()),
            ..Default::default()
        };

        patch.apply(&mut doc);

        assert_eq!(doc.title, "New title");
        assert_eq!(doc.category, "HR");
    }

    #[test]
    fn test_patch_touches_timestamp() {
        let mut doc = Document::new("Doc");
        let created = doc.created_at;

        DocumentPatch::default().apply(&mut doc);

        assert!(doc.updated_at >= created);
    }

    #[test]
    fn test_camel_case_wire_format() {
        let doc = Document::new("Doc").with_folder("f-1");
        let json = serde_json::to_string(&doc).unwrap();

        assert!(json.contains("\"folderId\":\"f-1\""));
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"canShare\""));
    }

    #[test]
    fn test_read_only_permissions() {
        let perms = FilePermissions::read_only();
        assert!(perms.can_view);
        assert!(!perms.can_edit);
        assert!(!perms.can_delete);
        assert!(!perms.can_share);
    }
}

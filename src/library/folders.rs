//! Folder model and path derivation.
//!
//! Folders are a flat stored list; hierarchy is expressed through
//! `parent_id` references. Every folder carries a derived listing path:
//! `/` followed by a slug of its name (lowercased, whitespace runs
//! collapsed to single hyphens). The root folder is synthetic: id `root`,
//! path `/`, always logically present but never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of the synthetic root folder
pub const ROOT_FOLDER_ID: &str = "root";

/// Display name of the synthetic root folder
pub const ROOT_FOLDER_NAME: &str = "根目录";

/// A folder in the library
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    /// Derived listing path, `/` + slug of the name
    pub path: String,
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Create a folder with a fresh id and derived path
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            path: folder_path(&name),
            name,
            parent_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// The synthetic root folder, materialized on demand
    pub fn root() -> Self {
        let now = Utc::now();
        Self {
            id: ROOT_FOLDER_ID.to_string(),
            name: ROOT_FOLDER_NAME.to_string(),
            path: "/".to_string(),
            parent_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this is the synthetic root
    pub fn is_root(&self) -> bool {
        self.id == ROOT_FOLDER_ID
    }

    /// Update modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Derive the listing path for a folder name
pub fn folder_path(name: &str) -> String {
    format!("/{}", slug(name))
}

/// Lowercase a name and collapse whitespace runs into single hyphens
fn slug(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_derivation() {
        let folder = Folder::new("Meeting Notes");
        assert_eq!(folder.path, "/meeting-notes");
    }

    #[test]
    fn test_slug_collapses_whitespace_runs() {
        assert_eq!(folder_path("Quarterly  Reports"), "/quarterly-reports");
        assert_eq!(folder_path("  padded  "), "/padded");
        assert_eq!(folder_path("Tab\tSeparated"), "/tab-separated");
    }

    #[test]
    fn test_slug_lowercases() {
        assert_eq!(folder_path("ARCHIVE"), "/archive");
    }

    #[test]
    fn test_slug_keeps_unicode() {
        assert_eq!(folder_path("项目 文档"), "/项目-文档");
    }

    #[test]
    fn test_root_folder() {
        let root = Folder::root();

        assert_eq!(root.id, ROOT_FOLDER_ID);
        assert_eq!(root.path, "/");
        assert!(root.is_root());
        assert!(root.parent_id.is_none());
    }

    #[test]
    fn test_unique_ids() {
        let a = Folder::new("A");
        let b = Folder::new("A");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_camel_case_wire_format() {
        let folder = Folder::new("Reports").with_parent(ROOT_FOLDER_ID);
        let json = serde_json::to_string(&folder).unwrap();

        assert!(json.contains("\"parentId\":\"root\""));
        assert!(json.contains("\"createdAt\""));
    }
}

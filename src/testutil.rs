//! Shared test fixtures: a scripted in-memory backend.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

use crate::backend::{
    AuditLogBackend, BackendError, BackendResult, FileStorageBackend, FileViews, RemoteFile,
    StorageSummary,
};
use crate::logs::{AuditAction, AuditLogEntry, LogPage, LogQuery};

/// A backend whose responses come from in-memory fixtures. Failures can
/// be injected per filename or for the whole listing.
#[derive(Default)]
pub struct FakeBackend {
    files: Vec<RemoteFile>,
    views: HashMap<String, FileViews>,
    failing_views: HashSet<String>,
    fail_listing: bool,
    logs: Vec<AuditLogEntry>,
    cleanup_deleted: u64,
    deleted: Mutex<Vec<String>>,
    moved: Mutex<Vec<(String, String)>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with a scripted view count
    pub fn with_file(mut self, file: RemoteFile, views: u64) -> Self {
        self.views.insert(
            file.name.clone(),
            FileViews {
                view_count: views,
                last_viewed: None,
            },
        );
        self.files.push(file);
        self
    }

    /// Make the view lookup for one file fail
    pub fn failing_view_lookup(mut self, filename: &str) -> Self {
        self.failing_views.insert(filename.to_string());
        self
    }

    /// Make the file listing fail
    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Seed audit log entries, oldest last
    pub fn with_logs(mut self, logs: Vec<AuditLogEntry>) -> Self {
        self.logs = logs;
        self
    }

    /// Script the count reported by the cleanup call
    pub fn with_cleanup_count(mut self, deleted: u64) -> Self {
        self.cleanup_deleted = deleted;
        self
    }

    /// Ids passed to `delete_file`, in call order
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().clone()
    }

    /// Id/folder pairs passed to `move_file`, in call order
    pub fn moved(&self) -> Vec<(String, String)> {
        self.moved.lock().clone()
    }
}

#[async_trait]
impl FileStorageBackend for FakeBackend {
    async fn list_files(&self) -> BackendResult<Vec<RemoteFile>> {
        if self.fail_listing {
            return Err(BackendError::Api("file listing unavailable".to_string()));
        }
        Ok(self.files.clone())
    }

    async fn view_count(&self, filename: &str) -> BackendResult<FileViews> {
        if self.failing_views.contains(filename) {
            return Err(BackendError::Api(format!("no stats for {}", filename)));
        }
        Ok(self.views.get(filename).cloned().unwrap_or_default())
    }

    async fn download(&self, filename: &str) -> BackendResult<Vec<u8>> {
        Ok(filename.as_bytes().to_vec())
    }

    async fn delete_file(&self, id: &str) -> BackendResult<()> {
        self.deleted.lock().push(id.to_string());
        Ok(())
    }

    async fn move_file(&self, id: &str, folder: &str) -> BackendResult<()> {
        self.moved.lock().push((id.to_string(), folder.to_string()));
        Ok(())
    }

    async fn storage_stats(&self) -> BackendResult<StorageSummary> {
        Ok(StorageSummary {
            total_files: self.files.len() as u64,
            total_folders: 0,
            total_size: self.files.iter().map(|f| f.size).sum(),
            storage_path: "/srv/storage".to_string(),
        })
    }
}

#[async_trait]
impl AuditLogBackend for FakeBackend {
    async fn query_logs(&self, query: &LogQuery) -> BackendResult<LogPage> {
        let page_size = query.page_size.max(1) as usize;
        let total = self.logs.len() as u64;
        let total_pages = ((self.logs.len() + page_size - 1) / page_size) as u32;
        let start = (query.page.saturating_sub(1) as usize) * page_size;

        let logs = self
            .logs
            .iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect();

        Ok(LogPage {
            logs,
            total,
            total_pages,
        })
    }

    async fn cleanup_logs(&self) -> BackendResult<u64> {
        Ok(self.cleanup_deleted)
    }
}

/// A backend file fixture
pub fn remote_file(name: &str, size: u64) -> RemoteFile {
    RemoteFile {
        name: name.to_string(),
        original_name: None,
        size,
        uploader: None,
        created_at: Some(Utc::now()),
        modified_at: None,
    }
}

/// An audit log entry fixture
pub fn audit_entry(id: &str, user_id: &str, username: &str, action: AuditAction) -> AuditLogEntry {
    AuditLogEntry {
        id: id.to_string(),
        user_id: user_id.to_string(),
        username: username.to_string(),
        action,
        timestamp: Utc::now(),
        ip: String::new(),
        details: serde_json::Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_backend_records_maintenance_calls() {
        let backend = FakeBackend::new();

        backend.delete_file("file-1").await.unwrap();
        backend.move_file("file-2", "archive").await.unwrap();

        assert_eq!(backend.deleted(), vec!["file-1"]);
        assert_eq!(
            backend.moved(),
            vec![("file-2".to_string(), "archive".to_string())]
        );
    }

    #[tokio::test]
    async fn test_fake_backend_injected_failures() {
        let backend = FakeBackend::new()
            .with_file(remote_file("a.pdf", 1), 3)
            .failing_view_lookup("a.pdf");

        assert!(backend.view_count("a.pdf").await.is_err());
        assert!(FakeBackend::new()
            .failing_listing()
            .list_files()
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_fake_backend_download_echoes_name() {
        let backend = FakeBackend::new();
        let bytes = backend.download("notes.txt").await.unwrap();
        assert_eq!(bytes, b"notes.txt");
    }
}

//! Storage backend API surface.
//!
//! This module provides:
//! - DTOs for files and storage statistics as the backend reports them
//! - The `FileStorageBackend` and `AuditLogBackend` traits
//! - The `{success, message, data}` response envelope
//!
//! Backend failures always surface as a typed [`BackendError`] carrying a
//! human-readable message; they never panic across this boundary.

mod http;

pub use http::{BackendConfig, HttpBackend, DEFAULT_BASE_URL};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logs::{LogPage, LogQuery};

/// Errors reported by a storage backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend rejected the request: {0}")]
    Api(String),

    #[error("Unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Response envelope used by every backend endpoint.
///
/// `serde(default)` on `data` would put a `T: Default` bound on the
/// derived `Deserialize`; a missing `Option` field reads as `None`
/// without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload, converting `success == false` or a missing body
    /// into a backend error
    pub fn into_data(self) -> BackendResult<T> {
        if !self.success {
            return Err(BackendError::Api(
                self.message
                    .unwrap_or_else(|| "Unknown backend error".to_string()),
            ));
        }
        self.data
            .ok_or_else(|| BackendError::Api("Response contained no data".to_string()))
    }

    /// Check only the success flag, ignoring any payload
    pub fn ack(self) -> BackendResult<()> {
        if self.success {
            Ok(())
        } else {
            Err(BackendError::Api(
                self.message
                    .unwrap_or_else(|| "Unknown backend error".to_string()),
            ))
        }
    }
}

/// A file as listed by the storage backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    /// Stored filename, unique on the backend
    pub name: String,
    /// Name the file was uploaded under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl RemoteFile {
    /// Preferred display name
    pub fn display_name(&self) -> &str {
        self.original_name.as_deref().unwrap_or(&self.name)
    }
}

/// View tracking for a single stored file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileViews {
    #[serde(default)]
    pub view_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_viewed: Option<DateTime<Utc>>,
}

/// Aggregate storage statistics reported by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSummary {
    pub total_files: u64,
    pub total_folders: u64,
    /// Total stored bytes
    pub total_size: u64,
    pub storage_path: String,
}

/// Relative retrieval path for a stored file, as embedded in reconciled
/// document records
pub fn download_path(filename: &str) -> String {
    format!("/api/files/download/{}", filename)
}

/// File listing, retrieval, and maintenance operations of the backend
#[async_trait]
pub trait FileStorageBackend: Send + Sync {
    /// List every stored file
    async fn list_files(&self) -> BackendResult<Vec<RemoteFile>>;

    /// View tracking for a stored file
    async fn view_count(&self, filename: &str) -> BackendResult<FileViews>;

    /// Download a stored file's bytes
    async fn download(&self, filename: &str) -> BackendResult<Vec<u8>>;

    /// Delete a stored file
    async fn delete_file(&self, id: &str) -> BackendResult<()>;

    /// Move a stored file into another backend folder
    async fn move_file(&self, id: &str, folder: &str) -> BackendResult<()>;

    /// Aggregate storage statistics
    async fn storage_stats(&self) -> BackendResult<StorageSummary>;
}

/// Audit log query and maintenance operations of the backend
#[async_trait]
pub trait AuditLogBackend: Send + Sync {
    /// Fetch a page of audit log entries
    async fn query_logs(&self, query: &LogQuery) -> BackendResult<LogPage>;

    /// Delete entries older than the retention window, returning the count
    async fn cleanup_logs(&self) -> BackendResult<u64>;
}

//! Audit log query layer.
//!
//! Log entries live on the backend; this module provides:
//! - Typed queries with 1-based, backend-driven pagination
//! - Client-side page clamping for navigation
//! - CSV export of the currently loaded page
//! - The retention cleanup call
//!
//! A backend failure surfaces as a single error; no partial page state is
//! kept.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

use crate::backend::{AuditLogBackend, BackendResult};

/// Days an audit log entry is retained before cleanup removes it
pub const LOG_RETENTION_DAYS: u32 = 7;

/// Default number of entries per page
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Action recorded in an audit log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Login,
    Logout,
    Upload,
    Download,
    Delete,
    Move,
    Search,
    Admin,
}

impl AuditAction {
    /// Stable wire name used in queries and storage
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Upload => "upload",
            Self::Download => "download",
            Self::Delete => "delete",
            Self::Move => "move",
            Self::Search => "search",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Login => "Login",
            Self::Logout => "Logout",
            Self::Upload => "Upload",
            Self::Download => "Download",
            Self::Delete => "Delete",
            Self::Move => "Move",
            Self::Search => "Search",
            Self::Admin => "Admin",
        };
        write!(f, "{}", label)
    }
}

/// A single audit log entry as the backend reports it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub action: AuditAction,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub ip: String,
    /// Free-form context, shape depends on the action
    #[serde(default)]
    pub details: serde_json::Value,
}

/// Query parameters for an audit log page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<AuditAction>,
    /// Inclusive lower bound on the entry date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the entry date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
            action: None,
            start_date: None,
            end_date: None,
        }
    }
}

impl LogQuery {
    /// Query for a specific page with default settings
    pub fn page(page: u32) -> Self {
        Self {
            page,
            ..Default::default()
        }
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }
}

/// A page of audit log entries with pagination totals
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPage {
    pub logs: Vec<AuditLogEntry>,
    /// Total matching entries across all pages
    pub total: u64,
    pub total_pages: u32,
}

/// Clamp a requested page into the valid range. A result with zero pages
/// still has page 1 as the only valid target.
pub fn clamp_page(requested: u32, total_pages: u32) -> u32 {
    requested.max(1).min(total_pages.max(1))
}

/// Client-side handle over the audit log backend
#[derive(Clone)]
pub struct LogExplorer {
    backend: Arc<dyn AuditLogBackend>,
}

impl LogExplorer {
    pub fn new(backend: Arc<dyn AuditLogBackend>) -> Self {
        Self { backend }
    }

    /// Fetch a page of log entries
    pub async fn fetch(&self, query: &LogQuery) -> BackendResult<LogPage> {
        self.backend.query_logs(query).await
    }

    /// Fetch a neighbouring page of an already loaded result, clamping the
    /// requested page into range
    pub async fn fetch_page(
        &self,
        query: &LogQuery,
        page: u32,
        loaded: &LogPage,
    ) -> BackendResult<LogPage> {
        let mut query = query.clone();
        query.page = clamp_page(page, loaded.total_pages);
        self.fetch(&query).await
    }

    /// Delete entries older than the retention window
    pub async fn cleanup_expired(&self) -> BackendResult<u64> {
        let deleted = self.backend.cleanup_logs().await?;
        info!(
            "Removed {} audit log entries older than {} days",
            deleted, LOG_RETENTION_DAYS
        );
        Ok(deleted)
    }
}

/// Serialize the currently loaded page as CSV. Only the loaded page is
/// exported, never the full result set. The details column is the JSON
/// text of the value whatever its shape, so strings keep their quotes
/// and a null is literal.
pub fn export_csv(page: &LogPage) -> String {
    let mut out = String::from("ID,User ID,Username,Action,Timestamp,IP,Details\n");

    for entry in &page.logs {
        let details = entry.details.to_string();

        let row = [
            entry.id.as_str(),
            entry.user_id.as_str(),
            entry.username.as_str(),
            &entry.action.to_string(),
            &entry.timestamp.to_rfc3339(),
            entry.ip.as_str(),
            &details,
        ];

        let fields: Vec<String> = row.iter().map(|field| csv_field(field)).collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out
}

/// Quote a field when needed, doubling embedded quotes
fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

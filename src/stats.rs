//! Dashboard metrics and per-file statistics.
//!
//! Two aggregation paths live here:
//! - `dashboard()`, a purely local summary over the cached library. It is
//!   infallible: degraded inputs produce zeroed or empty fields.
//! - `file_statistics()`, which joins the backend file listing with
//!   per-file view lookups. Lookups run concurrently and fail per item: a
//!   failed lookup zeroes that file's stats and logs the failure without
//!   failing the batch.

use chrono::{DateTime, Duration, Local, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::backend::{BackendResult, FileStorageBackend, FileViews};
use crate::library::{ActivityKind, Document, UserActivity};
use crate::store::LocalStore;

/// Documents shown in the dashboard recency list
const RECENT_DOCUMENT_COUNT: usize = 5;
/// Activity events shown in the dashboard feed
const RECENT_ACTIVITY_COUNT: usize = 10;

/// Aggregate dashboard metrics over the local library
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_documents: usize,
    /// Stored folders only; the synthetic root is not counted
    pub total_folders: usize,
    /// View events recorded today, by the local calendar date
    pub today_views: u64,
    /// View events recorded in the last seven days
    pub weekly_views: u64,
    /// Sum of per-document view counters
    pub total_views: u64,
    /// Sum of per-document download counters
    pub total_downloads: u64,
    pub starred_documents: usize,
    /// Most recently updated documents, newest first
    pub recent_documents: Vec<Document>,
    /// Latest activity events, newest first
    pub recent_activities: Vec<UserActivity>,
}

/// Popularity tier derived from a view count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Popularity {
    Unseen,
    Low,
    Medium,
    High,
}

impl Popularity {
    /// Tier for a view count: 0 unseen, 1-5 low, 6-20 medium, above 20 high
    pub fn from_views(views: u64) -> Self {
        match views {
            0 => Self::Unseen,
            1..=5 => Self::Low,
            6..=20 => Self::Medium,
            _ => Self::High,
        }
    }
}

/// Per-file statistics joined from the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatistic {
    /// Stored filename on the backend
    pub filename: String,
    /// Name the file was uploaded under
    pub original_name: String,
    pub view_count: u64,
    pub size: u64,
    pub uploader: String,
    pub upload_time: Option<DateTime<Utc>>,
    pub last_viewed: Option<DateTime<Utc>>,
}

impl FileStatistic {
    /// Popularity tier for this file
    pub fn popularity(&self) -> Popularity {
        Popularity::from_views(self.view_count)
    }
}

/// File statistics with batch aggregates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatsReport {
    pub files: Vec<FileStatistic>,
    /// Sum of all view counts in the batch
    pub total_views: u64,
    /// Highest view count in the batch; the first-listed file wins ties
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_viewed: Option<FileStatistic>,
}

/// Sort key for file statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileSortKey {
    ViewCount,
    UploadTime,
    Size,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Client-local filter and sort applied to a statistics listing
#[derive(Debug, Clone)]
pub struct FileStatsQuery {
    /// Case-insensitive substring matched against the original name or
    /// uploader
    pub filter: Option<String>,
    pub sort_by: FileSortKey,
    pub order: SortOrder,
}

impl Default for FileStatsQuery {
    fn default() -> Self {
        Self {
            filter: None,
            sort_by: FileSortKey::UploadTime,
            order: SortOrder::Desc,
        }
    }
}

/// Apply a filter and sort to an already fetched listing
pub fn apply_query(stats: &[FileStatistic], query: &FileStatsQuery) -> Vec<FileStatistic> {
    let mut out: Vec<FileStatistic> = match &query.filter {
        Some(filter) if !filter.trim().is_empty() => {
            let needle = filter.trim().to_lowercase();
            stats
                .iter()
                .filter(|s| {
                    s.original_name.to_lowercase().contains(&needle)
                        || s.uploader.to_lowercase().contains(&needle)
                })
                .cloned()
                .collect()
        }
        _ => stats.to_vec(),
    };

    out.sort_by(|a, b| {
        let ordering = match query.sort_by {
            FileSortKey::ViewCount => a.view_count.cmp(&b.view_count),
            FileSortKey::Size => a.size.cmp(&b.size),
            FileSortKey::UploadTime => a.upload_time.cmp(&b.upload_time),
        };
        match query.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    out
}

/// Aggregate storage statistics with a display-ready size
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageOverview {
    pub total_files: u64,
    pub total_folders: u64,
    pub total_size: u64,
    pub total_size_display: String,
    pub storage_path: String,
}

/// Render a byte count as a human-readable size with one decimal
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let value = bytes as f64;
    if value >= GB {
        format!("{:.1} GB", value / GB)
    } else if value >= MB {
        format!("{:.1} MB", value / MB)
    } else if value >= KB {
        format!("{:.1} KB", value / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// Builds dashboard and file statistics from the local cache and backend
#[derive(Clone)]
pub struct StatsAggregator {
    store: LocalStore,
    backend: Arc<dyn FileStorageBackend>,
}

impl StatsAggregator {
    pub fn new(store: LocalStore, backend: Arc<dyn FileStorageBackend>) -> Self {
        Self { store, backend }
    }

    /// Dashboard metrics over the local cache. Never fails; unreadable
    /// inputs appear as zeroed or empty fields.
    pub fn dashboard(&self) -> DashboardStats {
        let documents = self.store.documents();
        let folders = self.store.folders();
        let activities = self.store.activities();

        let today = Local::now().date_naive();
        let week_ago = Utc::now() - Duration::days(7);

        let today_views = activities
            .iter()
            .filter(|a| a.kind == ActivityKind::View)
            .filter(|a| a.timestamp.with_timezone(&Local).date_naive() == today)
            .count() as u64;

        let weekly_views = activities
            .iter()
            .filter(|a| a.kind == ActivityKind::View && a.timestamp >= week_ago)
            .count() as u64;

        let total_views = documents.iter().map(|d| d.views).sum();
        let total_downloads = documents.iter().map(|d| d.downloads).sum();
        let starred_documents = documents.iter().filter(|d| d.starred).count();

        let mut recent_documents = documents.clone();
        recent_documents.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        recent_documents.truncate(RECENT_DOCUMENT_COUNT);

        let recent_activities = activities
            .iter()
            .take(RECENT_ACTIVITY_COUNT)
            .cloned()
            .collect();

        DashboardStats {
            total_documents: documents.len(),
            total_folders: folders.len(),
            today_views,
            weekly_views,
            total_views,
            total_downloads,
            starred_documents,
            recent_documents,
            recent_activities,
        }
    }

    /// Join the backend file listing with per-file view statistics.
    ///
    /// View lookups run concurrently; a failed lookup zeroes that file's
    /// stats and logs the failure without failing the batch.
    pub async fn file_statistics(&self) -> BackendResult<FileStatsReport> {
        let files = self.backend.list_files().await?;

        let lookups = files.iter().map(|f| self.backend.view_count(&f.name));
        let views = join_all(lookups).await;

        let mut stats = Vec::with_capacity(files.len());
        for (file, views) in files.into_iter().zip(views) {
            let views = match views {
                Ok(v) => v,
                Err(e) => {
                    error!("View count lookup failed for '{}': {}", file.name, e);
                    FileViews::default()
                }
            };

            stats.push(FileStatistic {
                original_name: file.display_name().to_string(),
                filename: file.name,
                view_count: views.view_count,
                size: file.size,
                uploader: file.uploader.unwrap_or_else(|| "unknown".to_string()),
                upload_time: file.created_at,
                last_viewed: views.last_viewed,
            });
        }

        let total_views = stats.iter().map(|s| s.view_count).sum();

        let mut most_viewed: Option<FileStatistic> = None;
        for stat in &stats {
            let better = match &most_viewed {
                // Strictly greater, so the first-listed file wins ties
                Some(current) => stat.view_count > current.view_count,
                None => true,
            };
            if better {
                most_viewed = Some(stat.clone());
            }
        }

        Ok(FileStatsReport {
            files: stats,
            total_views,
            most_viewed,
        })
    }

    /// Backend storage totals with a display-ready size
    pub async fn storage_overview(&self) -> BackendResult<StorageOverview> {
        let summary = self.backend.storage_stats().await?;
        Ok(StorageOverview {
            total_files: summary.total_files,
            total_folders: summary.total_folders,
            total_size: summary.total_size,
            total_size_display: format_size(summary.total_size),
            storage_path: summary.storage_path,
        })
    }
}

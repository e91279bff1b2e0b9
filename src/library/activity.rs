//! Activity recording with bounded retention.
//!
//! Every notable user action appends an event to the activity list,
//! newest first. The list is truncated to a fixed cap on every append;
//! older records are discarded permanently. Recording is fire-and-forget
//! telemetry: persistence failures are logged and reported, but callers
//! are free to ignore them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::{LocalStore, StoreError};

/// Maximum number of activity records retained
pub const ACTIVITY_RETENTION_CAP: usize = 1000;

/// Kind of user activity event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Visit,
    View,
    Download,
    Upload,
}

/// Payload attached to an activity event, keyed by kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityData {
    /// Page identifier, for visits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    /// Document id, for views and downloads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    /// File name, for uploads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// A recorded user activity event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    /// Millisecond timestamp plus a random fraction, as a decimal string
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub timestamp: DateTime<Utc>,
    pub data: ActivityData,
}

/// Generate an activity id: current Unix milliseconds plus a random
/// fraction, so events from the same millisecond still differ
pub fn generate_activity_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let fraction: f64 = rand::random();
    format!("{}.{:06}", millis, (fraction * 1_000_000.0) as u32)
}

/// Records user activity events into the local cache
#[derive(Clone)]
pub struct ActivityRecorder {
    store: LocalStore,
}

impl ActivityRecorder {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Record an event, newest first, truncating to the retention cap
    pub fn record(
        &self,
        kind: ActivityKind,
        data: ActivityData,
    ) -> Result<UserActivity, StoreError> {
        let activity = UserActivity {
            id: generate_activity_id(),
            kind,
            timestamp: Utc::now(),
            data,
        };

        let mut activities = self.store.activities();
        activities.insert(0, activity.clone());
        activities.truncate(ACTIVITY_RETENTION_CAP);

        if let Err(e) = self.store.save_activities(&activities) {
            warn!("Failed to persist activity event: {}", e);
            return Err(e);
        }

        Ok(activity)
    }

    /// Record a page visit
    pub fn record_visit(&self, page: impl Into<String>) -> Result<UserActivity, StoreError> {
        self.record(
            ActivityKind::Visit,
            ActivityData {
                page: Some(page.into()),
                ..Default::default()
            },
        )
    }

    /// Record a document view
    pub fn record_view(&self, document_id: impl Into<String>) -> Result<UserActivity, StoreError> {
        self.record(
            ActivityKind::View,
            ActivityData {
                document_id: Some(document_id.into()),
                ..Default::default()
            },
        )
    }

    /// Record a document download
    pub fn record_download(
        &self,
        document_id: impl Into<String>,
    ) -> Result<UserActivity, StoreError> {
        self.record(
            ActivityKind::Download,
            ActivityData {
                document_id: Some(document_id.into()),
                ..Default::default()
            },
        )
    }

    /// Record a file upload
    pub fn record_upload(&self, file_name: impl Into<String>) -> Result<UserActivity, StoreError> {
        self.record(
            ActivityKind::Upload,
            ActivityData {
                file_name: Some(file_name.into()),
                ..Default::default()
            },
        )
    }

    /// All recorded events, newest first
    pub fn activities(&self) -> Vec<UserActivity> {
        self.store.activities()
    }
}

//! HTTP implementation of the backend traits.
//!
//! All endpoints speak the `{success, message, data}` envelope except file
//! downloads, which return raw bytes. Requests run with the transport's
//! default timeout; no additional deadline is applied.

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{
    ApiEnvelope, AuditLogBackend, BackendError, BackendResult, FileStorageBackend, FileViews,
    RemoteFile, StorageSummary,
};
use crate::logs::{LogPage, LogQuery};

/// Base URL used when the environment provides none
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Configuration for the HTTP backend
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend API
    pub base_url: String,
}

impl BackendConfig {
    /// Create a config for the given base URL. A trailing slash is
    /// normalized away.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// Create from the `DOCVAULT_API_URL` environment variable
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("DOCVAULT_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), BackendError> {
        if self.base_url.is_empty() {
            return Err(BackendError::Config("Base URL is empty".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(BackendError::Config(format!(
                "Base URL must be http(s): {}",
                self.base_url
            )));
        }
        Ok(())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Reqwest-backed client for the storage backend
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    config: BackendConfig,
}

impl HttpBackend {
    /// Create a client with the given configuration
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        config.validate()?;
        Ok(Self {
            client: reqwest::Client::new(),
            config,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, BackendError> {
        Self::new(BackendConfig::from_env())
    }

    /// The configured base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Endpoint URL with the dynamic segments (filenames, ids)
    /// percent-encoded so characters like `?`, `#`, `/` or spaces stay
    /// inside their path segment.
    fn url_with(&self, path: &str, segments: &[&str]) -> BackendResult<Url> {
        let mut url = Url::parse(&self.url(path))
            .map_err(|e| BackendError::Config(format!("Invalid endpoint URL: {}", e)))?;
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|_| BackendError::Config("URL cannot carry path segments".to_string()))?;
            for segment in segments {
                parts.push(segment);
            }
        }
        Ok(url)
    }

    async fn unwrap_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> BackendResult<ApiEnvelope<T>> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let envelope: ApiEnvelope<T> = serde_json::from_str(&body)?;
        Ok(envelope)
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        Self::unwrap_envelope(response).await?.into_data()
    }
}

#[async_trait]
impl FileStorageBackend for HttpBackend {
    async fn list_files(&self) -> BackendResult<Vec<RemoteFile>> {
        self.get_data("/api/files/list").await
    }

    async fn view_count(&self, filename: &str) -> BackendResult<FileViews> {
        let url = self.url_with("/api/files/view-count", &[filename])?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Self::unwrap_envelope(response).await?.into_data()
    }

    async fn download(&self, filename: &str) -> BackendResult<Vec<u8>> {
        let url = self.url_with("/api/files/download", &[filename])?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn delete_file(&self, id: &str) -> BackendResult<()> {
        let url = self.url_with("/api/files", &[id])?;
        debug!("DELETE {}", url);
        let response = self.client.delete(url).send().await?;
        Self::unwrap_envelope::<serde_json::Value>(response)
            .await?
            .ack()
    }

    async fn move_file(&self, id: &str, folder: &str) -> BackendResult<()> {
        let url = self.url_with("/api/files", &[id, "move"])?;
        debug!("PUT {}", url);
        let response = self
            .client
            .put(url)
            .json(&serde_json::json!({ "folder": folder }))
            .send()
            .await?;
        Self::unwrap_envelope::<serde_json::Value>(response)
            .await?
            .ack()
    }

    async fn storage_stats(&self) -> BackendResult<StorageSummary> {
        self.get_data("/api/storage/stats").await
    }
}

#[async_trait]
impl AuditLogBackend for HttpBackend {
    async fn query_logs(&self, query: &LogQuery) -> BackendResult<LogPage> {
        let url = self.url("/api/logs");
        debug!("GET {} page {}", url, query.page);
        let response = self
            .client
            .get(&url)
            .query(&log_query_params(query))
            .send()
            .await?;
        Self::unwrap_envelope(response).await?.into_data()
    }

    async fn cleanup_logs(&self) -> BackendResult<u64> {
        #[derive(serde::Deserialize)]
        struct CleanupPayload {
            deleted: u64,
        }

        let url = self.url("/api/logs/cleanup");
        debug!("DELETE {}", url);
        let response = self.client.delete(&url).send().await?;
        let payload: CleanupPayload = Self::unwrap_envelope(response).await?.into_data()?;
        Ok(payload.deleted)
    }
}

fn log_query_params(query: &LogQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", query.page.to_string()),
        ("pageSize", query.page_size.to_string()),
    ];
    if let Some(search) = &query.search {
        params.push(("search", search.clone()));
    }
    if let Some(action) = query.action {
        params.push(("action", action.wire_name().to_string()));
    }
    if let Some(start) = query.start_date {
        params.push(("startDate", start.to_string()));
    }
    if let Some(end) = query.end_date {
        params.push(("endDate", end.to_string()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::AuditAction;
    use chrono::NaiveDate;

    #[test]
    fn test_config_normalizes_trailing_slash() {
        let config = BackendConfig::new("http://localhost:3000/");
        assert_eq!(config.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_config_validation() {
        assert!(BackendConfig::default().validate().is_ok());
        assert!(BackendConfig::new("").validate().is_err());
        assert!(BackendConfig::new("ftp://example.com").validate().is_err());
        assert!(BackendConfig::new("https://vault.example.com")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_url_join() {
        let backend = HttpBackend::new(BackendConfig::new("http://localhost:3000/")).unwrap();
        assert_eq!(
            backend.url("/api/files/list"),
            "http://localhost:3000/api/files/list"
        );
    }

    #[test]
    fn test_dynamic_segments_are_percent_encoded() {
        let backend = HttpBackend::new(BackendConfig::default()).unwrap();

        let url = backend
            .url_with("/api/files/view-count", &["q1 report?.pdf"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/files/view-count/q1%20report%3F.pdf"
        );

        // A slash or fragment marker inside a filename must stay inside
        // its segment
        let url = backend.url_with("/api/files", &["a/b#1", "move"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/files/a%2Fb%231/move");
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(HttpBackend::new(BackendConfig::new("not-a-url")).is_err());
    }

    #[test]
    fn test_log_query_params_minimal() {
        let params = log_query_params(&LogQuery::default());
        assert_eq!(
            params,
            vec![("page", "1".to_string()), ("pageSize", "10".to_string())]
        );
    }

    #[test]
    fn test_log_query_params_full() {
        let query = LogQuery::page(3)
            .with_search("ada")
            .with_action(AuditAction::Download)
            .with_date_range(
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            );

        let params = log_query_params(&query);
        assert!(params.contains(&("page", "3".to_string())));
        assert!(params.contains(&("search", "ada".to_string())));
        assert!(params.contains(&("action", "download".to_string())));
        assert!(params.contains(&("startDate", "2025-01-01".to_string())));
        assert!(params.contains(&("endDate", "2025-01-31".to_string())));
    }
}

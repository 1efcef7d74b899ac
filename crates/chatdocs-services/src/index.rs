//! Best-effort bridge to the external search/answer index.
//!
//! Commits and deletes are mirrored to the external service when its
//! endpoint is configured. The metadata and object stores are the source of
//! truth: a notification failure is logged and swallowed, never surfaced to
//! the owning operation, and never retried synchronously.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use uuid::Uuid;

use chatdocs_core::AppConfig;

/// Notification seam between the commit executor and the external index.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// The file was created or its content/metadata changed.
    async fn notify_upserted(&self, file_id: Uuid);

    /// The file was deleted.
    async fn notify_deleted(&self, file_id: Uuid);
}

/// Configuration for the search-index bridge. An absent `base_url` disables
/// the bridge entirely; that is a no-op, not an error.
#[derive(Clone, Debug, Default)]
pub struct SearchIndexConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl SearchIndexConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.search_index_url.clone(),
            api_key: config.search_index_api_key.clone(),
            timeout_seconds: config.search_index_timeout_secs,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }
}

/// HTTP client for the external search index.
#[derive(Clone)]
pub struct SearchIndexService {
    http_client: Client,
    config: SearchIndexConfig,
}

impl SearchIndexService {
    pub fn new(config: SearchIndexConfig) -> anyhow::Result<Self> {
        let timeout = if config.timeout_seconds > 0 {
            config.timeout_seconds
        } else {
            30
        };
        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .context("Failed to create HTTP client for the search index")?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn enabled(&self) -> bool {
        self.config.base_url.is_some()
    }

    fn base_url(&self) -> Option<&str> {
        self.config
            .base_url
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn send_upsert(&self, base_url: &str, file_id: Uuid) -> anyhow::Result<()> {
        let url = format!("{}/process", base_url);
        let response = self
            .authorize(self.http_client.post(&url))
            .json(&serde_json::json!({ "fileId": file_id }))
            .send()
            .await
            .context("Search index request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Search index upsert returned {}", response.status());
        }

        Ok(())
    }

    async fn send_delete(&self, base_url: &str, file_id: Uuid) -> anyhow::Result<()> {
        let url = format!("{}/delete/{}", base_url, file_id);
        let response = self
            .authorize(self.http_client.delete(&url))
            .send()
            .await
            .context("Search index request failed")?;

        // The file was never indexed; nothing to delete there.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }

        if !response.status().is_success() {
            anyhow::bail!("Search index delete returned {}", response.status());
        }

        Ok(())
    }
}

#[async_trait]
impl SearchIndex for SearchIndexService {
    async fn notify_upserted(&self, file_id: Uuid) {
        let Some(base_url) = self.base_url().map(String::from) else {
            tracing::trace!(file_id = %file_id, "Search index not configured, skipping upsert notification");
            return;
        };

        // Fire-and-forget: delivery never extends the commit path.
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.send_upsert(&base_url, file_id).await {
                tracing::warn!(
                    file_id = %file_id,
                    error = %e,
                    "Search index upsert notification failed"
                );
            } else {
                tracing::debug!(file_id = %file_id, "Search index notified of upsert");
            }
        });
    }

    async fn notify_deleted(&self, file_id: Uuid) {
        let Some(base_url) = self.base_url().map(String::from) else {
            tracing::trace!(file_id = %file_id, "Search index not configured, skipping delete notification");
            return;
        };

        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.send_delete(&base_url, file_id).await {
                tracing::warn!(
                    file_id = %file_id,
                    error = %e,
                    "Search index delete notification failed"
                );
            } else {
                tracing::debug!(file_id = %file_id, "Search index notified of delete");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_without_base_url() {
        let service = SearchIndexService::new(SearchIndexConfig::disabled()).unwrap();
        assert!(!service.enabled());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let service = SearchIndexService::new(SearchIndexConfig {
            base_url: Some("http://localhost:8000/".to_string()),
            api_key: None,
            timeout_seconds: 30,
        })
        .unwrap();
        assert_eq!(service.base_url(), Some("http://localhost:8000"));
    }

    #[tokio::test]
    async fn unconfigured_notifications_are_noops() {
        let service = SearchIndexService::new(SearchIndexConfig::disabled()).unwrap();
        // Must return without attempting any network activity.
        service.notify_upserted(Uuid::new_v4()).await;
        service.notify_deleted(Uuid::new_v4()).await;
    }
}

//! HTTP client for the health-check status service.
//!
//! # Responsibilities
//! - Build the status URL for a health-check id
//! - Issue one GET per query (no retries, no caching)
//! - Map transport, status and decode failures to `QueryError`

use async_trait::async_trait;
use std::time::Duration;
use url::{form_urlencoded, Url};

use crate::config::HealthSourceConfig;
use crate::health::observation::HealthReport;
use crate::health::source::{HealthCheckSource, QueryError};

/// Queries health reports over HTTP.
#[derive(Debug, Clone)]
pub struct HttpHealthCheckSource {
    client: reqwest::Client,
    base_url: Url,
    status_path: String,
    bearer_token: Option<String>,
}

impl HttpHealthCheckSource {
    /// Create a source from configuration.
    pub fn new(config: &HealthSourceConfig) -> Result<Self, QueryError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| QueryError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("edge-failover/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| QueryError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            status_path: config.status_path.clone(),
            bearer_token: config.bearer_token.clone(),
        })
    }

    /// Resolve the status URL for `health_check_id`.
    pub fn status_url(&self, health_check_id: &str) -> Result<Url, QueryError> {
        let encoded: String = form_urlencoded::byte_serialize(health_check_id.as_bytes()).collect();
        let path = self.status_path.replace("{id}", &encoded);
        let raw = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|e| QueryError::InvalidUrl(format!("{}: {}", raw, e)))
    }
}

#[async_trait]
impl HealthCheckSource for HttpHealthCheckSource {
    async fn health_check_status(&self, health_check_id: &str) -> Result<HealthReport, QueryError> {
        let url = self.status_url(health_check_id)?;

        let mut request = self.client.get(url);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| QueryError::Decode(e.to_string()))
    }
}

//! Transports the orchestrator uses to reach the analysis service

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::analysis::{AnalysisError, AnalysisService, StructuredRecord};

#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Submit a sanitized transcript and return the note.
    ///
    /// A fallback note counts as success. A failed call or non-success status is an error.
    async fn analyze(&self, transcript: &str) -> Result<StructuredRecord, AnalysisError>;
}

/// Runs the analysis service in-process.
pub struct LocalAnalysisClient {
    service: AnalysisService,
}

impl LocalAnalysisClient {
    pub fn new(service: AnalysisService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl AnalysisClient for LocalAnalysisClient {
    async fn analyze(&self, transcript: &str) -> Result<StructuredRecord, AnalysisError> {
        self.service.analyze(transcript).await?.into_record()
    }
}

/// Calls a running `soapnote serve` instance over HTTP.
pub struct HttpAnalysisClient {
    http: reqwest::Client,
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    details: Option<String>,
}

impl HttpAnalysisClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base = base_url.trim().trim_end_matches('/');
        let parsed = reqwest::Url::parse(base)
            .map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", base, e))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Server URL must use http or https, got: {}", parsed.scheme());
        }

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            url: format!("{}/api/analyze", base),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AnalysisClient for HttpAnalysisClient {
    async fn analyze(&self, transcript: &str) -> Result<StructuredRecord, AnalysisError> {
        debug!("POST {}", self.url);

        let response = self
            .http
            .post(&self.url)
            .json(&serde_json::json!({ "transcript": transcript }))
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Rejections from the server stack (413 and the like) are not JSON.
            let err: ErrorBody = response.json().await.unwrap_or_default();
            debug!("analysis request failed with status {}", status);
            let message = match (err.error, err.details) {
                (Some(error), Some(details)) => format!("{}: {}", error, details),
                (Some(error), None) => error,
                _ => "Analysis failed".to_string(),
            };
            return Err(AnalysisError::Upstream(message));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;
        Ok(StructuredRecord::from_value(&body))
    }
}

//! LibreTranslate-compatible HTTP backend.

use super::{BackendProfile, TranslationBackend};
use crate::error::BackendError;
use crate::retry::{with_retry_if, RetryConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// One entry of the `BACKENDS_FILE` JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendDescriptor {
    #[serde(flatten)]
    pub profile: BackendProfile,

    /// Base URL; requests go to `{url}/translate`
    pub url: String,

    #[serde(default)]
    pub api_key: Option<String>,
}

/// Read backend descriptors from a JSON file.
pub fn load_descriptors(path: impl AsRef<Path>) -> Result<Vec<BackendDescriptor>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read backends file {}", path.display()))?;
    let descriptors: Vec<BackendDescriptor> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse backends file {}", path.display()))?;
    Ok(descriptors)
}

#[derive(Debug, Serialize)]
struct TranslateBody<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

/// Backend reached over HTTP.
///
/// Transient failures (429, 5xx, network) are retried a bounded number of times
/// against the same service before the error is handed back to the pipeline,
/// which then falls back to the next-ranked backend.
pub struct HttpBackend {
    profile: BackendProfile,
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl HttpBackend {
    pub fn new(descriptor: BackendDescriptor, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            endpoint: format!("{}/translate", descriptor.url.trim_end_matches('/')),
            profile: descriptor.profile,
            client,
            api_key: descriptor.api_key,
            retry: RetryConfig::backend_call(),
        })
    }

    /// A backend whose retries all fit inside `budget`, the pipeline's
    /// per-backend timeout. Each attempt gets a share of the budget, so a
    /// timed-out attempt still leaves room for the retry.
    pub fn within_budget(
        descriptor: BackendDescriptor,
        budget: Duration,
        retry: RetryConfig,
    ) -> Result<Self> {
        let per_attempt = retry.attempt_timeout(budget);
        debug!(
            "Backend '{}' gets {:?} per attempt within {:?}",
            descriptor.profile.id, per_attempt, budget
        );
        Ok(Self::new(descriptor, per_attempt)?.with_retry(retry))
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn send(&self, text: &str, source: &str, target: &str) -> Result<String, BackendError> {
        let body = TranslateBody {
            q: text,
            source,
            target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self.client.post(&self.endpoint).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(BackendError::Http { status, body });
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        if parsed.translated_text.trim().is_empty() {
            return Err(BackendError::InvalidResponse(
                "empty translatedText".to_string(),
            ));
        }
        Ok(parsed.translated_text)
    }
}

#[async_trait]
impl TranslationBackend for HttpBackend {
    fn profile(&self) -> &BackendProfile {
        &self.profile
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, BackendError> {
        debug!(
            "Backend '{}' translating {} chars {} -> {}",
            self.profile.id,
            text.chars().count(),
            source,
            target
        );
        with_retry_if(
            &self.retry,
            &format!("Backend '{}'", self.profile.id),
            || self.send(text, source, target),
            BackendError::is_retryable,
        )
        .await
    }
}

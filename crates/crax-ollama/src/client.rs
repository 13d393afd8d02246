// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Ollama generate endpoint.
//!
//! Every call is a single attempt. Transport failures, non-success statuses,
//! and non-JSON bodies are mapped onto the backend error variants.

use std::time::Duration;

use crax_core::CraxError;
use tracing::debug;

use crate::types::{GenerateOptions, GenerateRequest, extract_reply};

/// HTTP client for one Ollama endpoint and model.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    api_url: String,
    model: String,
    options: GenerateOptions,
    timeout: Option<Duration>,
}

impl OllamaClient {
    /// Creates a client. `timeout` of `None` waits for the backend indefinitely.
    pub fn new(
        api_url: String,
        model: String,
        options: GenerateOptions,
        timeout: Option<Duration>,
    ) -> Result<Self, CraxError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| CraxError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url,
            model,
            options,
            timeout,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` and returns the reply text.
    pub async fn generate(&self, prompt: &str) -> Result<String, CraxError> {
        let body = GenerateRequest {
            prompt,
            stream: false,
            model: &self.model,
            options: self.options,
        };

        let mut request = self.client.post(&self.api_url).json(&body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        debug!(status = %status, model = %self.model, "generate response received");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CraxError::BackendBadResponse {
                message: format!("backend returned {status}: {text}"),
                source: None,
            });
        }

        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| CraxError::BackendBadResponse {
                message: format!("failed to parse backend response: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(extract_reply(&value))
    }

    /// Issues a GET against the server root to see whether it is up.
    pub async fn ping(&self) -> Result<(), CraxError> {
        let mut root = reqwest::Url::parse(&self.api_url)
            .map_err(|e| CraxError::Config(format!("invalid ollama.api_url: {e}")))?;
        root.set_path("/");
        root.set_query(None);

        self.client
            .get(root)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?
            .error_for_status()
            .map_err(|e| CraxError::BackendBadResponse {
                message: e.to_string(),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }

    fn transport_error(&self, e: reqwest::Error) -> CraxError {
        if e.is_timeout()
            && let Some(duration) = self.timeout
        {
            return CraxError::Timeout { duration };
        }
        if e.is_decode() || e.is_body() {
            return CraxError::BackendBadResponse {
                message: format!("failed to read backend response: {e}"),
                source: Some(Box::new(e)),
            };
        }
        CraxError::BackendUnavailable {
            message: format!("request to {} failed: {e}", self.api_url),
            source: Some(Box::new(e)),
        }
    }
}

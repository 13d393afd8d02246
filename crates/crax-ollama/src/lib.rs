// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama inference backend for the Crax chat bot.
//!
//! Implements [`InferenceAdapter`] over the non-streaming
//! `/api/generate` endpoint.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use crax_config::model::OllamaConfig;
use crax_core::error::CraxError;
use crax_core::traits::{InferenceAdapter, PluginAdapter};
use crax_core::types::{AdapterType, HealthStatus};
use tracing::info;

use crate::client::OllamaClient;
use crate::types::GenerateOptions;

/// Ollama backend implementing [`InferenceAdapter`].
pub struct OllamaBackend {
    client: OllamaClient,
}

impl OllamaBackend {
    /// Creates a backend from the `[ollama]` config section.
    pub fn new(config: &OllamaConfig) -> Result<Self, CraxError> {
        let client = OllamaClient::new(
            config.api_url.clone(),
            config.model.clone(),
            GenerateOptions {
                temperature: config.temperature,
                num_predict: config.num_predict,
            },
            config.timeout_secs.map(Duration::from_secs),
        )?;

        info!(
            url = %config.api_url,
            model = %config.model,
            timeout_secs = ?config.timeout_secs,
            "Ollama backend initialized"
        );

        Ok(Self { client })
    }

    pub fn client(&self) -> &OllamaClient {
        &self.client
    }
}

#[async_trait]
impl PluginAdapter for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Inference
    }

    async fn health_check(&self) -> Result<HealthStatus, CraxError> {
        match self.client.ping().await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("Ollama unreachable: {e}"))),
        }
    }

    async fn shutdown(&self) -> Result<(), CraxError> {
        Ok(())
    }
}

#[async_trait]
impl InferenceAdapter for OllamaBackend {
    async fn generate(&self, prompt: &str) -> Result<String, CraxError> {
        self.client.generate(prompt).await
    }
}

// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inference adapter trait for text-generation backends (Ollama, etc.).

use async_trait::async_trait;

use crate::error::CraxError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for a text-generation backend.
///
/// One call is one attempt: implementations must not retry.
#[async_trait]
pub trait InferenceAdapter: PluginAdapter {
    /// Generates a completion for a fully composed prompt.
    async fn generate(&self, prompt: &str) -> Result<String, CraxError>;
}

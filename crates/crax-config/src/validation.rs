// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde attributes cannot express: URL
//! schemes, probability ranges, and non-empty names and paths.

use crate::diagnostic::ConfigError;
use crate::model::CraxConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &CraxConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.agent.name.trim().is_empty() {
        fail("agent.name must not be empty".to_string());
    }

    if config.agent.max_prompt_words == 0 {
        fail("agent.max_prompt_words must be greater than 0".to_string());
    }

    let url = config.ollama.api_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        fail(format!(
            "ollama.api_url `{url}` must start with http:// or https://"
        ));
    }

    if config.ollama.model.trim().is_empty() {
        fail("ollama.model must not be empty".to_string());
    }

    if !config.ollama.temperature.is_finite() || config.ollama.temperature < 0.0 {
        fail(format!(
            "ollama.temperature must be a non-negative number, got {}",
            config.ollama.temperature
        ));
    }

    if config.ollama.num_predict == 0 {
        fail("ollama.num_predict must be greater than 0".to_string());
    }

    if config.ollama.timeout_secs == Some(0) {
        fail("ollama.timeout_secs must be greater than 0 when set".to_string());
    }

    if config.memory.path.trim().is_empty() {
        fail("memory.path must not be empty".to_string());
    }

    for (key, value) in [
        ("react_chance", config.behavior.react_chance),
        ("fallback_chance", config.behavior.fallback_chance),
        ("decorate_chance", config.behavior.decorate_chance),
    ] {
        if !(0.0..=1.0).contains(&value) {
            fail(format!("behavior.{key} must be between 0 and 1, got {value}"));
        }
    }

    if let Some(token) = &config.discord.bot_token
        && token.trim().is_empty()
    {
        fail("discord.bot_token must not be empty when set".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

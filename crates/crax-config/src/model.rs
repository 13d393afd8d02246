// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Crax chat bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Crax configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CraxConfig {
    /// Bot identity and prompt settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Discord bot integration settings.
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Inference backend settings.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Conversation memory settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Reaction and decoration behavior.
    #[serde(default)]
    pub behavior: BehaviorConfig,
}

/// Bot identity and prompt configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Name the model answers as; also the trailing prompt cue.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline persona text. Overridden by `persona_file` if both set.
    #[serde(default)]
    pub persona: Option<String>,

    /// Path to a text file containing the persona block.
    #[serde(default)]
    pub persona_file: Option<String>,

    /// Word budget for a composed prompt. Oldest facts are dropped first.
    #[serde(default = "default_max_prompt_words")]
    pub max_prompt_words: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            persona: None,
            persona_file: None,
            max_prompt_words: default_max_prompt_words(),
        }
    }
}

fn default_agent_name() -> String {
    "UnionCrax".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_prompt_words() -> usize {
    1800
}

/// Discord bot integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscordConfig {
    /// Discord bot token. `None` disables the Discord adapter.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Only handle messages from this guild, when set.
    #[serde(default)]
    pub target_guild_id: Option<u64>,

    /// Only handle messages from this channel, when set.
    #[serde(default)]
    pub target_channel_id: Option<u64>,

    /// Lowercase substrings that make the bot answer without a mention.
    #[serde(default = "default_triggers")]
    pub triggers: Vec<String>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            target_guild_id: None,
            target_channel_id: None,
            triggers: default_triggers(),
        }
    }
}

fn default_triggers() -> Vec<String> {
    ["uc", "unioncrax", "union crax", "ai"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Inference backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    /// Full URL of the generate endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model name sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Maximum tokens to generate per reply.
    #[serde(default = "default_num_predict")]
    pub num_predict: u32,

    /// Per-request timeout. `None` waits indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            model: default_model(),
            temperature: default_temperature(),
            num_predict: default_num_predict(),
            timeout_secs: None,
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:11434/api/generate".to_string()
}

fn default_model() -> String {
    "llama2:7b-chat".to_string()
}

fn default_temperature() -> f64 {
    1.1
}

fn default_num_predict() -> u32 {
    80
}

/// Conversation memory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Path to the JSON memory file.
    #[serde(default = "default_memory_path")]
    pub path: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: default_memory_path(),
        }
    }
}

fn default_memory_path() -> String {
    "userMemory.json".to_string()
}

/// Reaction and decoration behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BehaviorConfig {
    /// Chance of reacting to a message the bot does not answer.
    #[serde(default = "default_react_chance")]
    pub react_chance: f64,

    /// Chance of a random emoji when no keyword emoji matches.
    #[serde(default = "default_fallback_chance")]
    pub fallback_chance: f64,

    /// Chance of wrapping a reply in emoji.
    #[serde(default = "default_decorate_chance")]
    pub decorate_chance: f64,

    /// Reply posted when generating an answer fails.
    #[serde(default = "default_apology")]
    pub apology: String,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            react_chance: default_react_chance(),
            fallback_chance: default_fallback_chance(),
            decorate_chance: default_decorate_chance(),
            apology: default_apology(),
        }
    }
}

fn default_react_chance() -> f64 {
    0.2
}

fn default_fallback_chance() -> f64 {
    0.3
}

fn default_decorate_chance() -> f64 {
    0.2
}

fn default_apology() -> String {
    "Sorry, I encountered an error while processing your request.".to_string()
}

impl CraxConfig {
    /// A copy safe to print: the bot token is replaced by a marker.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.discord.bot_token.is_some() {
            copy.discord.bot_token = Some("[REDACTED]".to_string());
        }
        copy
    }
}

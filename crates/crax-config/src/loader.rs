// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./crax.toml` > `~/.config/crax/crax.toml` > `/etc/crax/crax.toml`
//! with environment variable overrides via `CRAX_` prefix and the bare
//! `DISCORD_TOKEN` / `OLLAMA_API_URL` / `TARGET_*_ID` keys.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use tracing::debug;

use crate::model::CraxConfig;

/// Unprefixed environment keys accepted for compatibility with `.env` files.
const LEGACY_ENV_KEYS: &[&str] = &[
    "DISCORD_TOKEN",
    "OLLAMA_API_URL",
    "TARGET_GUILD_ID",
    "TARGET_CHANNEL_ID",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/crax/crax.toml` (system-wide)
/// 3. `~/.config/crax/crax.toml` (user XDG config)
/// 4. `./crax.toml` (local directory)
/// 5. `CRAX_*` environment variables
/// 6. Legacy unprefixed environment variables
///
/// A `.env` file in the working directory is read into the environment first.
pub fn load_config() -> Result<CraxConfig, figment::Error> {
    load_dotenv();
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<CraxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CraxConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CraxConfig, figment::Error> {
    load_dotenv();
    Figment::new()
        .merge(Serialized::defaults(CraxConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .merge(legacy_env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CraxConfig::default()))
        .merge(Toml::file("/etc/crax/crax.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("crax/crax.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("crax.toml"))
        .merge(env_provider())
        .merge(legacy_env_provider())
}

fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => debug!(error = %e, "ignoring unreadable .env file"),
    }
}

/// Create the `CRAX_` environment provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `CRAX_DISCORD_BOT_TOKEN` must map to `discord.bot_token`,
/// not `discord.bot.token`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("CRAX_").map(|key| map_prefixed_key(key.as_str()).into())
}

/// Maps the bare keys the bot historically read from `.env`.
pub(crate) fn legacy_env_provider() -> Env {
    Env::raw()
        .only(LEGACY_ENV_KEYS)
        .map(|key| map_legacy_key(key.as_str()).into())
}

pub(crate) fn map_prefixed_key(key: &str) -> String {
    key.to_ascii_lowercase()
        .replacen("agent_", "agent.", 1)
        .replacen("discord_", "discord.", 1)
        .replacen("ollama_", "ollama.", 1)
        .replacen("memory_", "memory.", 1)
        .replacen("behavior_", "behavior.", 1)
}

pub(crate) fn map_legacy_key(key: &str) -> String {
    match key.to_ascii_lowercase().as_str() {
        "discord_token" => "discord.bot_token".to_string(),
        "ollama_api_url" => "ollama.api_url".to_string(),
        "target_guild_id" => "discord.target_guild_id".to_string(),
        "target_channel_id" => "discord.target_channel_id".to_string(),
        other => other.to_string(),
    }
}

// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `crax serve` command implementation.
//!
//! Wires the Ollama backend, memory store, and Discord adapter into the
//! agent loop and runs it until SIGINT/SIGTERM.

use std::sync::Arc;

use crax_agent::{AgentLoop, Dispatcher, EventRouter};
use crax_config::CraxConfig;
use crax_context::{Persona, PromptBuilder};
use crax_core::error::CraxError;
use crax_core::traits::{ChannelAdapter, InferenceAdapter, PluginAdapter};
use crax_core::types::HealthStatus;
use crax_discord::DiscordChannel;
use crax_memory::MemoryStore;
use crax_ollama::OllamaBackend;
use tracing::{info, warn};

/// Runs the Discord bot.
pub async fn run_serve(config: CraxConfig) -> Result<(), CraxError> {
    init_tracing(&config.agent.log_level);

    info!(agent_name = config.agent.name.as_str(), "starting crax serve");

    let backend = Arc::new(OllamaBackend::new(&config.ollama)?);
    report_health(backend.as_ref()).await;

    let dispatcher = build_dispatcher(&config, backend).await;

    let mut channel = DiscordChannel::new(config.discord.clone())?;
    channel.connect().await?;
    let max_len = channel.capabilities().max_message_length;
    let channel: Arc<dyn ChannelAdapter> = Arc::new(channel);

    let router = Arc::new(EventRouter::new(
        dispatcher,
        config.behavior.clone(),
        &config.discord.triggers,
        max_len,
    ));

    let cancel = crax_agent::shutdown::install_signal_handler();
    AgentLoop::new(channel, router).run(cancel).await
}

/// Loads persona and memory and builds the shared dispatcher.
pub async fn build_dispatcher(config: &CraxConfig, backend: Arc<dyn InferenceAdapter>) -> Dispatcher {
    let persona = Persona::load(&config.agent).await;
    let prompts = PromptBuilder::new(
        persona.into_text(),
        config.agent.name.clone(),
        config.agent.max_prompt_words,
    );
    let store = MemoryStore::open(&config.memory.path).await;
    info!(path = config.memory.path.as_str(), users = store.len(), "memory loaded");

    Dispatcher::new(store, backend, prompts)
}

/// Logs whether the backend answers; the bot starts either way.
async fn report_health(backend: &dyn PluginAdapter) {
    match backend.health_check().await {
        Ok(HealthStatus::Healthy) => info!(backend = backend.name(), "backend reachable"),
        Ok(HealthStatus::Degraded(reason)) | Ok(HealthStatus::Unhealthy(reason)) => {
            warn!(backend = backend.name(), reason = reason.as_str(), "backend not healthy, starting anyway")
        }
        Err(e) => warn!(backend = backend.name(), error = %e, "backend health check failed"),
    }
}

/// Installs the global tracing subscriber. `RUST_LOG` takes precedence.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("crax={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

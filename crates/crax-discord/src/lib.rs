// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discord channel adapter for the Crax chat bot.
//!
//! Implements [`ChannelAdapter`] over the Discord gateway via serenity.
//! Incoming messages are filtered, normalized, and queued for the agent
//! loop; replies and reactions go out over the REST API.

pub mod handler;

use std::sync::Arc;

use async_trait::async_trait;
use crax_config::model::DiscordConfig;
use crax_core::error::CraxError;
use crax_core::traits::{ChannelAdapter, PluginAdapter};
use crax_core::types::{
    AdapterType, ChatCapabilities, HealthStatus, InboundMessage, MessageRef, OutboundAction,
};
use serenity::all::{
    ChannelId, Client, Context, CreateMessage, EventHandler, GatewayIntents, Http, Message,
    MessageId, ReactionType, Ready, ShardManager,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Discord rejects longer messages.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Discord channel adapter implementing [`ChannelAdapter`].
pub struct DiscordChannel {
    token: String,
    config: DiscordConfig,
    http: Arc<Http>,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundMessage>>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    shard_manager: Option<Arc<ShardManager>>,
    gateway_handle: Option<tokio::task::JoinHandle<()>>,
}

impl DiscordChannel {
    /// Creates a new Discord channel adapter.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: DiscordConfig) -> Result<Self, CraxError> {
        let token = config
            .bot_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                CraxError::Config("discord.bot_token (or DISCORD_TOKEN) is required".into())
            })?;

        let http = Arc::new(Http::new(&token));
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            token,
            config,
            http,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            shard_manager: None,
            gateway_handle: None,
        })
    }
}

/// Gateway event handler forwarding in-scope messages to the adapter.
struct Handler {
    tx: mpsc::Sender<InboundMessage>,
    target_guild_id: Option<u64>,
    target_channel_id: Option<u64>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(bot = %ready.user.tag(), "logged in to Discord");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        if !handler::passes_target_filter(
            msg.guild_id.map(|g| g.get()),
            msg.channel_id.get(),
            self.target_guild_id,
            self.target_channel_id,
        ) {
            debug!(channel_id = msg.channel_id.get(), "ignoring message outside target");
            return;
        }

        let bot_id = ctx.cache.current_user().id;
        let reply_to_bot = handler::replies_to_bot(&ctx, &msg, bot_id).await;
        let inbound = handler::to_inbound_message(&msg, bot_id, reply_to_bot);

        if self.tx.send(inbound).await.is_err() {
            warn!("inbound channel closed, dropping message");
        }
    }
}

fn parse_id(raw: &str, what: &str) -> Result<u64, CraxError> {
    raw.parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| CraxError::Channel {
            message: format!("invalid Discord {what} id: {raw:?}"),
            source: None,
        })
}

fn target(to: &MessageRef) -> Result<(ChannelId, MessageId), CraxError> {
    Ok((
        ChannelId::new(parse_id(&to.channel_id, "channel")?),
        MessageId::new(parse_id(&to.message_id, "message")?),
    ))
}

fn channel_error(action: &str, e: serenity::Error) -> CraxError {
    CraxError::Channel {
        message: format!("Discord {action} failed: {e}"),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl PluginAdapter for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, CraxError> {
        match self.http.get_current_user().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("Discord API unreachable: {e}"))),
        }
    }

    async fn shutdown(&self) -> Result<(), CraxError> {
        debug!("Discord channel shutting down");
        if let Some(manager) = &self.shard_manager {
            manager.shutdown_all().await;
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for DiscordChannel {
    fn capabilities(&self) -> ChatCapabilities {
        ChatCapabilities {
            supports_reactions: true,
            supports_attachments: true,
            max_message_length: Some(MAX_MESSAGE_LENGTH),
        }
    }

    async fn connect(&mut self) -> Result<(), CraxError> {
        if self.gateway_handle.is_some() {
            return Ok(());
        }

        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::DIRECT_MESSAGES;

        let handler = Handler {
            tx: self.inbound_tx.clone(),
            target_guild_id: self.config.target_guild_id,
            target_channel_id: self.config.target_channel_id,
        };

        let mut client = Client::builder(&self.token, intents)
            .event_handler(handler)
            .await
            .map_err(|e| channel_error("client setup", e))?;

        self.shard_manager = Some(Arc::clone(&client.shard_manager));

        info!("connecting to the Discord gateway");
        let handle = tokio::spawn(async move {
            if let Err(e) = client.start().await {
                error!(error = %e, "Discord gateway stopped");
            }
        });

        self.gateway_handle = Some(handle);
        Ok(())
    }

    async fn receive(&self) -> Result<InboundMessage, CraxError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| CraxError::Channel {
            message: "Discord inbound channel closed".into(),
            source: None,
        })
    }

    async fn execute(&self, action: OutboundAction) -> Result<(), CraxError> {
        match action {
            OutboundAction::Reply { to, text } => {
                let (channel_id, message_id) = target(&to)?;
                let message = CreateMessage::new()
                    .content(text)
                    .reference_message((channel_id, message_id));
                channel_id
                    .send_message(&*self.http, message)
                    .await
                    .map_err(|e| channel_error("reply", e))?;
            }
            OutboundAction::React { to, emoji } => {
                let (channel_id, message_id) = target(&to)?;
                channel_id
                    .create_reaction(&*self.http, message_id, ReactionType::Unicode(emoji))
                    .await
                    .map_err(|e| channel_error("reaction", e))?;
            }
        }
        Ok(())
    }
}

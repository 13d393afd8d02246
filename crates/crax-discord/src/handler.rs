// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filtering and normalization of incoming Discord messages.
//!
//! Decides whether a Discord message is in scope for the bot, then turns it
//! into a channel-agnostic [`InboundMessage`].

use crax_core::types::{Attachment, InboundMessage};
use serenity::all::{Context, Message, UserId};
use tracing::debug;

/// Checks the message against the optional guild and channel restriction.
///
/// With a target guild set, direct messages never pass.
pub fn passes_target_filter(
    guild_id: Option<u64>,
    channel_id: u64,
    target_guild_id: Option<u64>,
    target_channel_id: Option<u64>,
) -> bool {
    if let Some(target) = target_guild_id
        && guild_id != Some(target)
    {
        return false;
    }
    if let Some(target) = target_channel_id
        && channel_id != target
    {
        return false;
    }
    true
}

/// Name shown for the author: server nickname, then global name, then username.
pub fn display_name(nick: Option<&str>, global_name: Option<&str>, username: &str) -> String {
    [nick, global_name]
        .into_iter()
        .flatten()
        .find(|name| !name.is_empty())
        .unwrap_or(username)
        .to_string()
}

/// Removes `<@id>` and `<@!id>` tokens addressing the bot.
pub fn strip_bot_mentions(text: &str, bot_id: u64) -> String {
    text.replace(&format!("<@{bot_id}>"), "")
        .replace(&format!("<@!{bot_id}>"), "")
        .trim()
        .to_string()
}

/// Whether `msg` replies to one of the bot's own messages.
///
/// Uses the embedded referenced message when Discord sent one, otherwise
/// fetches it. A failed fetch counts as "not a reply to the bot".
pub async fn replies_to_bot(ctx: &Context, msg: &Message, bot_id: UserId) -> bool {
    if let Some(referenced) = msg.referenced_message.as_deref() {
        return referenced.author.id == bot_id;
    }

    let Some(message_id) = msg.message_reference.as_ref().and_then(|r| r.message_id) else {
        return false;
    };

    match msg.channel_id.message(ctx, message_id).await {
        Ok(referenced) => referenced.author.id == bot_id,
        Err(e) => {
            debug!(error = %e, "could not fetch referenced message");
            false
        }
    }
}

/// Converts a Discord message into an [`InboundMessage`].
pub fn to_inbound_message(msg: &Message, bot_id: UserId, reply_to_bot: bool) -> InboundMessage {
    let nick = msg.member.as_ref().and_then(|m| m.nick.as_deref());

    InboundMessage {
        id: msg.id.get().to_string(),
        channel_id: msg.channel_id.get().to_string(),
        guild_id: msg.guild_id.map(|g| g.get().to_string()),
        author_id: msg.author.id.get().to_string(),
        author_is_bot: msg.author.bot,
        display_name: display_name(nick, msg.author.global_name.as_deref(), &msg.author.name),
        content: strip_bot_mentions(&msg.content, bot_id.get()),
        mentions_bot: msg.mentions_user_id(bot_id),
        reply_to_bot,
        attachments: msg
            .attachments
            .iter()
            .map(|a| Attachment {
                name: a.filename.clone(),
                url: a.url.clone(),
            })
            .collect(),
    }
}

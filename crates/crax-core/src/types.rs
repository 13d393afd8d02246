// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Crax bot.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Inference,
}

// --- Conversation memory ---

/// Who authored a conversation turn.
///
/// The assistant side is persisted as `"ai"` to stay compatible with
/// existing memory files; `"assistant"` is accepted when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai", alias = "assistant")]
    Assistant,
}

/// A single entry in a user's conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    /// ISO 8601 instant, e.g. `2026-01-02T03:04:05.678Z`.
    pub timestamp: String,
    #[serde(
        rename = "displayName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
}

impl ConversationTurn {
    /// A user turn stamped with the current time.
    pub fn user(content: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: now_iso8601(),
            display_name: Some(display_name.into()),
        }
    }

    /// An assistant turn stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: now_iso8601(),
            display_name: None,
        }
    }
}

/// Current UTC time with millisecond precision and a `Z` suffix.
pub fn now_iso8601() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

// --- Channel types ---

/// A file attached to an inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

/// A message received from a chat platform, normalized by the channel adapter.
#[derive(Debug, Clone, Default)]
pub struct InboundMessage {
    /// Platform message id, used to address replies and reactions.
    pub id: String,
    /// Platform channel id the message was posted in.
    pub channel_id: String,
    /// Guild (server) id, `None` for direct messages.
    pub guild_id: Option<String>,
    pub author_id: String,
    pub author_is_bot: bool,
    pub display_name: String,
    pub content: String,
    /// The bot was explicitly mentioned.
    pub mentions_bot: bool,
    /// The message replies to one of the bot's own messages.
    pub reply_to_bot: bool,
    pub attachments: Vec<Attachment>,
}

/// Addresses a previously received message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub channel_id: String,
    pub message_id: String,
}

impl From<&InboundMessage> for MessageRef {
    fn from(msg: &InboundMessage) -> Self {
        Self {
            channel_id: msg.channel_id.clone(),
            message_id: msg.id.clone(),
        }
    }
}

/// Something the bot does on the chat platform in response to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundAction {
    /// Reply to a message with text.
    Reply { to: MessageRef, text: String },
    /// React to a message with a unicode emoji.
    React { to: MessageRef, emoji: String },
}

/// Capabilities reported by a channel adapter.
#[derive(Debug, Clone)]
pub struct ChatCapabilities {
    pub supports_reactions: bool,
    pub supports_attachments: bool,
    /// Longest text the platform accepts in one message.
    pub max_message_length: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_role_persists_as_ai() {
        let turn = ConversationTurn {
            role: Role::Assistant,
            content: "sure".into(),
            timestamp: "2026-01-01T00:00:00.000Z".into(),
            display_name: None,
        };
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "ai");
        assert!(json.get("displayName").is_none());
    }

    #[test]
    fn assistant_alias_is_accepted() {
        let turn: ConversationTurn = serde_json::from_str(
            r#"{"role":"assistant","content":"x","timestamp":"2026-01-01T00:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(turn.role, Role::Assistant);
    }

    #[test]
    fn user_turn_keeps_display_name() {
        let turn = ConversationTurn::user("hi", "Alice");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["displayName"], "Alice");
    }

    #[test]
    fn timestamp_is_iso8601_with_millis() {
        let ts = now_iso8601();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
        assert_eq!(ts.len(), "2026-01-01T00:00:00.000Z".len());
    }

    #[test]
    fn message_ref_from_inbound() {
        let msg = InboundMessage {
            id: "42".into(),
            channel_id: "7".into(),
            ..Default::default()
        };
        let r = MessageRef::from(&msg);
        assert_eq!(r.channel_id, "7");
        assert_eq!(r.message_id, "42");
    }
}

// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for chat platform integrations (Discord, etc.).

use async_trait::async_trait;

use crate::error::CraxError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatCapabilities, InboundMessage, OutboundAction};

/// Adapter for a bidirectional chat platform.
///
/// Channel adapters deliver normalized inbound messages and carry out
/// replies and reactions.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Returns the capabilities supported by this channel.
    fn capabilities(&self) -> ChatCapabilities;

    /// Establishes a connection to the chat platform.
    async fn connect(&mut self) -> Result<(), CraxError>;

    /// Receives the next inbound message from the channel.
    async fn receive(&self) -> Result<InboundMessage, CraxError>;

    /// Performs a reply or reaction on the platform.
    async fn execute(&self, action: OutboundAction) -> Result<(), CraxError>;
}

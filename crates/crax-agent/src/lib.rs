// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message handling for the Crax chat bot.
//!
//! - [`Dispatcher`] serializes every inference request and updates memory
//! - [`EventRouter`] turns a chat message into replies and reactions
//! - [`AgentLoop`] pulls messages off a channel and runs each concurrently

pub mod attachment;
pub mod decor;
pub mod dice;
pub mod dispatcher;
pub mod router;
pub mod shutdown;

use std::sync::Arc;
use std::time::Duration;

use crax_core::error::CraxError;
use crax_core::traits::ChannelAdapter;
use crax_core::types::{InboundMessage, OutboundAction};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub use dice::{Dice, ThreadRngDice};
pub use dispatcher::{Dispatcher, DispatcherStatus};
pub use router::EventRouter;

/// How long in-flight messages may take to finish after shutdown starts.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Receives messages from a channel and answers them through the router.
///
/// Each message gets its own task, so many chat events can wait on the
/// dispatcher at once while it keeps backend calls strictly serial. The
/// text reply is posted before any attachment is sent to the model.
pub struct AgentLoop {
    channel: Arc<dyn ChannelAdapter>,
    router: Arc<EventRouter>,
}

impl AgentLoop {
    /// `channel` must already be connected.
    pub fn new(channel: Arc<dyn ChannelAdapter>, router: Arc<EventRouter>) -> Self {
        Self { channel, router }
    }

    /// Runs until the token is cancelled or the channel closes.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), CraxError> {
        info!(channel = self.channel.name(), "agent loop running");
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                msg = self.channel.receive() => {
                    match msg {
                        Ok(inbound) => {
                            tasks.spawn(handle_inbound(
                                Arc::clone(&self.channel),
                                Arc::clone(&self.router),
                                inbound,
                            ));
                        }
                        Err(e) => {
                            error!(error = %e, "channel receive error, stopping");
                            break;
                        }
                    }
                }
                Some(res) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = res {
                        error!(error = %e, "message task failed");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping agent loop");
                    break;
                }
            }
        }

        shutdown::drain_tasks(&mut tasks, DRAIN_TIMEOUT).await;
        self.channel.shutdown().await?;

        info!("agent loop stopped");
        Ok(())
    }
}

async fn handle_inbound(
    channel: Arc<dyn ChannelAdapter>,
    router: Arc<EventRouter>,
    inbound: InboundMessage,
) {
    debug!(
        message_id = inbound.id.as_str(),
        author_id = inbound.author_id.as_str(),
        "handling inbound message"
    );

    if let Some(action) = router.handle(&inbound).await {
        perform(channel.as_ref(), &inbound, action).await;
    }

    for att in router.attachments_to_answer(&inbound) {
        if let Some(action) = router.answer_attachment(&inbound, att).await {
            perform(channel.as_ref(), &inbound, action).await;
        }
    }
}

async fn perform(channel: &dyn ChannelAdapter, inbound: &InboundMessage, action: OutboundAction) {
    if let Err(e) = channel.execute(action).await {
        warn!(message_id = inbound.id.as_str(), error = %e, "failed to perform action");
    }
}

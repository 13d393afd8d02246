// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` with injectable inbound messages
//! and captured outbound actions for assertion in tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use crax_core::CraxError;
use crax_core::traits::{ChannelAdapter, PluginAdapter};
use crax_core::types::{
    AdapterType, ChatCapabilities, HealthStatus, InboundMessage, OutboundAction,
};

/// A mock chat channel for testing.
///
/// Provides two queues:
/// - **inbound**: Messages injected via `inject_message()` are returned by `receive()`
/// - **executed**: Actions passed to `execute()` are captured and retrievable via `actions()`
///
/// Clones share the same queues.
#[derive(Clone)]
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundMessage>>>,
    executed: Arc<Mutex<Vec<OutboundAction>>>,
    notify: Arc<Notify>,
    fail_execute: Arc<AtomicBool>,
}

impl MockChannel {
    /// Create a new mock channel with empty queues.
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            executed: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
            fail_execute: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Inject an inbound message into the receive queue.
    pub async fn inject_message(&self, msg: InboundMessage) {
        self.inbound.lock().await.push_back(msg);
        self.notify.notify_one();
    }

    /// All actions that went through `execute()`, including failed ones.
    pub async fn actions(&self) -> Vec<OutboundAction> {
        self.executed.lock().await.clone()
    }

    pub async fn action_count(&self) -> usize {
        self.executed.lock().await.len()
    }

    /// Make every following `execute()` call fail after recording the action.
    pub fn set_fail_execute(&self, fail: bool) {
        self.fail_execute.store(fail, Ordering::SeqCst);
    }

    /// Polls until at least `count` actions were executed or `timeout` elapses.
    pub async fn wait_for_actions(&self, count: usize, timeout: Duration) -> Vec<OutboundAction> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let actions = self.actions().await;
            if actions.len() >= count || tokio::time::Instant::now() >= deadline {
                return actions;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, CraxError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CraxError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    fn capabilities(&self) -> ChatCapabilities {
        ChatCapabilities {
            supports_reactions: true,
            supports_attachments: true,
            max_message_length: Some(2000),
        }
    }

    async fn connect(&mut self) -> Result<(), CraxError> {
        Ok(())
    }

    async fn receive(&self) -> Result<InboundMessage, CraxError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(msg) = queue.pop_front() {
                    return Ok(msg);
                }
            }
            self.notify.notified().await;
        }
    }

    async fn execute(&self, action: OutboundAction) -> Result<(), CraxError> {
        self.executed.lock().await.push(action);
        if self.fail_execute.load(Ordering::SeqCst) {
            return Err(CraxError::Channel {
                message: "mock channel rejected the action".into(),
                source: None,
            });
        }
        Ok(())
    }
}

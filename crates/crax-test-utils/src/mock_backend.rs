// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock inference backend for deterministic testing.
//!
//! `MockBackend` pops one scripted outcome per call, optionally after a
//! delay, and records every prompt plus how many calls overlapped.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crax_core::CraxError;
use crax_core::traits::{InferenceAdapter, PluginAdapter};
use crax_core::types::{AdapterType, HealthStatus};

/// What one call to the mock should do.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Answer with the text after the delay.
    Reply { text: String, delay: Duration },
    /// Fail as if the backend could not be reached.
    Unavailable { delay: Duration },
    /// Fail as if the backend answered with a 500.
    BadResponse { delay: Duration },
}

impl MockOutcome {
    pub fn reply(text: impl Into<String>) -> Self {
        Self::Reply {
            text: text.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed_reply(text: impl Into<String>, delay: Duration) -> Self {
        Self::Reply {
            text: text.into(),
            delay,
        }
    }

    pub fn unavailable() -> Self {
        Self::Unavailable {
            delay: Duration::ZERO,
        }
    }

    pub fn bad_response() -> Self {
        Self::BadResponse {
            delay: Duration::ZERO,
        }
    }

    fn delay(&self) -> Duration {
        match self {
            Self::Reply { delay, .. } | Self::Unavailable { delay } | Self::BadResponse { delay } => {
                *delay
            }
        }
    }
}

/// A scripted inference backend.
///
/// Outcomes are consumed in FIFO order; once exhausted every call replies
/// `"mock reply"`.
#[derive(Clone, Default)]
pub struct MockBackend {
    script: Arc<Mutex<VecDeque<MockOutcome>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcomes(outcomes: Vec<MockOutcome>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::from(outcomes))),
            ..Self::default()
        }
    }

    /// Convenience for a script of immediate replies.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_outcomes(replies.into_iter().map(MockOutcome::reply).collect())
    }

    pub async fn push(&self, outcome: MockOutcome) {
        self.script.lock().await.push_back(outcome);
    }

    /// Prompts received, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.prompts.lock().await.len()
    }

    /// Highest number of calls that were ever running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginAdapter for MockBackend {
    fn name(&self) -> &str {
        "mock-backend"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Inference
    }

    async fn health_check(&self) -> Result<HealthStatus, CraxError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CraxError> {
        Ok(())
    }
}

#[async_trait]
impl InferenceAdapter for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<String, CraxError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        self.prompts.lock().await.push(prompt.to_string());
        let outcome = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockOutcome::reply("mock reply"));

        let delay = outcome.delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match outcome {
            MockOutcome::Reply { text, .. } => Ok(text),
            MockOutcome::Unavailable { .. } => Err(CraxError::BackendUnavailable {
                message: "connection refused".into(),
                source: None,
            }),
            MockOutcome::BadResponse { .. } => Err(CraxError::BackendBadResponse {
                message: "backend returned 500 Internal Server Error".into(),
                source: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_reply_when_script_empty() {
        let backend = MockBackend::new();
        assert_eq!(backend.generate("p").await.unwrap(), "mock reply");
        assert_eq!(backend.prompts().await, vec!["p"]);
    }

    #[tokio::test]
    async fn scripted_outcomes_in_order() {
        let backend = MockBackend::with_outcomes(vec![
            MockOutcome::reply("one"),
            MockOutcome::unavailable(),
            MockOutcome::bad_response(),
        ]);
        assert_eq!(backend.generate("a").await.unwrap(), "one");
        assert!(matches!(
            backend.generate("b").await,
            Err(CraxError::BackendUnavailable { .. })
        ));
        assert!(matches!(
            backend.generate("c").await,
            Err(CraxError::BackendBadResponse { .. })
        ));
        assert_eq!(backend.call_count().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_calls_are_counted() {
        let backend = MockBackend::with_outcomes(vec![
            MockOutcome::delayed_reply("a", Duration::from_millis(50)),
            MockOutcome::delayed_reply("b", Duration::from_millis(50)),
        ]);
        let (a, b) = tokio::join!(backend.generate("1"), backend.generate("2"));
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(backend.max_in_flight(), 2);
    }
}

// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-flight, FIFO dispatcher in front of the inference backend.
//!
//! Every chat event that needs an answer goes through [`Dispatcher::send`].
//! Jobs are queued in submission order and drained by one background task,
//! so the backend never sees two prompts at once and replies settle in the
//! order they were requested. Each job also appends to, and flushes, the
//! shared memory store.

use std::collections::VecDeque;
use std::sync::Arc;

use crax_context::PromptBuilder;
use crax_core::error::CraxError;
use crax_core::traits::InferenceAdapter;
use crax_core::types::ConversationTurn;
use crax_memory::{MemoryStore, extract_facts};
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, error, warn};

/// A pending request waiting for the backend.
struct QueuedJob {
    message: String,
    user_id: String,
    display_name: String,
    reply: oneshot::Sender<Result<String, CraxError>>,
}

#[derive(Default)]
struct DispatcherState {
    busy: bool,
    queue: VecDeque<QueuedJob>,
}

/// Snapshot of the dispatcher's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherStatus {
    /// A drain task is running.
    pub busy: bool,
    /// Jobs waiting behind the one in flight.
    pub queued: usize,
}

struct Inner {
    state: Mutex<DispatcherState>,
    store: Mutex<MemoryStore>,
    backend: Arc<dyn InferenceAdapter>,
    prompts: PromptBuilder,
}

/// Cloneable handle to the shared dispatcher.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    pub fn new(store: MemoryStore, backend: Arc<dyn InferenceAdapter>, prompts: PromptBuilder) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(DispatcherState::default()),
                store: Mutex::new(store),
                backend,
                prompts,
            }),
        }
    }

    /// Queues a message and waits for the generated reply.
    ///
    /// The job runs even if the returned future is dropped; its reply is
    /// then discarded.
    pub async fn send(
        &self,
        message: impl Into<String>,
        user_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<String, CraxError> {
        let (tx, rx) = oneshot::channel();
        let job = QueuedJob {
            message: message.into(),
            user_id: user_id.into(),
            display_name: display_name.into(),
            reply: tx,
        };

        let start_drain = {
            let mut state = self.inner.state.lock().await;
            state.queue.push_back(job);
            !std::mem::replace(&mut state.busy, true)
        };

        if start_drain {
            let this = self.clone();
            tokio::spawn(async move { this.drain().await });
        }

        rx.await
            .map_err(|_| CraxError::Internal("dispatcher dropped a queued job".into()))?
    }

    /// Whether a drain task is running and how many jobs wait behind it.
    pub async fn status(&self) -> DispatcherStatus {
        let state = self.inner.state.lock().await;
        DispatcherStatus {
            busy: state.busy,
            queued: state.queue.len(),
        }
    }

    /// Copy of one user's conversation history.
    pub async fn history(&self, user_id: &str) -> Vec<ConversationTurn> {
        self.inner.store.lock().await.history(user_id).to_vec()
    }

    async fn drain(self) {
        loop {
            let job = {
                let mut state = self.inner.state.lock().await;
                match state.queue.pop_front() {
                    Some(job) => {
                        debug!(
                            user_id = job.user_id.as_str(),
                            queued = state.queue.len(),
                            "dispatching job"
                        );
                        job
                    }
                    None => {
                        state.busy = false;
                        return;
                    }
                }
            };

            // A panicking job must not leave `busy` set.
            let this = self.clone();
            let QueuedJob {
                message,
                user_id,
                display_name,
                reply,
            } = job;
            let job_user = user_id.clone();
            let result = tokio::spawn(async move {
                this.process(&message, &user_id, &display_name).await
            })
            .await
            .unwrap_or_else(|e| {
                error!(user_id = job_user.as_str(), error = %e, "inference job panicked");
                Err(CraxError::Internal(format!("inference job failed: {e}")))
            });

            if reply.send(result).is_err() {
                debug!(user_id = job_user.as_str(), "caller went away, reply discarded");
            }
        }
    }

    async fn process(
        &self,
        message: &str,
        user_id: &str,
        display_name: &str,
    ) -> Result<String, CraxError> {
        let prompt = {
            let mut store = self.inner.store.lock().await;
            store.append(user_id, ConversationTurn::user(message, display_name));
            let facts = extract_facts(store.history(user_id));
            self.inner.prompts.build(&facts, display_name, message)
        };

        match self.inner.backend.generate(&prompt).await {
            Ok(reply) => {
                let mut store = self.inner.store.lock().await;
                store.append(user_id, ConversationTurn::assistant(reply.clone()));
                if let Err(e) = store.save().await {
                    warn!(error = %e, "failed to persist memory, keeping it in memory only");
                }
                Ok(reply)
            }
            Err(e) => {
                warn!(user_id, error = %e, "inference failed");
                Err(e)
            }
        }
    }
}

// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordering, memory, and failure behavior of the inference dispatcher.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crax_agent::{Dispatcher, DispatcherStatus};
use crax_context::PromptBuilder;
use async_trait::async_trait;
use crax_core::CraxError;
use crax_core::traits::{InferenceAdapter, PluginAdapter};
use crax_core::types::{AdapterType, HealthStatus, Role};
use crax_memory::MemoryStore;
use crax_test_utils::{MockBackend, MockOutcome};
use tokio::sync::Mutex;
use tracing_test::traced_test;

fn dispatcher(backend: &MockBackend, memory: &Path) -> Dispatcher {
    Dispatcher::new(
        MemoryStore::with_histories(memory, Default::default()),
        Arc::new(backend.clone()),
        PromptBuilder::new("persona", "UnionCrax", 1800),
    )
}

#[tokio::test(start_paused = true)]
async fn concurrent_sends_reach_backend_one_at_a_time_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let backend = MockBackend::with_outcomes(
        (0..5)
            .map(|i| MockOutcome::delayed_reply(format!("r{i}"), Duration::from_millis(50 - i * 10)))
            .collect(),
    );
    let d = dispatcher(&backend, &dir.path().join("mem.json"));

    let sends = (0..5).map(|i| d.send(format!("m{i}"), format!("u{i}"), format!("name{i}")));
    let results = futures::future::join_all(sends).await;

    let replies: Vec<String> = results.into_iter().map(Result::unwrap).collect();
    assert_eq!(replies, vec!["r0", "r1", "r2", "r3", "r4"]);
    assert_eq!(backend.max_in_flight(), 1);

    let prompts = backend.prompts().await;
    assert_eq!(prompts.len(), 5);
    for (i, prompt) in prompts.iter().enumerate() {
        assert!(prompt.contains(&format!("name{i}: m{i}")), "prompt {i} out of order: {prompt}");
    }
}

#[tokio::test(start_paused = true)]
async fn replies_settle_in_submission_order_despite_latency() {
    let dir = tempfile::tempdir().unwrap();
    let backend = MockBackend::with_outcomes(vec![
        MockOutcome::delayed_reply("to alice", Duration::from_millis(200)),
        MockOutcome::delayed_reply("to bob", Duration::from_millis(1)),
    ]);
    let d = dispatcher(&backend, &dir.path().join("mem.json"));
    let settled = Arc::new(Mutex::new(Vec::new()));

    let alice = {
        let settled = Arc::clone(&settled);
        let d = d.clone();
        async move {
            let reply = d.send("hi", "u1", "Alice").await.unwrap();
            settled.lock().await.push(reply);
        }
    };
    let bob = {
        let settled = Arc::clone(&settled);
        let d = d.clone();
        async move {
            let reply = d.send("yo", "u2", "Bob").await.unwrap();
            settled.lock().await.push(reply);
        }
    };
    tokio::join!(alice, bob);

    assert_eq!(*settled.lock().await, vec!["to alice", "to bob"]);
    assert_eq!(d.history("u1").await.len(), 2);
    assert_eq!(d.history("u2").await.len(), 2);
}

#[tokio::test]
async fn successful_turn_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mem.json");
    let backend = MockBackend::with_replies(["hello Alice"]);
    let d = dispatcher(&backend, &path);

    d.send("hi", "u1", "Alice").await.unwrap();

    let reloaded = MemoryStore::open(&path).await;
    let turns = reloaded.history("u1");
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[0].content, "hi");
    assert_eq!(turns[0].display_name.as_deref(), Some("Alice"));
    assert_eq!(turns[1].role, Role::Assistant);
    assert_eq!(turns[1].content, "hello Alice");
}

#[tokio::test]
async fn failed_call_keeps_user_turn_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mem.json");
    let backend = MockBackend::with_outcomes(vec![MockOutcome::unavailable()]);
    let d = dispatcher(&backend, &path);

    let err = d.send("hi", "u1", "Alice").await.unwrap_err();
    assert!(matches!(err, CraxError::BackendUnavailable { .. }));

    let turns = d.history("u1").await;
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].role, Role::User);
    assert!(!path.exists(), "nothing is saved after a failed call");
}

#[tokio::test]
async fn queue_advances_after_failure() {
    let dir = tempfile::tempdir().unwrap();
    let backend = MockBackend::with_outcomes(vec![
        MockOutcome::bad_response(),
        MockOutcome::reply("second works"),
    ]);
    let d = dispatcher(&backend, &dir.path().join("mem.json"));

    let (first, second) = tokio::join!(d.send("a", "u1", "A"), d.send("b", "u1", "A"));
    assert!(first.is_err());
    assert_eq!(second.unwrap(), "second works");
    assert_eq!(
        d.status().await,
        DispatcherStatus {
            busy: false,
            queued: 0
        }
    );
}

#[tokio::test]
async fn remembered_name_reaches_later_prompts() {
    let dir = tempfile::tempdir().unwrap();
    let backend = MockBackend::with_replies(["ok Sam", "hey"]);
    let d = dispatcher(&backend, &dir.path().join("mem.json"));

    d.send("my name is Sam", "u1", "Alice").await.unwrap();
    d.send("hello", "u1", "Alice").await.unwrap();

    let prompts = backend.prompts().await;
    assert!(prompts[0].contains("This user wants to be called Sam."));
    assert!(prompts[1].contains("This user wants to be called Sam.\nAlice: hello\nUnionCrax:"));
}

#[tokio::test(start_paused = true)]
async fn abandoned_send_still_runs() {
    let dir = tempfile::tempdir().unwrap();
    let backend = MockBackend::with_outcomes(vec![
        MockOutcome::delayed_reply("slow", Duration::from_secs(10)),
        MockOutcome::reply("fast"),
    ]);
    let d = dispatcher(&backend, &dir.path().join("mem.json"));

    let abandoned = tokio::time::timeout(Duration::from_secs(1), d.send("one", "u1", "A")).await;
    assert!(abandoned.is_err());

    assert_eq!(d.send("two", "u1", "A").await.unwrap(), "fast");
    let contents: Vec<String> = d.history("u1").await.into_iter().map(|t| t.content).collect();
    assert_eq!(contents, vec!["one", "slow", "two", "fast"]);
}

#[tokio::test]
#[traced_test]
async fn save_failure_does_not_fail_the_send() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("mem.json");
    let backend = MockBackend::with_replies(["still here"]);
    let d = dispatcher(&backend, &path);

    assert_eq!(d.send("hi", "u1", "A").await.unwrap(), "still here");
    assert_eq!(d.history("u1").await.len(), 2);
    assert!(logs_contain("failed to persist memory"));
}

/// Panics on its first call, then answers normally.
#[derive(Default)]
struct PanicsOnce {
    panicked: AtomicBool,
}

#[async_trait]
impl PluginAdapter for PanicsOnce {
    fn name(&self) -> &str {
        "panics-once"
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
impl InferenceAdapter for PanicsOnce {
    async fn generate(&self, _prompt: &str) -> Result<String, CraxError> {
        if !self.panicked.swap(true, Ordering::SeqCst) {
            panic!("backend blew up");
        }
        Ok("recovered".into())
    }
}

#[tokio::test]
async fn panicking_backend_fails_only_its_job() {
    let dir = tempfile::tempdir().unwrap();
    let d = Dispatcher::new(
        MemoryStore::with_histories(dir.path().join("mem.json"), Default::default()),
        Arc::new(PanicsOnce::default()),
        PromptBuilder::new("persona", "UnionCrax", 1800),
    );

    let err = d.send("a", "u1", "A").await.unwrap_err();
    assert!(matches!(err, CraxError::Internal(_)));

    let reply = tokio::time::timeout(Duration::from_secs(5), d.send("b", "u1", "A"))
        .await
        .expect("queue keeps draining after a panic");
    assert_eq!(reply.unwrap(), "recovered");
    assert_eq!(
        d.status().await,
        DispatcherStatus {
            busy: false,
            queued: 0
        }
    );
}

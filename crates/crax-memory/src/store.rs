// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flat-file persistence for per-user conversation histories.
//!
//! The whole mapping lives in memory and is rewritten to one JSON file
//! after every successful turn. Reads and writes are best-effort: a missing,
//! empty, unreadable, or malformed file loads as an empty store, and a failed
//! write leaves the in-memory mapping authoritative.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crax_core::error::CraxError;
use crax_core::types::ConversationTurn;
use tracing::{debug, warn};

/// User id -> ordered conversation history.
pub type Histories = BTreeMap<String, Vec<ConversationTurn>>;

/// Owns every user's conversation history and its persisted form.
#[derive(Debug)]
pub struct MemoryStore {
    path: PathBuf,
    histories: Histories,
}

impl MemoryStore {
    /// Opens the store, loading whatever the file currently holds.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let histories = load(&path).await;
        debug!(path = %path.display(), users = histories.len(), "memory store loaded");
        Self { path, histories }
    }

    /// Creates a store around an already-loaded mapping.
    pub fn with_histories(path: impl Into<PathBuf>, histories: Histories) -> Self {
        Self {
            path: path.into(),
            histories,
        }
    }

    /// Location of the persisted file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The user's turns in chronological order (empty if unknown).
    pub fn history(&self, user_id: &str) -> &[ConversationTurn] {
        self.histories
            .get(user_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Appends a turn, creating the user's history if needed.
    pub fn append(&mut self, user_id: &str, turn: ConversationTurn) {
        self.histories
            .entry(user_id.to_string())
            .or_default()
            .push(turn);
    }

    /// Number of users with a history.
    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }

    /// Read-only view of the full mapping.
    pub fn histories(&self) -> &Histories {
        &self.histories
    }

    /// Overwrites the persisted file with the full mapping.
    ///
    /// The JSON is written to a sibling temp file and renamed into place so
    /// a crash mid-write never truncates the previous contents.
    pub async fn save(&self) -> Result<(), CraxError> {
        let json = serde_json::to_string_pretty(&self.histories)
            .map_err(|e| self.write_error(e))?;

        let tmp = tmp_path(&self.path);
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| self.write_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.write_error(e))?;

        debug!(path = %self.path.display(), users = self.histories.len(), "memory saved");
        Ok(())
    }

    fn write_error(&self, e: impl std::error::Error + Send + Sync + 'static) -> CraxError {
        CraxError::PersistenceWriteFailed {
            path: self.path.display().to_string(),
            source: Box::new(e),
        }
    }
}

/// Reads the persisted mapping. Never fails: problems are logged and
/// produce an empty mapping.
pub async fn load(path: &Path) -> Histories {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no memory file yet, starting empty");
            return Histories::new();
        }
        Err(e) => {
            let err = CraxError::PersistenceReadFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            };
            warn!(error = %err, "could not load memory, starting empty");
            return Histories::new();
        }
    };

    if raw.trim().is_empty() {
        return Histories::new();
    }

    match serde_json::from_str(&raw) {
        Ok(histories) => histories,
        Err(e) => {
            let err = CraxError::PersistenceReadFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            };
            warn!(error = %err, "memory file is malformed, starting empty");
            Histories::new()
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crax_core::types::Role;
    use tracing_test::traced_test;

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path().join("absent.json")).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn whitespace_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        std::fs::write(&path, "  \n\t").unwrap();
        assert!(MemoryStore::open(&path).await.is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn malformed_file_loads_empty_and_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(MemoryStore::open(&path).await.is_empty());
        assert!(logs_contain("memory file is malformed"));
    }

    #[tokio::test]
    async fn append_creates_history() {
        let mut store = MemoryStore::with_histories("unused.json", Histories::new());
        assert!(store.history("u1").is_empty());
        store.append("u1", ConversationTurn::user("hi", "Alice"));
        store.append("u1", ConversationTurn::assistant("hey"));
        let history = store.history("u1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn save_then_open_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");

        let mut store = MemoryStore::open(&path).await;
        store.append("u1", ConversationTurn::user("my name is Sam", "Sam"));
        store.append("u1", ConversationTurn::assistant("sure, Sam"));
        store.append("u2", ConversationTurn::user("yo", "Bob"));
        store.save().await.unwrap();

        let reopened = MemoryStore::open(&path).await;
        assert_eq!(reopened.histories(), store.histories());
        assert!(!tmp_path(&path).exists());
    }

    #[tokio::test]
    async fn save_failure_is_reported_not_panicked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("memory.json");
        let mut store = MemoryStore::open(&path).await;
        store.append("u1", ConversationTurn::user("hi", "A"));

        let err = store.save().await.unwrap_err();
        assert!(matches!(err, CraxError::PersistenceWriteFailed { .. }));
        // In-memory state is untouched.
        assert_eq!(store.history("u1").len(), 1);
    }

    #[test]
    fn tmp_path_is_a_sibling() {
        let p = tmp_path(Path::new("/data/userMemory.json"));
        assert_eq!(p, PathBuf::from("/data/userMemory.json.tmp"));
    }
}

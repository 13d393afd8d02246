// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Crax chat bot.

use thiserror::Error;

/// The primary error type used across all Crax adapter traits and core operations.
#[derive(Debug, Error)]
pub enum CraxError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The inference backend could not be reached (connect or network failure).
    #[error("inference backend unavailable: {message}")]
    BackendUnavailable {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The inference backend answered with a non-success status or an unparseable body.
    #[error("inference backend returned a bad response: {message}")]
    BackendBadResponse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Writing the memory file failed. Never fatal.
    #[error("failed to write memory file {path}: {source}")]
    PersistenceWriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Reading the memory file failed. Treated as an empty store.
    #[error("failed to read memory file {path}: {source}")]
    PersistenceReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Chat platform errors (gateway connection, send or react failure).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CraxError {
    /// Returns true for failures of a single inference request.
    ///
    /// These are the errors a dispatcher caller observes as a rejected send.
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            CraxError::BackendUnavailable { .. }
                | CraxError::BackendBadResponse { .. }
                | CraxError::Timeout { .. }
        )
    }
}

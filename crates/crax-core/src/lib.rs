// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Crax chat bot.
//!
//! This crate provides the trait definitions, error type, and shared types
//! used throughout the Crax workspace. The inference backend and the chat
//! platform are both adapters implementing traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CraxError;
pub use types::{AdapterType, ConversationTurn, HealthStatus, Role};

// Re-export all adapter traits at crate root.
pub use traits::{ChannelAdapter, InferenceAdapter, PluginAdapter};

// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation memory for the Crax chat bot.
//!
//! - **MemoryStore**: per-user turn histories persisted to a flat JSON file
//! - **extract_facts**: pulls "call me X" style facts out of a user's history

pub mod extractor;
pub mod store;

pub use extractor::extract_facts;
pub use store::{Histories, MemoryStore};

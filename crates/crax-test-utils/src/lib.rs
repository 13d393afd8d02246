// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Crax integration tests.
//!
//! - [`MockBackend`] - scripted inference backend that records prompts and concurrency
//! - [`MockChannel`] - chat channel with message injection and action capture

pub mod mock_backend;
pub mod mock_channel;

pub use mock_backend::{MockBackend, MockOutcome};
pub use mock_channel::MockChannel;

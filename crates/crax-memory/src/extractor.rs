// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pattern-based fact extraction from a user's conversation history.

use std::sync::LazyLock;

use crax_core::types::{ConversationTurn, Role};
use regex::Regex;

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:my name is|call me|from now on my name is)\s+([\w\s]+)").unwrap()
});

/// Scan the user's own turns for self-identification and return one fact per match.
///
/// Output follows history order. Repeated matches produce repeated facts.
pub fn extract_facts(history: &[ConversationTurn]) -> Vec<String> {
    history
        .iter()
        .filter(|turn| turn.role == Role::User)
        .filter_map(|turn| NAME_PATTERN.captures(&turn.content))
        .filter_map(|caps| caps.get(1))
        .map(|name| format!("This user wants to be called {}.", name.as_str().trim()))
        .collect()
}

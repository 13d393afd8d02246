// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Emoji tables and the small touches that make replies look less robotic.

use std::sync::LazyLock;

use regex::Regex;

use crate::dice::Dice;

/// Generic emoji used when nothing in the text suggests one.
pub const HUMAN_EMOJIS: &[&str] = &[
    "😀", "😂", "😅", "😎", "👍", "😮", "😜", "🤔", "🙌", "🔥", "🥳", "😇", "😏", "😬", "😃",
];

/// Keyword -> fitting emoji. Checked in order; the first keyword found wins.
pub const KEYWORD_EMOJIS: &[(&str, &[&str])] = &[
    ("funny", &["😂", "🤣"]),
    ("cool", &["😎", "🔥"]),
    ("sad", &["😢", "😞"]),
    ("happy", &["😃", "🥳"]),
    ("wow", &["😮", "🤯"]),
    ("love", &["😍", "❤️"]),
    ("angry", &["😡", "😤"]),
];

/// Self-references the model tends to produce and that break the persona.
const FORBIDDEN_PHRASES: &[&str] = &[
    "as an artificial intelligence",
    "as artificial intelligence",
    "as a language model",
    "as an assistant",
    "as a chatbot",
    "as an ai",
    "i am an assistant",
    "i am an ai",
    "i'm an assistant",
    "i'm an ai",
];

static FORBIDDEN: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = FORBIDDEN_PHRASES
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).unwrap()
});

/// Emoji matching the first keyword contained in `text`, if any.
pub fn contextual_emoji(text: &str, dice: &dyn Dice) -> Option<&'static str> {
    let lower = text.to_lowercase();
    KEYWORD_EMOJIS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, emojis)| emojis[dice.pick(emojis.len())])
}

pub fn random_emoji(dice: &dyn Dice) -> &'static str {
    HUMAN_EMOJIS[dice.pick(HUMAN_EMOJIS.len())]
}

/// Wraps `reply` in the same emoji on both sides.
pub fn decorate(reply: &str, emoji: &str) -> String {
    format!("{emoji} {reply} {emoji}")
}

/// Removes persona-breaking phrases and surrounding whitespace.
pub fn scrub(reply: &str) -> String {
    FORBIDDEN.replace_all(reply, "").trim().to_string()
}

/// Cuts `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FirstDice;

    impl Dice for FirstDice {
        fn chance(&self, _p: f64) -> bool {
            true
        }

        fn pick(&self, _len: usize) -> usize {
            0
        }
    }

    #[test]
    fn contextual_emoji_uses_first_matching_keyword() {
        assert_eq!(contextual_emoji("That is SO funny", &FirstDice), Some("😂"));
        assert_eq!(contextual_emoji("cool but sad", &FirstDice), Some("😎"));
    }

    #[test]
    fn no_keyword_no_emoji() {
        assert_eq!(contextual_emoji("just a message", &FirstDice), None);
    }

    #[test]
    fn random_emoji_comes_from_table() {
        assert_eq!(random_emoji(&FirstDice), HUMAN_EMOJIS[0]);
    }

    #[test]
    fn decorate_wraps_both_sides() {
        assert_eq!(decorate("hey", "🔥"), "🔥 hey 🔥");
    }

    #[test]
    fn scrub_removes_phrases_in_any_case() {
        assert_eq!(scrub("As an AI, I think so."), ", I think so.");
        assert_eq!(scrub("Well i'm an assistant lol"), "Well  lol");
    }

    #[test]
    fn scrub_keeps_words_that_merely_contain_phrases() {
        assert_eq!(scrub("has an aim"), "has an aim");
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 2000), "short");
        assert_eq!(truncate_chars("😀😀😀", 2), "😀😀");
    }
}

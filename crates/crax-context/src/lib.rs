// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly for the Crax chat bot.
//!
//! A prompt is four lines: the persona block, the user's known facts, the
//! latest turn as `name: message`, and the assistant's cue. The composed
//! prompt is kept under a word budget by dropping the oldest facts first.

pub mod persona;

use tracing::debug;

pub use persona::{Persona, default_persona};

/// Composes prompts for the inference backend.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    persona: String,
    assistant_name: String,
    max_words: usize,
}

impl PromptBuilder {
    pub fn new(
        persona: impl Into<String>,
        assistant_name: impl Into<String>,
        max_words: usize,
    ) -> Self {
        Self {
            persona: persona.into(),
            assistant_name: assistant_name.into(),
            max_words,
        }
    }

    /// Builds the prompt for `message` from `display_name`.
    ///
    /// If the result exceeds the word budget, facts are removed from the
    /// front until it fits. The latest message itself is never shortened,
    /// so a prompt with no facts left may still be over budget.
    pub fn build(&self, facts: &[String], display_name: &str, message: &str) -> String {
        let turn = format!("{display_name}: {message}");
        let cue = format!("{}:", self.assistant_name);

        let fixed_words = word_count(&self.persona) + word_count(&turn) + word_count(&cue);
        let mut fact_words: usize = facts.iter().map(|f| word_count(f)).sum();

        let mut first = 0;
        while first < facts.len() && fixed_words + fact_words > self.max_words {
            fact_words -= word_count(&facts[first]);
            first += 1;
        }

        if first > 0 {
            debug!(dropped = first, kept = facts.len() - first, "trimmed facts to fit prompt budget");
        }
        if fixed_words + fact_words > self.max_words {
            debug!(
                words = fixed_words + fact_words,
                budget = self.max_words,
                "prompt exceeds budget without any facts"
            );
        }

        let memory = facts[first..].join(" ");
        format!("{}\n{memory}\n{turn}\n{cue}", self.persona)
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

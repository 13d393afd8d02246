// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loads the persona block that opens every prompt.

use crax_config::model::AgentConfig;
use tracing::{info, warn};

/// The persona instruction block.
#[derive(Debug, Clone)]
pub struct Persona {
    text: String,
}

impl Persona {
    /// Resolves the persona: `persona_file`, then inline `persona`, then the default.
    pub async fn load(config: &AgentConfig) -> Self {
        if let Some(ref file_path) = config.persona_file {
            match tokio::fs::read_to_string(file_path).await {
                Ok(content) if !content.trim().is_empty() => {
                    info!(path = file_path.as_str(), "loaded persona from file");
                    return Self {
                        text: content.trim().to_string(),
                    };
                }
                Ok(_) => warn!(path = file_path.as_str(), "persona file is empty, falling back"),
                Err(e) => warn!(
                    path = file_path.as_str(),
                    error = %e,
                    "failed to read persona file, falling back"
                ),
            }
        }

        if let Some(ref persona) = config.persona
            && !persona.trim().is_empty()
        {
            return Self {
                text: persona.clone(),
            };
        }

        Self {
            text: default_persona(&config.name),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// The stock persona: a short-spoken, sassy human regular of the server.
pub fn default_persona(name: &str) -> String {
    format!(
        "You are {name}, a witty, sassy Discord user. Never say you are an AI, assistant, or bot. \
         Never say you are here to help. Never mention being artificial or programmed. \
         Respond like a real, clever, playful human. Keep replies extremely short (max 1-2 sentences), \
         casual, and do not use emojis. Only mention your name ({name}) if directly asked. \
         Never write long paragraphs. Never break character. When referencing people, use their \
         actual Discord display name, not 'user'. Never end a sentence with 'just don't...' or \
         similar incomplete phrases. Always finish your sentences naturally. When someone posts a \
         GIF or image, use the description provided to make a creative, sassy, and specific comment \
         about what the image or GIF might show. Never reply with generic greetings or questions \
         like 'hey there' or 'what's up'. If the description is about a character, meme, or scene, \
         reference it directly in your response."
    )
}

// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decides what the bot does with each chat message.
//!
//! Triggered messages (mention, reply to the bot, or a trigger keyword) are
//! answered through the dispatcher. Everything else occasionally gets an
//! emoji reaction.

use std::sync::Arc;

use crax_config::model::BehaviorConfig;
use crax_core::types::{Attachment, InboundMessage, MessageRef, OutboundAction};
use tracing::{debug, warn};

use crate::attachment;
use crate::decor;
use crate::dice::{Dice, ThreadRngDice};
use crate::dispatcher::Dispatcher;

/// Channel-agnostic message handler.
pub struct EventRouter {
    dispatcher: Dispatcher,
    behavior: BehaviorConfig,
    triggers: Vec<String>,
    max_message_length: usize,
    dice: Arc<dyn Dice>,
}

impl EventRouter {
    /// `max_message_length` comes from the channel's capabilities; `None`
    /// leaves replies untruncated.
    pub fn new(
        dispatcher: Dispatcher,
        behavior: BehaviorConfig,
        triggers: &[String],
        max_message_length: Option<usize>,
    ) -> Self {
        Self {
            dispatcher,
            behavior,
            triggers: triggers.iter().map(|t| t.to_lowercase()).collect(),
            max_message_length: max_message_length.unwrap_or(usize::MAX),
            dice: Arc::new(ThreadRngDice),
        }
    }

    /// Replaces the random source.
    pub fn with_dice(mut self, dice: Arc<dyn Dice>) -> Self {
        self.dice = dice;
        self
    }

    /// Whether the message asks the bot for an answer.
    pub fn is_triggered(&self, msg: &InboundMessage) -> bool {
        if msg.mentions_bot || msg.reply_to_bot {
            return true;
        }
        let lower = msg.content.to_lowercase();
        self.triggers.iter().any(|t| lower.contains(t.as_str()))
    }

    /// The immediate response to a message: the answer (or apology) when
    /// triggered, otherwise an occasional reaction.
    ///
    /// Attachments are answered separately through [`Self::answer_attachment`]
    /// so this reply can be posted without waiting for them.
    pub async fn handle(&self, msg: &InboundMessage) -> Option<OutboundAction> {
        if msg.author_is_bot {
            return None;
        }

        let to = MessageRef::from(msg);

        if !self.is_triggered(msg) {
            return self.pick_reaction(&msg.content).map(|emoji| OutboundAction::React {
                to,
                emoji: emoji.to_string(),
            });
        }

        match self
            .dispatcher
            .send(msg.content.as_str(), msg.author_id.as_str(), msg.display_name.as_str())
            .await
        {
            Ok(reply) => self
                .finish_reply(&reply, &reply)
                .map(|text| OutboundAction::Reply { to, text }),
            Err(e) => {
                warn!(message_id = msg.id.as_str(), error = %e, "could not answer message");
                Some(OutboundAction::Reply {
                    to,
                    text: self.behavior.apology.clone(),
                })
            }
        }
    }

    /// Attachments that get their own reply: all of them on triggered
    /// messages from humans, none otherwise.
    pub fn attachments_to_answer<'a>(&self, msg: &'a InboundMessage) -> &'a [Attachment] {
        if msg.author_is_bot || !self.is_triggered(msg) {
            return &[];
        }
        &msg.attachments
    }

    /// Asks the model about one attachment. Failures are only logged.
    pub async fn answer_attachment(
        &self,
        msg: &InboundMessage,
        att: &Attachment,
    ) -> Option<OutboundAction> {
        let prompt = attachment::prompt_for(att);
        match self
            .dispatcher
            .send(prompt, msg.author_id.as_str(), msg.display_name.as_str())
            .await
        {
            Ok(reply) => self
                .finish_reply(&reply, &att.name)
                .map(|text| OutboundAction::Reply {
                    to: MessageRef::from(msg),
                    text,
                }),
            Err(e) => {
                warn!(attachment = att.name.as_str(), error = %e, "could not answer attachment");
                None
            }
        }
    }

    fn pick_reaction(&self, content: &str) -> Option<&'static str> {
        if !self.dice.chance(self.behavior.react_chance) {
            return None;
        }
        decor::contextual_emoji(content, self.dice.as_ref()).or_else(|| {
            self.dice
                .chance(self.behavior.fallback_chance)
                .then(|| decor::random_emoji(self.dice.as_ref()))
        })
    }

    /// Cleans up a generated reply. `context` picks the decoration emoji.
    fn finish_reply(&self, reply: &str, context: &str) -> Option<String> {
        let mut text = decor::scrub(reply);
        if text.is_empty() {
            debug!("reply empty after cleanup, nothing to post");
            return None;
        }

        if self.dice.chance(self.behavior.decorate_chance) {
            let emoji = decor::contextual_emoji(context, self.dice.as_ref())
                .unwrap_or_else(|| decor::random_emoji(self.dice.as_ref()));
            text = decor::decorate(&text, emoji);
        }

        Some(decor::truncate_chars(&text, self.max_message_length).to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use crax_context::PromptBuilder;
    use crax_memory::MemoryStore;
    use crax_test_utils::{MockBackend, MockOutcome};

    use super::*;

    /// Answers `chance` calls from a script (then `false`) and always picks 0.
    struct ScriptedDice {
        chances: Mutex<VecDeque<bool>>,
    }

    impl ScriptedDice {
        fn new(chances: &[bool]) -> Arc<Self> {
            Arc::new(Self {
                chances: Mutex::new(chances.iter().copied().collect()),
            })
        }
    }

    impl Dice for ScriptedDice {
        fn chance(&self, _p: f64) -> bool {
            self.chances.lock().unwrap().pop_front().unwrap_or(false)
        }

        fn pick(&self, _len: usize) -> usize {
            0
        }
    }

    fn triggers() -> Vec<String> {
        ["uc", "unioncrax", "union crax", "ai"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn router(backend: MockBackend, dir: &tempfile::TempDir, dice: Arc<dyn Dice>) -> EventRouter {
        let store = MemoryStore::with_histories(dir.path().join("mem.json"), Default::default());
        let dispatcher = Dispatcher::new(
            store,
            Arc::new(backend),
            PromptBuilder::new("persona", "UnionCrax", 1800),
        );
        EventRouter::new(dispatcher, BehaviorConfig::default(), &triggers(), Some(2000))
            .with_dice(dice)
    }

    fn message(content: &str) -> InboundMessage {
        InboundMessage {
            id: "m1".into(),
            channel_id: "c1".into(),
            author_id: "u1".into(),
            display_name: "Alice".into(),
            content: content.into(),
            ..Default::default()
        }
    }

    fn png() -> Attachment {
        Attachment {
            name: "sunset.png".into(),
            url: "https://cdn.example/sunset.png".into(),
        }
    }

    fn reply_text(action: &OutboundAction) -> &str {
        match action {
            OutboundAction::Reply { text, .. } => text,
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bot_authors_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MockBackend::new();
        let r = router(backend.clone(), &dir, ScriptedDice::new(&[true, true]));
        let mut msg = message("uc hello");
        msg.author_is_bot = true;
        msg.attachments.push(png());
        assert!(r.handle(&msg).await.is_none());
        assert!(r.attachments_to_answer(&msg).is_empty());
        assert_eq!(backend.call_count().await, 0);
    }

    #[tokio::test]
    async fn keyword_triggers_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let r = router(MockBackend::new(), &dir, ScriptedDice::new(&[]));
        assert!(r.is_triggered(&message("hey UnionCrax")));
        assert!(r.is_triggered(&message("UC?")));
        assert!(!r.is_triggered(&message("hello there")));
    }

    #[tokio::test]
    async fn mention_and_reply_trigger() {
        let dir = tempfile::tempdir().unwrap();
        let r = router(MockBackend::new(), &dir, ScriptedDice::new(&[]));
        let mut msg = message("hello there");
        msg.mentions_bot = true;
        assert!(r.is_triggered(&msg));
        let mut msg = message("hello there");
        msg.reply_to_bot = true;
        assert!(r.is_triggered(&msg));
    }

    #[tokio::test]
    async fn untriggered_message_gets_contextual_reaction() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MockBackend::new();
        let r = router(backend.clone(), &dir, ScriptedDice::new(&[true]));
        let action = r.handle(&message("that movie was funny")).await;
        assert_eq!(
            action,
            Some(OutboundAction::React {
                to: MessageRef {
                    channel_id: "c1".into(),
                    message_id: "m1".into(),
                },
                emoji: "😂".into(),
            })
        );
        assert_eq!(backend.call_count().await, 0);
    }

    #[tokio::test]
    async fn untriggered_fallback_emoji_needs_second_roll() {
        let dir = tempfile::tempdir().unwrap();
        let r = router(MockBackend::new(), &dir, ScriptedDice::new(&[true, true]));
        let action = r.handle(&message("hello there")).await;
        assert!(matches!(action, Some(OutboundAction::React { ref emoji, .. }) if emoji == "😀"));

        let r = router(MockBackend::new(), &dir, ScriptedDice::new(&[true, false]));
        assert!(r.handle(&message("hello there")).await.is_none());
    }

    #[tokio::test]
    async fn untriggered_without_react_roll_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let r = router(MockBackend::new(), &dir, ScriptedDice::new(&[false]));
        assert!(r.handle(&message("so funny")).await.is_none());
    }

    #[tokio::test]
    async fn triggered_message_gets_scrubbed_reply() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MockBackend::with_replies(["As an AI, I love pizza"]);
        let r = router(backend.clone(), &dir, ScriptedDice::new(&[false]));
        let action = r.handle(&message("uc what do you eat")).await.unwrap();
        assert_eq!(reply_text(&action), ", I love pizza");
        assert!(backend.prompts().await[0].contains("Alice: uc what do you eat"));
    }

    #[tokio::test]
    async fn decorated_reply_uses_emoji_from_reply() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MockBackend::with_replies(["that is so cool"]);
        let r = router(backend, &dir, ScriptedDice::new(&[true]));
        let action = r.handle(&message("uc hi")).await.unwrap();
        assert_eq!(reply_text(&action), "😎 that is so cool 😎");
    }

    #[tokio::test]
    async fn long_reply_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MockBackend::with_replies(["x".repeat(2500)]);
        let r = router(backend, &dir, ScriptedDice::new(&[false]));
        let action = r.handle(&message("uc talk a lot")).await.unwrap();
        assert_eq!(reply_text(&action).chars().count(), 2000);
    }

    #[tokio::test]
    async fn failure_posts_apology() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MockBackend::with_outcomes(vec![MockOutcome::unavailable()]);
        let r = router(backend, &dir, ScriptedDice::new(&[]));
        let action = r.handle(&message("uc hi")).await.unwrap();
        assert_eq!(
            reply_text(&action),
            "Sorry, I encountered an error while processing your request."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn text_reply_does_not_wait_for_attachments() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MockBackend::with_outcomes(vec![
            MockOutcome::reply("text reply"),
            MockOutcome::delayed_reply("nice pic", Duration::from_secs(60)),
        ]);
        let r = router(backend.clone(), &dir, ScriptedDice::new(&[false, false]));
        let mut msg = message("uc look");
        msg.attachments.push(png());

        let action = tokio::time::timeout(Duration::from_secs(5), r.handle(&msg))
            .await
            .expect("text reply is ready before any attachment work")
            .unwrap();
        assert_eq!(reply_text(&action), "text reply");
        assert_eq!(backend.call_count().await, 1);

        let atts = r.attachments_to_answer(&msg);
        assert_eq!(atts.len(), 1);
        let action = r.answer_attachment(&msg, &atts[0]).await.unwrap();
        assert_eq!(reply_text(&action), "nice pic");
        let prompts = backend.prompts().await;
        assert!(prompts[1].contains("A user posted a GIF or image: \"sunset\"."));
    }

    #[tokio::test]
    async fn failed_attachment_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MockBackend::with_outcomes(vec![MockOutcome::bad_response()]);
        let r = router(backend, &dir, ScriptedDice::new(&[]));
        let mut msg = message("uc here");
        msg.attachments.push(Attachment {
            name: "notes.txt".into(),
            url: "https://cdn.example/notes.txt".into(),
        });

        assert!(r.answer_attachment(&msg, &msg.attachments[0]).await.is_none());
    }

    #[tokio::test]
    async fn attachments_on_untriggered_messages_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let r = router(MockBackend::new(), &dir, ScriptedDice::new(&[]));
        let mut msg = message("look at this");
        msg.attachments.push(png());
        assert!(r.attachments_to_answer(&msg).is_empty());
    }
}

// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Envelope normalization: routing, self/status filtering, and content
//! extraction.
//!
//! Turns a transport envelope into one of three outcomes -- ignore it,
//! treat it as ordinary text (subject to spam screening), or treat it as a
//! command invocation. The rules run in a fixed order; see
//! [`Normalizer::normalize`].

use corvid_core::types::{ChatId, Envelope, SenderId};
use tracing::debug;

/// Outcome of normalizing one envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedMessage {
    /// Nothing to do: status broadcast, own echo, or no extractable text.
    Ignore,
    /// Ordinary conversational text.
    Text {
        text: String,
        sender: SenderId,
        chat: ChatId,
        is_group: bool,
    },
    /// A prefix command invocation.
    Command {
        /// Lowercased command name, prefix stripped.
        name: String,
        args: Vec<String>,
        sender: SenderId,
        chat: ChatId,
        is_group: bool,
    },
}

/// Stateless envelope classifier.
pub struct Normalizer {
    prefix: String,
    observe_self: bool,
}

impl Normalizer {
    /// Create a normalizer for the given command prefix.
    ///
    /// `observe_self` opts into surfacing the bot's own outgoing messages
    /// when they carry commands; ordinary self text is always ignored to
    /// prevent feedback loops.
    pub fn new(prefix: impl Into<String>, observe_self: bool) -> Self {
        Self {
            prefix: prefix.into(),
            observe_self,
        }
    }

    /// Classify an envelope. Rules, in order:
    ///
    /// 1. Status-broadcast envelopes are ignored.
    /// 2. Self-authored envelopes are ignored, unless self-observation is
    ///    configured (and then only commands survive rule 4).
    /// 3. Text is extracted from the first populated field among body,
    ///    extended body, image caption, video caption; none means ignore.
    /// 4. Prefixed text is tokenized into a command invocation.
    /// 5. Everything else is ordinary text.
    pub fn normalize(&self, envelope: &Envelope) -> NormalizedMessage {
        if envelope.from_status {
            return NormalizedMessage::Ignore;
        }

        if envelope.from_self && !self.observe_self {
            return NormalizedMessage::Ignore;
        }

        let Some(text) = extract_text(envelope) else {
            debug!(sender = %envelope.sender, "no extractable text, ignoring");
            return NormalizedMessage::Ignore;
        };

        if let Some(stripped) = text.strip_prefix(&self.prefix) {
            let mut tokens = stripped.split_whitespace();
            let Some(first) = tokens.next() else {
                // Bare prefix carries no command name.
                return NormalizedMessage::Ignore;
            };
            return NormalizedMessage::Command {
                name: first.to_lowercase(),
                args: tokens.map(str::to_string).collect(),
                sender: envelope.sender.clone(),
                chat: envelope.chat.clone(),
                is_group: envelope.is_group,
            };
        }

        if envelope.from_self {
            // Self-observation surfaces only self-issued commands.
            return NormalizedMessage::Ignore;
        }

        NormalizedMessage::Text {
            text: text.to_string(),
            sender: envelope.sender.clone(),
            chat: envelope.chat.clone(),
            is_group: envelope.is_group,
        }
    }
}

/// First populated content field, in priority order: body, extended body,
/// image caption, video caption. Empty strings count as unpopulated.
fn extract_text(envelope: &Envelope) -> Option<&str> {
    [
        envelope.body.as_deref(),
        envelope.extended_body.as_deref(),
        envelope.image_caption.as_deref(),
        envelope.video_caption.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_test_utils::EnvelopeBuilder;

    fn normalizer() -> Normalizer {
        Normalizer::new(".", false)
    }

    #[test]
    fn status_broadcast_is_ignored() {
        let env = EnvelopeBuilder::new("a", "status")
            .from_status()
            .body(".ping")
            .build();
        assert_eq!(normalizer().normalize(&env), NormalizedMessage::Ignore);
    }

    #[test]
    fn self_authored_is_ignored() {
        let env = EnvelopeBuilder::new("bot", "chat")
            .from_self()
            .body("hello")
            .build();
        assert_eq!(normalizer().normalize(&env), NormalizedMessage::Ignore);
    }

    #[test]
    fn empty_envelope_is_ignored() {
        let env = EnvelopeBuilder::new("a", "chat").build();
        assert_eq!(normalizer().normalize(&env), NormalizedMessage::Ignore);
    }

    #[test]
    fn plain_body_is_ordinary_text() {
        let env = EnvelopeBuilder::new("a", "chat").body("good morning").build();
        match normalizer().normalize(&env) {
            NormalizedMessage::Text { text, sender, is_group, .. } => {
                assert_eq!(text, "good morning");
                assert_eq!(sender.0, "a");
                assert!(!is_group);
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn prefixed_body_is_a_command() {
        let env = EnvelopeBuilder::new("a", "chat")
            .group()
            .body(".PING one   two")
            .build();
        match normalizer().normalize(&env) {
            NormalizedMessage::Command { name, args, is_group, .. } => {
                assert_eq!(name, "ping");
                assert_eq!(args, vec!["one".to_string(), "two".to_string()]);
                assert!(is_group);
            }
            other => panic!("expected command, got {other:?}"),
        }
    }

    #[test]
    fn bare_prefix_is_ignored() {
        let env = EnvelopeBuilder::new("a", "chat").body(".").build();
        assert_eq!(normalizer().normalize(&env), NormalizedMessage::Ignore);
        let env = EnvelopeBuilder::new("a", "chat").body(".   ").build();
        assert_eq!(normalizer().normalize(&env), NormalizedMessage::Ignore);
    }

    #[test]
    fn image_caption_is_extracted_when_body_missing() {
        let env = EnvelopeBuilder::new("a", "chat")
            .image_caption(".status")
            .build();
        match normalizer().normalize(&env) {
            NormalizedMessage::Command { name, .. } => assert_eq!(name, "status"),
            other => panic!("expected command, got {other:?}"),
        }

        let env = EnvelopeBuilder::new("a", "chat")
            .image_caption("sunset pic")
            .build();
        assert!(matches!(
            normalizer().normalize(&env),
            NormalizedMessage::Text { .. }
        ));
    }

    #[test]
    fn body_takes_priority_over_captions() {
        let env = EnvelopeBuilder::new("a", "chat")
            .body("the body")
            .extended_body("the quote")
            .image_caption("the caption")
            .build();
        match normalizer().normalize(&env) {
            NormalizedMessage::Text { text, .. } => assert_eq!(text, "the body"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn extended_body_beats_captions() {
        let env = EnvelopeBuilder::new("a", "chat")
            .extended_body("the quote")
            .video_caption("the caption")
            .build();
        match normalizer().normalize(&env) {
            NormalizedMessage::Text { text, .. } => assert_eq!(text, "the quote"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn empty_body_falls_through_to_caption() {
        let env = EnvelopeBuilder::new("a", "chat")
            .body("")
            .video_caption("clip note")
            .build();
        match normalizer().normalize(&env) {
            NormalizedMessage::Text { text, .. } => assert_eq!(text, "clip note"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn observe_self_surfaces_only_commands() {
        let observing = Normalizer::new(".", true);

        let command = EnvelopeBuilder::new("bot", "chat")
            .from_self()
            .body(".ping")
            .build();
        assert!(matches!(
            observing.normalize(&command),
            NormalizedMessage::Command { .. }
        ));

        let chatter = EnvelopeBuilder::new("bot", "chat")
            .from_self()
            .body("just talking")
            .build();
        assert_eq!(observing.normalize(&chatter), NormalizedMessage::Ignore);
    }

    #[test]
    fn custom_prefix_is_honored() {
        let bang = Normalizer::new("!", false);
        let env = EnvelopeBuilder::new("a", "chat").body("!help").build();
        assert!(matches!(
            bang.normalize(&env),
            NormalizedMessage::Command { name, .. } if name == "help"
        ));

        // The default prefix no longer matches.
        let env = EnvelopeBuilder::new("a", "chat").body(".help").build();
        assert!(matches!(bang.normalize(&env), NormalizedMessage::Text { .. }));
    }
}

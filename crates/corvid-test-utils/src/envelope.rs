// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builder for inbound envelopes in tests.

use corvid_core::types::{ChatId, Envelope, MessageId, SenderId};

/// Builds an [`Envelope`] with sensible defaults: direct chat, not from the
/// bot, not from the status channel, no content fields set.
pub struct EnvelopeBuilder {
    envelope: Envelope,
}

impl EnvelopeBuilder {
    pub fn new(sender: &str, chat: &str) -> Self {
        Self {
            envelope: Envelope {
                id: MessageId(format!("test-{}", uuid::Uuid::new_v4())),
                chat: ChatId(chat.to_string()),
                sender: SenderId(sender.to_string()),
                is_group: false,
                from_self: false,
                from_status: false,
                body: None,
                extended_body: None,
                image_caption: None,
                video_caption: None,
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    pub fn body(mut self, text: &str) -> Self {
        self.envelope.body = Some(text.to_string());
        self
    }

    pub fn extended_body(mut self, text: &str) -> Self {
        self.envelope.extended_body = Some(text.to_string());
        self
    }

    pub fn image_caption(mut self, text: &str) -> Self {
        self.envelope.image_caption = Some(text.to_string());
        self
    }

    pub fn video_caption(mut self, text: &str) -> Self {
        self.envelope.video_caption = Some(text.to_string());
        self
    }

    pub fn group(mut self) -> Self {
        self.envelope.is_group = true;
        self
    }

    pub fn from_self(mut self) -> Self {
        self.envelope.from_self = true;
        self
    }

    pub fn from_status(mut self) -> Self {
        self.envelope.from_status = true;
        self
    }

    pub fn build(self) -> Envelope {
        self.envelope
    }
}

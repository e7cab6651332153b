// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport seam for messaging platform integrations.
//!
//! The runtime never talks to a chat protocol directly; it consumes this
//! interface. The backend is selected once at startup -- nothing in the
//! runtime probes a transport's capabilities at call time.

use async_trait::async_trait;

use crate::error::CorvidError;
use crate::types::{ChatId, MessageId, SendOptions, TransportEvent};

/// Bidirectional connection to a messaging platform.
///
/// Implementations own the socket/session and surface both lifecycle
/// updates and inbound messages through [`next_event`](Transport::next_event).
/// `connect` may be called again after a close to establish a fresh session.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short identifier of the transport backend (for logs and health output).
    fn name(&self) -> &str;

    /// Version of the transport adapter.
    fn version(&self) -> semver::Version;

    /// Establishes (or re-establishes) the platform session.
    async fn connect(&self) -> Result<(), CorvidError>;

    /// Returns the next lifecycle update or inbound message.
    async fn next_event(&self) -> Result<TransportEvent, CorvidError>;

    /// Sends a text message to a chat.
    async fn send_text(
        &self,
        chat: &ChatId,
        text: &str,
        opts: SendOptions,
    ) -> Result<MessageId, CorvidError>;

    /// Attaches a reaction to a message, or clears it when `emoji` is `None`.
    async fn send_reaction(
        &self,
        chat: &ChatId,
        message: &MessageId,
        emoji: Option<&str>,
    ) -> Result<(), CorvidError>;

    /// Deletes a previously sent message.
    async fn delete_message(&self, chat: &ChatId, message: &MessageId)
        -> Result<(), CorvidError>;
}

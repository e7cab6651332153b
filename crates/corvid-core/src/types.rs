// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Corvid bot runtime.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identity of a message sender (user account on the transport).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SenderId(pub String);

/// Unique identity of a chat (direct conversation or group).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub String);

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl std::fmt::Display for SenderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The transport's wrapped representation of one inbound message.
///
/// The transport adapter fills in routing metadata and whichever content
/// field the platform populated; the normalizer decides what to do with it.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub id: MessageId,
    pub chat: ChatId,
    pub sender: SenderId,
    /// Whether the chat is a group conversation.
    pub is_group: bool,
    /// Whether the bot's own account authored this message.
    pub from_self: bool,
    /// Whether the message came over the platform's status/broadcast channel.
    pub from_status: bool,
    /// Plain conversational body.
    pub body: Option<String>,
    /// Extended/quoted text body.
    pub extended_body: Option<String>,
    /// Caption attached to an image.
    pub image_caption: Option<String>,
    /// Caption attached to a video.
    pub video_caption: Option<String>,
    /// RFC 3339 receive timestamp.
    pub timestamp: String,
}

/// Connection phases as reported by the transport layer.
///
/// This is the *wire-level* view; the lifecycle supervisor folds these
/// updates into its own richer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionPhase {
    Connecting,
    AwaitingScan,
    Open,
    Closed,
}

/// A connection lifecycle update emitted by the transport.
#[derive(Debug, Clone)]
pub struct ConnectionUpdate {
    pub phase: ConnectionPhase,
    /// Out-of-band pairing challenge payload (QR-equivalent), present on
    /// [`ConnectionPhase::AwaitingScan`].
    pub pairing_challenge: Option<String>,
    /// Platform close/status code, present on [`ConnectionPhase::Closed`].
    pub close_code: Option<u16>,
    /// Human-readable detail for logs and status history.
    pub detail: Option<String>,
}

impl ConnectionUpdate {
    /// A bare phase transition with no payload.
    pub fn phase(phase: ConnectionPhase) -> Self {
        Self {
            phase,
            pairing_challenge: None,
            close_code: None,
            detail: None,
        }
    }

    /// A close update carrying the platform's close code.
    pub fn closed(code: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            phase: ConnectionPhase::Closed,
            pairing_challenge: None,
            close_code: code,
            detail: Some(detail.into()),
        }
    }
}

/// One event from the transport: either a lifecycle update or an inbound
/// message envelope.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    Connection(ConnectionUpdate),
    Message(Envelope),
}

/// Optional attributes for an outbound text message.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Senders to mention in the message.
    pub mentions: Vec<SenderId>,
    /// Message this one quotes/replies to.
    pub quoted: Option<MessageId>,
}

/// One entry in the connection status history ring.
#[derive(Debug, Clone)]
pub struct StatusHistoryEntry {
    /// Label of the state entered.
    pub state: String,
    /// When the state was entered.
    pub at: chrono::DateTime<chrono::Utc>,
    /// Optional detail (close reason, challenge note).
    pub detail: Option<String>,
    /// How long the previous state was held.
    pub held_for: Option<std::time::Duration>,
}

/// Point-in-time, read-only view of connection health.
///
/// Recomputed on demand from the supervisor's telemetry; purely
/// observability output, never an input to control flow.
#[derive(Debug, Clone)]
pub struct HealthSnapshot {
    /// Label of the current lifecycle state.
    pub state: String,
    /// When the current connection reached `Open`, if it did.
    pub connected_since: Option<chrono::DateTime<chrono::Utc>>,
    /// Reconnect attempts consumed since the last successful open.
    pub reconnect_attempts: u32,
    /// Inbound messages processed while `Open`.
    pub messages_processed: u64,
    /// Best-effort 0-100 health score.
    pub score: u8,
    /// Most recent state transitions, oldest first, at most 10 entries.
    pub history: Vec<StatusHistoryEntry>,
}

impl HealthSnapshot {
    /// Connection uptime, if the connection is open.
    pub fn uptime(&self) -> Option<chrono::Duration> {
        self.connected_since
            .map(|since| chrono::Utc::now() - since)
    }
}

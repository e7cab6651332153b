// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport for deterministic testing.
//!
//! `MockTransport` implements `Transport` with scripted events and captured
//! outbound operations for assertion in tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use corvid_core::error::CorvidError;
use corvid_core::types::{ChatId, MessageId, SendOptions, TransportEvent};
use corvid_core::Transport;

/// A captured `send_text` call.
#[derive(Debug, Clone)]
pub struct SentText {
    pub chat: ChatId,
    pub text: String,
    pub opts: SendOptions,
}

/// A captured `send_reaction` call.
#[derive(Debug, Clone)]
pub struct SentReaction {
    pub chat: ChatId,
    pub message: MessageId,
    pub emoji: Option<String>,
}

/// A mock messaging transport for testing.
///
/// Provides scripted events and three capture logs:
/// - **events**: pushed via `push_event()`, returned by `next_event()`
/// - **sent**: texts passed to `send_text()`
/// - **reactions** / **deleted**: the other outbound operations
pub struct MockTransport {
    events: Mutex<VecDeque<TransportEvent>>,
    notify: Notify,
    sent: Mutex<Vec<SentText>>,
    reactions: Mutex<Vec<SentReaction>>,
    deleted: Mutex<Vec<(ChatId, MessageId)>>,
    connect_calls: AtomicU32,
    fail_sends: AtomicBool,
    fail_reactions: AtomicBool,
}

impl MockTransport {
    /// Create a mock transport with no scripted events.
    pub fn new() -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            sent: Mutex::new(Vec::new()),
            reactions: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            connect_calls: AtomicU32::new(0),
            fail_sends: AtomicBool::new(false),
            fail_reactions: AtomicBool::new(false),
        }
    }

    /// Queue an event for `next_event()` to return.
    pub async fn push_event(&self, event: TransportEvent) {
        self.events.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// All texts sent through `send_text()`.
    pub async fn sent_texts(&self) -> Vec<SentText> {
        self.sent.lock().await.clone()
    }

    /// Count of texts sent through `send_text()`.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Clear the captured texts.
    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    /// All reactions sent through `send_reaction()`.
    pub async fn reactions(&self) -> Vec<SentReaction> {
        self.reactions.lock().await.clone()
    }

    /// All messages removed through `delete_message()`.
    pub async fn deleted(&self) -> Vec<(ChatId, MessageId)> {
        self.deleted.lock().await.clone()
    }

    /// Number of `connect()` calls so far.
    pub fn connect_count(&self) -> u32 {
        self.connect_calls.load(Ordering::SeqCst)
    }

    /// Make subsequent `send_text()` calls fail.
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `send_reaction()` calls fail.
    pub fn set_fail_reactions(&self, fail: bool) {
        self.fail_reactions.store(fail, Ordering::SeqCst);
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn connect(&self) -> Result<(), CorvidError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn next_event(&self) -> Result<TransportEvent, CorvidError> {
        loop {
            {
                let mut queue = self.events.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            // Wait for notification that a new event was pushed.
            self.notify.notified().await;
        }
    }

    async fn send_text(
        &self,
        chat: &ChatId,
        text: &str,
        opts: SendOptions,
    ) -> Result<MessageId, CorvidError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(CorvidError::transport("mock send failure"));
        }
        self.sent.lock().await.push(SentText {
            chat: chat.clone(),
            text: text.to_string(),
            opts,
        });
        Ok(MessageId(format!("mock-msg-{}", uuid::Uuid::new_v4())))
    }

    async fn send_reaction(
        &self,
        chat: &ChatId,
        message: &MessageId,
        emoji: Option<&str>,
    ) -> Result<(), CorvidError> {
        if self.fail_reactions.load(Ordering::SeqCst) {
            return Err(CorvidError::transport("mock reaction failure"));
        }
        self.reactions.lock().await.push(SentReaction {
            chat: chat.clone(),
            message: message.clone(),
            emoji: emoji.map(str::to_string),
        });
        Ok(())
    }

    async fn delete_message(
        &self,
        chat: &ChatId,
        message: &MessageId,
    ) -> Result<(), CorvidError> {
        self.deleted
            .lock()
            .await
            .push((chat.clone(), message.clone()));
        Ok(())
    }
}

// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The command contract and the read-only registry of registered commands.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use corvid_core::error::CorvidError;
use corvid_core::types::{ChatId, MessageId, SenderId};
use corvid_core::Transport;

/// Per-invocation context built from the normalized message.
///
/// Constructed fresh for every dispatch and never persisted past it.
#[derive(Debug, Clone)]
pub struct DispatchContext {
    pub sender: SenderId,
    pub chat: ChatId,
    pub is_group: bool,
    /// The inbound message that carried the invocation, for reactions and quoting.
    pub message_id: MessageId,
}

/// A user-invokable command.
///
/// Implementations hold whatever state they need at construction time;
/// `execute` may call back into the transport and take arbitrary time. Any
/// error it returns is contained at the dispatcher boundary -- it is logged
/// and turned into a generic failure notice, never propagated further.
#[async_trait]
pub trait Command: Send + Sync {
    /// Invocation name, matched case-insensitively.
    fn name(&self) -> &str;

    /// One-line description shown in help output.
    fn description(&self) -> &str;

    /// Usage hint shown in help output, e.g. `.ping`.
    fn usage(&self) -> &str;

    /// Restrict to the configured bot owner.
    fn owner_only(&self) -> bool {
        false
    }

    /// Restrict to group chats.
    fn group_only(&self) -> bool {
        false
    }

    /// Run the command body.
    async fn execute(
        &self,
        transport: &dyn Transport,
        ctx: &DispatchContext,
        args: &[String],
    ) -> Result<(), CorvidError>;
}

/// Name-keyed mapping of registered commands.
///
/// Populated during startup wiring, then shared immutably behind an `Arc`
/// for the process lifetime -- safe for unsynchronized concurrent reads.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command under its lowercased name.
    ///
    /// Registering a second command with the same name replaces the first.
    pub fn register(&mut self, command: Arc<dyn Command>) {
        self.commands
            .insert(command.name().to_lowercase(), command);
    }

    /// Look up a command by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.commands.get(&name.to_lowercase())
    }

    /// All registered commands, sorted by name.
    pub fn list(&self) -> Vec<&Arc<dyn Command>> {
        let mut commands: Vec<&Arc<dyn Command>> = self.commands.values().collect();
        commands.sort_by(|a, b| a.name().cmp(b.name()));
        commands
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

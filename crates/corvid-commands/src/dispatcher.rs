// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command dispatch: gate chain, body-error containment, and feedback.
//!
//! Gate order per invocation: registry lookup (unknown commands are dropped
//! silently), owner scope, group scope, cooldown reservation. Only then does
//! the body run. Body errors are contained here -- logged and converted into
//! one generic user notice -- and release the cooldown reservation so a
//! failed command does not consume the sender's window.

use std::sync::Arc;

use tracing::{debug, error, warn};

use corvid_core::types::{SendOptions, SenderId};
use corvid_core::Transport;

use crate::cooldown::{CooldownDecision, CooldownGate};
use crate::registry::{CommandRegistry, DispatchContext};

const OWNER_DENIED_NOTICE: &str = "That command is restricted to the bot owner.";
const GROUP_ONLY_NOTICE: &str = "That command only works in group chats.";
const FAILURE_NOTICE: &str = "Something went wrong running that command. Please try again later.";

const ACK_REACTION: &str = "\u{23f3}";
const DONE_REACTION: &str = "\u{2705}";

/// How one dispatch attempt ended. Telemetry only -- user-visible behavior
/// is the notices (or deliberate silence) sent along the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Executed,
    UnknownCommand,
    OwnerDenied,
    GroupOnly,
    OnCooldown,
    Failed,
}

/// Walks invocations through the gate chain and runs command bodies.
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    cooldowns: Arc<CooldownGate>,
    owner: Option<SenderId>,
    feedback: bool,
}

impl Dispatcher {
    /// Create a dispatcher over a finished registry.
    ///
    /// `owner` enables owner-only commands; `feedback` enables the transient
    /// ack/done reactions around execution.
    pub fn new(
        registry: Arc<CommandRegistry>,
        cooldowns: Arc<CooldownGate>,
        owner: Option<SenderId>,
        feedback: bool,
    ) -> Self {
        Self {
            registry,
            cooldowns,
            owner,
            feedback,
        }
    }

    /// Dispatch one command invocation.
    ///
    /// Safe to run concurrently for different senders; the cooldown gate
    /// serializes same-command invocations per sender.
    pub async fn dispatch(
        &self,
        transport: Arc<dyn Transport>,
        ctx: DispatchContext,
        name: &str,
        args: &[String],
    ) -> DispatchOutcome {
        let Some(command) = self.registry.get(name) else {
            // Deliberately silent: dotted text that is not a command
            // produces no chat noise.
            debug!(command = name, sender = %ctx.sender, "unknown command ignored");
            return DispatchOutcome::UnknownCommand;
        };

        if command.owner_only() && self.owner.as_ref() != Some(&ctx.sender) {
            debug!(command = name, sender = %ctx.sender, "owner-only command denied");
            self.notify(transport.as_ref(), &ctx, OWNER_DENIED_NOTICE).await;
            return DispatchOutcome::OwnerDenied;
        }

        if command.group_only() && !ctx.is_group {
            debug!(command = name, sender = %ctx.sender, "group-only command outside group");
            self.notify(transport.as_ref(), &ctx, GROUP_ONLY_NOTICE).await;
            return DispatchOutcome::GroupOnly;
        }

        match self.cooldowns.try_acquire(&ctx.sender, command.name()) {
            CooldownDecision::Blocked { remaining } => {
                let notice = format!(
                    "Please wait {:.1}s before using {} again.",
                    remaining.as_secs_f32(),
                    command.name()
                );
                self.notify(transport.as_ref(), &ctx, &notice).await;
                return DispatchOutcome::OnCooldown;
            }
            CooldownDecision::Ready => {}
        }

        self.react(transport.as_ref(), &ctx, Some(ACK_REACTION)).await;

        match command.execute(transport.as_ref(), &ctx, args).await {
            Ok(()) => {
                // Reap the cooldown entry once it has elapsed so the map
                // stays bounded.
                let gate = Arc::clone(&self.cooldowns);
                let sender = ctx.sender.clone();
                let cmd = command.name().to_string();
                let delay = gate.duration();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    gate.remove_if_expired(&sender, &cmd);
                });

                self.react(transport.as_ref(), &ctx, Some(DONE_REACTION)).await;
                DispatchOutcome::Executed
            }
            Err(e) => {
                error!(command = name, sender = %ctx.sender, error = %e, "command body failed");
                // A failed command must not consume the sender's window.
                self.cooldowns.release(&ctx.sender, command.name());
                self.react(transport.as_ref(), &ctx, None).await;
                self.notify(transport.as_ref(), &ctx, FAILURE_NOTICE).await;
                DispatchOutcome::Failed
            }
        }
    }

    /// Send a user-facing notice quoting the invoking message.
    async fn notify(&self, transport: &dyn Transport, ctx: &DispatchContext, text: &str) {
        let opts = SendOptions {
            quoted: Some(ctx.message_id.clone()),
            ..SendOptions::default()
        };
        if let Err(e) = transport.send_text(&ctx.chat, text, opts).await {
            warn!(chat = %ctx.chat, error = %e, "failed to send dispatch notice");
        }
    }

    /// Send feedback reactions when enabled; failures never affect dispatch.
    async fn react(&self, transport: &dyn Transport, ctx: &DispatchContext, emoji: Option<&str>) {
        if !self.feedback {
            return;
        }
        if let Err(e) = transport
            .send_reaction(&ctx.chat, &ctx.message_id, emoji)
            .await
        {
            warn!(chat = %ctx.chat, error = %e, "failed to send feedback reaction");
        }
    }
}

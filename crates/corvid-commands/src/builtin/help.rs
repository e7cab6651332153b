// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command listing rendered from the registry's descriptors.

use async_trait::async_trait;

use corvid_core::error::CorvidError;
use corvid_core::types::SendOptions;
use corvid_core::Transport;

use crate::registry::{Command, CommandRegistry, DispatchContext};

const DESCRIPTION: &str = "list available commands";

/// Sends the command listing.
///
/// The listing is rendered once at construction from the registry built so
/// far; register this command last so it covers everything.
pub struct HelpCommand {
    text: String,
}

impl HelpCommand {
    /// Render the listing from `registry`, including this command's own entry.
    pub fn from_registry(registry: &CommandRegistry, bot_name: &str) -> Self {
        let mut lines: Vec<String> = registry
            .list()
            .iter()
            .map(|c| format!("{} - {}", c.usage(), c.description()))
            .collect();
        lines.push(format!(".help - {DESCRIPTION}"));
        lines.sort();

        let text = format!("{bot_name} commands:\n{}", lines.join("\n"));
        Self { text }
    }
}

#[async_trait]
impl Command for HelpCommand {
    fn name(&self) -> &str {
        "help"
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn usage(&self) -> &str {
        ".help"
    }

    async fn execute(
        &self,
        transport: &dyn Transport,
        ctx: &DispatchContext,
        _args: &[String],
    ) -> Result<(), CorvidError> {
        transport
            .send_text(&ctx.chat, &self.text, SendOptions::default())
            .await?;
        Ok(())
    }
}

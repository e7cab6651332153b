// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Liveness check command.

use async_trait::async_trait;

use corvid_core::error::CorvidError;
use corvid_core::types::SendOptions;
use corvid_core::Transport;

use crate::registry::{Command, DispatchContext};

/// Replies `pong`, quoting the invocation.
#[derive(Debug, Default)]
pub struct PingCommand;

#[async_trait]
impl Command for PingCommand {
    fn name(&self) -> &str {
        "ping"
    }

    fn description(&self) -> &str {
        "check that the bot is alive"
    }

    fn usage(&self) -> &str {
        ".ping"
    }

    async fn execute(
        &self,
        transport: &dyn Transport,
        ctx: &DispatchContext,
        _args: &[String],
    ) -> Result<(), CorvidError> {
        let opts = SendOptions {
            quoted: Some(ctx.message_id.clone()),
            ..SendOptions::default()
        };
        transport.send_text(&ctx.chat, "pong", opts).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_core::types::{ChatId, MessageId, SenderId};
    use corvid_test_utils::MockTransport;

    #[tokio::test]
    async fn ping_replies_pong_quoting_invocation() {
        let transport = MockTransport::new();
        let ctx = DispatchContext {
            sender: SenderId("a".to_string()),
            chat: ChatId("chat-1".to_string()),
            is_group: false,
            message_id: MessageId("msg-7".to_string()),
        };

        PingCommand.execute(&transport, &ctx, &[]).await.unwrap();

        let sent = transport.sent_texts().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text, "pong");
        assert_eq!(
            sent[0].opts.quoted,
            Some(MessageId("msg-7".to_string()))
        );
    }
}

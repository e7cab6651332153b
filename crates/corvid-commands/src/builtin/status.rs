// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection health report command.

use std::sync::Arc;

use async_trait::async_trait;

use corvid_core::error::CorvidError;
use corvid_core::types::SendOptions;
use corvid_core::{HealthSource, Transport};

use crate::registry::{Command, DispatchContext};

/// Formats the lifecycle supervisor's health snapshot into a chat reply.
pub struct StatusCommand {
    health: Arc<dyn HealthSource>,
}

impl StatusCommand {
    pub fn new(health: Arc<dyn HealthSource>) -> Self {
        Self { health }
    }
}

/// Format seconds into a human-readable duration string.
fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[async_trait]
impl Command for StatusCommand {
    fn name(&self) -> &str {
        "status"
    }

    fn description(&self) -> &str {
        "show connection health"
    }

    fn usage(&self) -> &str {
        ".status"
    }

    async fn execute(
        &self,
        transport: &dyn Transport,
        ctx: &DispatchContext,
        _args: &[String],
    ) -> Result<(), CorvidError> {
        let snapshot = self.health.snapshot();

        let uptime = snapshot
            .uptime()
            .map(|d| format_uptime(d.num_seconds().max(0) as u64))
            .unwrap_or_else(|| "not connected".to_string());

        let mut text = format!(
            "state: {}\nscore: {}/100\nuptime: {}\nreconnect attempts: {}\nmessages processed: {}",
            snapshot.state,
            snapshot.score,
            uptime,
            snapshot.reconnect_attempts,
            snapshot.messages_processed,
        );

        if let Some(last) = snapshot.history.last() {
            text.push_str(&format!(
                "\nlast transition: {} at {}",
                last.state,
                last.at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }

        transport
            .send_text(&ctx.chat, &text, SendOptions::default())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_core::types::{ChatId, HealthSnapshot, MessageId, SenderId};
    use corvid_test_utils::MockTransport;

    struct StubHealth;

    impl HealthSource for StubHealth {
        fn snapshot(&self) -> HealthSnapshot {
            HealthSnapshot {
                state: "open".to_string(),
                connected_since: Some(chrono::Utc::now() - chrono::Duration::seconds(3900)),
                reconnect_attempts: 1,
                messages_processed: 42,
                score: 95,
                history: vec![],
            }
        }
    }

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(59), "0m");
        assert_eq!(format_uptime(60), "1m");
        assert_eq!(format_uptime(3900), "1h 5m");
        assert_eq!(format_uptime(90061), "1d 1h 1m");
    }

    #[tokio::test]
    async fn status_reports_snapshot_fields() {
        let transport = MockTransport::new();
        let command = StatusCommand::new(Arc::new(StubHealth));
        let ctx = DispatchContext {
            sender: SenderId("a".to_string()),
            chat: ChatId("chat-1".to_string()),
            is_group: false,
            message_id: MessageId("msg-1".to_string()),
        };

        command.execute(&transport, &ctx, &[]).await.unwrap();

        let sent = transport.sent_texts().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("state: open"));
        assert!(sent[0].text.contains("score: 95/100"));
        assert!(sent[0].text.contains("uptime: 1h 5m"));
        assert!(sent[0].text.contains("messages processed: 42"));
    }
}

// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection lifecycle supervision and the bot event loop.
//!
//! The [`BotLoop`] is the central coordinator that:
//! - Consumes inbound envelopes forwarded by the [`ConnectionSupervisor`]
//! - Normalizes each envelope into ignore / text / command
//! - Screens ordinary text through the moderation engine, with graduated
//!   responses and an auto-block signal for repeat offenders
//! - Spawns command dispatches so slow bodies never stall the loop

pub mod connection;
pub mod normalizer;
pub mod shutdown;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use corvid_commands::{DispatchContext, Dispatcher};
use corvid_core::error::CorvidError;
use corvid_core::types::{ChatId, Envelope, MessageId, SendOptions, SenderId};
use corvid_core::Transport;
use corvid_moderation::{FrequencyTracker, ScoringEngine};

pub use connection::{CloseReason, ConnectionState, ConnectionSupervisor, ReconnectPolicy};
pub use normalizer::{NormalizedMessage, Normalizer};

/// Signal surfaced when a sender crosses the auto-block rule.
///
/// The actual removal/ban action belongs to an external collaborator; the
/// runtime only reports the decision.
#[derive(Debug, Clone)]
pub struct AutoBlock {
    pub sender: SenderId,
    pub chat: ChatId,
    /// Warning count including the message that triggered the block.
    pub warnings: u32,
}

/// The main event loop coordinating normalization, moderation, and dispatch.
pub struct BotLoop {
    transport: Arc<dyn Transport>,
    normalizer: Normalizer,
    tracker: Arc<FrequencyTracker>,
    engine: Arc<ScoringEngine>,
    dispatcher: Arc<Dispatcher>,
    autoblock_tx: Option<mpsc::Sender<AutoBlock>>,
}

impl BotLoop {
    /// Create a bot loop over already-wired components.
    pub fn new(
        transport: Arc<dyn Transport>,
        normalizer: Normalizer,
        tracker: Arc<FrequencyTracker>,
        engine: Arc<ScoringEngine>,
        dispatcher: Arc<Dispatcher>,
        autoblock_tx: Option<mpsc::Sender<AutoBlock>>,
    ) -> Self {
        Self {
            transport,
            normalizer,
            tracker,
            engine,
            dispatcher,
            autoblock_tx,
        }
    }

    /// Run until the cancellation token fires or the inbound channel closes.
    ///
    /// Envelopes are processed one at a time; command dispatches are spawned
    /// so executions for different senders overlap while the loop stays
    /// responsive.
    pub async fn run(
        &self,
        mut inbound_rx: mpsc::Receiver<Envelope>,
        cancel: CancellationToken,
    ) -> Result<(), CorvidError> {
        info!("bot loop running");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping bot loop");
                    break;
                }
                maybe = inbound_rx.recv() => {
                    match maybe {
                        Some(envelope) => self.handle_envelope(envelope).await,
                        None => {
                            info!("inbound channel closed, stopping bot loop");
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Normalize one envelope and route it.
    async fn handle_envelope(&self, envelope: Envelope) {
        let message_id = envelope.id.clone();
        match self.normalizer.normalize(&envelope) {
            NormalizedMessage::Ignore => {
                debug!(sender = %envelope.sender, "envelope ignored");
            }
            NormalizedMessage::Text {
                text,
                sender,
                chat,
                ..
            } => {
                self.screen_text(&text, sender, chat, message_id).await;
            }
            NormalizedMessage::Command {
                name,
                args,
                sender,
                chat,
                is_group,
            } => {
                let ctx = DispatchContext {
                    sender,
                    chat,
                    is_group,
                    message_id,
                };
                let dispatcher = Arc::clone(&self.dispatcher);
                let transport = Arc::clone(&self.transport);
                tokio::spawn(async move {
                    dispatcher.dispatch(transport, ctx, &name, &args).await;
                });
            }
        }
    }

    /// Record activity, score the text, and send the graduated response.
    async fn screen_text(
        &self,
        text: &str,
        sender: SenderId,
        chat: ChatId,
        message_id: MessageId,
    ) {
        self.tracker.record(&sender);
        let analysis = self.engine.analyze(text, &sender);

        if analysis.is_spam {
            // Third-strike check runs against the count *before* this
            // message's warning lands.
            let auto_block = self.engine.should_auto_block(&analysis, &sender);
            let warnings = self.engine.record_warning(&sender);

            warn!(
                sender = %sender,
                confidence = analysis.confidence,
                severity = %analysis.severity,
                warnings,
                reasons = ?analysis.reasons,
                "spam detected"
            );

            let notice = format!(
                "Your message was flagged as spam ({}). Warning {warnings}/3.",
                analysis.reasons.first().map(String::as_str).unwrap_or("policy"),
            );
            self.reply(&chat, &notice, &message_id).await;

            if auto_block {
                warn!(sender = %sender, warnings, "auto-block threshold reached");
                if let Some(tx) = &self.autoblock_tx {
                    let signal = AutoBlock {
                        sender: sender.clone(),
                        chat: chat.clone(),
                        warnings,
                    };
                    if tx.send(signal).await.is_err() {
                        warn!("auto-block receiver dropped");
                    }
                }
            }
        } else if analysis.is_suspicious {
            debug!(
                sender = %sender,
                confidence = analysis.confidence,
                "suspicious message, sending soft warning"
            );
            self.reply(
                &chat,
                "Your message looks suspicious. Please keep this chat friendly.",
                &message_id,
            )
            .await;
        }
    }

    /// Send a moderation reply; failures are logged and swallowed.
    async fn reply(&self, chat: &ChatId, text: &str, quoted: &MessageId) {
        let opts = SendOptions {
            quoted: Some(quoted.clone()),
            ..SendOptions::default()
        };
        if let Err(e) = self.transport.send_text(chat, text, opts).await {
            warn!(chat = %chat, error = %e, "failed to send moderation reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_commands::builtin::PingCommand;
    use corvid_commands::{CommandRegistry, CooldownGate};
    use corvid_moderation::Thresholds;
    use corvid_test_utils::{EnvelopeBuilder, MockTransport};
    use std::time::Duration;

    struct Fixture {
        transport: Arc<MockTransport>,
        bot: BotLoop,
        engine: Arc<ScoringEngine>,
        tracker: Arc<FrequencyTracker>,
        autoblock_rx: mpsc::Receiver<AutoBlock>,
    }

    fn fixture() -> Fixture {
        let transport = Arc::new(MockTransport::new());
        let tracker = Arc::new(FrequencyTracker::new(Duration::from_secs(60), 10));
        let engine = Arc::new(ScoringEngine::new(tracker.clone(), Thresholds::default()));

        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(PingCommand));
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::new(registry),
            Arc::new(CooldownGate::new(Duration::from_secs(3))),
            None,
            false,
        ));

        let (autoblock_tx, autoblock_rx) = mpsc::channel(8);
        let bot = BotLoop::new(
            transport.clone(),
            Normalizer::new(".", false),
            tracker.clone(),
            engine.clone(),
            dispatcher,
            Some(autoblock_tx),
        );

        Fixture {
            transport,
            bot,
            engine,
            tracker,
            autoblock_rx,
        }
    }

    async fn wait_for_sends(transport: &MockTransport, count: usize) {
        for _ in 0..200 {
            if transport.sent_count().await >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("timed out waiting for {count} sends");
    }

    #[tokio::test(start_paused = true)]
    async fn command_envelope_is_dispatched() {
        let f = fixture();
        let env = EnvelopeBuilder::new("a", "chat").body(".ping").build();

        f.bot.handle_envelope(env).await;
        wait_for_sends(&f.transport, 1).await;

        let sent = f.transport.sent_texts().await;
        assert_eq!(sent[0].text, "pong");
        // Command text is not screened for spam.
        assert_eq!(f.tracker.tracked_senders(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_command_stays_silent() {
        let f = fixture();
        let env = EnvelopeBuilder::new("a", "chat").body(".frobnicate").build();

        f.bot.handle_envelope(env).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(f.transport.sent_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn ignored_envelope_touches_nothing() {
        let f = fixture();
        let env = EnvelopeBuilder::new("a", "status")
            .from_status()
            .body("broadcast")
            .build();

        f.bot.handle_envelope(env).await;

        assert_eq!(f.transport.sent_count().await, 0);
        assert_eq!(f.tracker.tracked_senders(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn clean_text_gets_no_reply() {
        let f = fixture();
        let env = EnvelopeBuilder::new("a", "chat").body("hello there").build();

        f.bot.handle_envelope(env).await;

        assert_eq!(f.transport.sent_count().await, 0);
        assert_eq!(f.engine.warning_count(&SenderId("a".to_string())), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn suspicious_text_gets_soft_warning_without_recorded_warning() {
        let f = fixture();
        // One family (+15), one keyword (+20), one shortener (+25) = 60:
        // suspicious but below the spam threshold.
        let env = EnvelopeBuilder::new("a", "chat")
            .body("limited time offer golpe bit.ly/x")
            .build();

        f.bot.handle_envelope(env).await;

        let sent = f.transport.sent_texts().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("suspicious"));
        assert_eq!(f.engine.warning_count(&SenderId("a".to_string())), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn flood_escalates_to_warnings_and_auto_block() {
        let mut f = fixture();
        let sender = SenderId("a".to_string());

        // 13 ordinary messages in quick succession. The flood threshold
        // trips from the 11th on; the 13th is the third strike.
        for i in 0..13 {
            let env = EnvelopeBuilder::new("a", "chat")
                .body(&format!("message number {i}"))
                .build();
            f.bot.handle_envelope(env).await;
        }

        assert_eq!(f.engine.warning_count(&sender), 3);

        let flagged: Vec<_> = f
            .transport
            .sent_texts()
            .await
            .into_iter()
            .filter(|s| s.text.contains("flagged as spam"))
            .collect();
        assert_eq!(flagged.len(), 3);
        assert!(flagged[0].text.contains("flood"));

        let block = f.autoblock_rx.try_recv().expect("auto-block signal");
        assert_eq!(block.sender, sender);
        assert_eq!(block.warnings, 3);
        // Only the third strike signals.
        assert!(f.autoblock_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn run_processes_channel_until_cancelled() {
        let f = fixture();
        let (tx, rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();

        let transport = f.transport.clone();
        let cancel_clone = cancel.clone();
        let runner = tokio::spawn(async move { f.bot.run(rx, cancel_clone).await });

        tx.send(EnvelopeBuilder::new("a", "chat").body(".ping").build())
            .await
            .unwrap();
        wait_for_sends(&transport, 1).await;
        assert_eq!(transport.sent_texts().await[0].text, "pong");

        cancel.cancel();
        runner.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_when_channel_closes() {
        let f = fixture();
        let (tx, rx) = mpsc::channel::<Envelope>(16);
        drop(tx);

        f.bot.run(rx, CancellationToken::new()).await.unwrap();
    }
}

// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Full runtime wiring for `corvid serve`.
//!
//! Builds the moderation engine, command registry, dispatcher, and
//! connection supervisor from configuration, then runs the supervisor and
//! bot loop until shutdown. Pairing challenges published by the supervisor
//! are rendered as terminal QR codes for the operator.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use corvid_agent::{
    shutdown, AutoBlock, BotLoop, ConnectionState, ConnectionSupervisor, Normalizer,
    ReconnectPolicy,
};
use corvid_commands::builtin::{HelpCommand, PingCommand, StatusCommand};
use corvid_commands::{CommandRegistry, CooldownGate, Dispatcher};
use corvid_config::CorvidConfig;
use corvid_core::error::CorvidError;
use corvid_core::types::{ChatId, SenderId};
use corvid_core::Transport;
use corvid_moderation::{FrequencyTracker, ScoringEngine, Thresholds};

/// Run the full bot runtime until SIGINT/SIGTERM.
pub async fn run_serve(
    config: CorvidConfig,
    transport: Arc<dyn Transport>,
) -> Result<(), CorvidError> {
    init_tracing(&config.bot.log_level);
    let cancel = shutdown::install_signal_handler();
    run_with_cancel(config, transport, cancel).await
}

/// Run the full bot runtime until `cancel` fires, the transport logs out,
/// or the reconnect budget is exhausted.
pub async fn run_with_cancel(
    config: CorvidConfig,
    transport: Arc<dyn Transport>,
    cancel: CancellationToken,
) -> Result<(), CorvidError> {
    info!(
        bot = config.bot.name.as_str(),
        transport = transport.name(),
        "starting corvid serve"
    );

    let owner_sender = config.bot.owner.clone().map(SenderId);
    let owner_chat = config.bot.owner.clone().map(ChatId);

    // Moderation: shared frequency window feeding the scoring engine.
    let tracker = Arc::new(FrequencyTracker::new(
        Duration::from_secs(config.moderation.flood_window_secs),
        config.moderation.flood_threshold,
    ));
    let engine = Arc::new(ScoringEngine::new(
        tracker.clone(),
        Thresholds {
            suspicious: config.moderation.suspicious_threshold,
            url_force: config.moderation.url_force_threshold,
            spam: config.moderation.spam_threshold,
        },
    ));

    // Connection supervision.
    let policy = ReconnectPolicy {
        max_attempts: config.connection.max_reconnect_attempts,
        delay: Duration::from_millis(config.connection.reconnect_delay_ms),
    };
    let supervisor = Arc::new(ConnectionSupervisor::new(
        transport.clone(),
        policy,
        owner_chat,
    ));

    // Command registry: builtins first, help rendered over them last.
    let mut registry = CommandRegistry::new();
    registry.register(Arc::new(PingCommand));
    registry.register(Arc::new(StatusCommand::new(supervisor.clone())));
    let help = HelpCommand::from_registry(&registry, &config.bot.name);
    registry.register(Arc::new(help));
    info!(commands = registry.len(), "command registry initialized");

    let cooldowns = Arc::new(CooldownGate::new(Duration::from_millis(
        config.commands.cooldown_ms,
    )));
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(registry),
        cooldowns,
        owner_sender,
        config.bot.feedback,
    ));

    // Auto-block signals: the ban action itself belongs to the transport
    // operator; here they are surfaced in the logs.
    let (autoblock_tx, mut autoblock_rx) = mpsc::channel::<AutoBlock>(32);
    tokio::spawn(async move {
        while let Some(block) = autoblock_rx.recv().await {
            warn!(
                sender = %block.sender,
                chat = %block.chat,
                warnings = block.warnings,
                "sender crossed the auto-block threshold"
            );
        }
    });

    let bot = BotLoop::new(
        transport.clone(),
        Normalizer::new(config.bot.prefix.clone(), config.bot.observe_self),
        tracker,
        engine,
        dispatcher,
        Some(autoblock_tx),
    );

    // Render pairing challenges for the operator as they arrive.
    let mut state_rx = supervisor.state_watch();
    tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let challenge = match &*state_rx.borrow() {
                ConnectionState::AwaitingScan { challenge } => Some(challenge.clone()),
                _ => None,
            };
            if let Some(challenge) = challenge {
                match render_pairing_qr(&challenge) {
                    Ok(qr) => println!("Scan this code to authenticate:\n{qr}"),
                    Err(e) => warn!(error = %e, "failed to render pairing challenge"),
                }
            }
        }
    });

    let (inbound_tx, inbound_rx) = mpsc::channel(512);
    let supervisor_task = {
        let supervisor = supervisor.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { supervisor.run(inbound_tx, cancel).await })
    };

    let loop_result = bot.run(inbound_rx, cancel.clone()).await;

    // The loop is done (shutdown or supervisor gone); reel the supervisor in.
    cancel.cancel();
    let supervisor_result = match supervisor_task.await {
        Ok(result) => result,
        Err(e) => Err(CorvidError::Internal(format!("supervisor task failed: {e}"))),
    };

    info!("corvid serve stopped");
    loop_result.and(supervisor_result)
}

/// Render a pairing challenge as a terminal QR code.
pub fn render_pairing_qr(data: &str) -> Result<String, CorvidError> {
    let code = qrcode::QrCode::new(data.as_bytes()).map_err(|e| {
        CorvidError::Internal(format!("failed to encode pairing challenge: {e}"))
    })?;
    Ok(code
        .render::<qrcode::render::unicode::Dense1x2>()
        .quiet_zone(true)
        .build())
}

/// Initialize the tracing subscriber once, honoring `RUST_LOG` overrides.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairing_qr_renders_nonempty() {
        let qr = render_pairing_qr("corvid-pairing-payload-1234").unwrap();
        assert!(!qr.is_empty());
        assert!(qr.lines().count() > 5);
    }

    #[test]
    fn pairing_qr_rejects_oversized_payload() {
        // QR capacity tops out under 3 KiB of bytes.
        let huge = "x".repeat(8000);
        assert!(render_pairing_qr(&huge).is_err());
    }
}

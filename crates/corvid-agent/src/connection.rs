// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection lifecycle supervision.
//!
//! The [`ConnectionSupervisor`] drives the transport through an explicit
//! state machine: `Disconnected -> Connecting -> (AwaitingScan ->) Open ->
//! Closed`, classifying each close as terminal (logged out, requires
//! re-pairing) or retryable. Retryable closes re-enter the connect loop
//! after a flat backoff delay, bounded by a step counter -- the loop never
//! recurses, so resource usage stays constant across any number of retries.
//!
//! All telemetry (status history ring, attempt counter, message counter,
//! health score) is observability output only; nothing reads it to make
//! control-flow decisions.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use corvid_core::error::CorvidError;
use corvid_core::types::{
    ChatId, ConnectionPhase, Envelope, HealthSnapshot, SendOptions, StatusHistoryEntry,
    TransportEvent,
};
use corvid_core::{HealthSource, Transport};

/// Close code the transport family uses for explicit de-authorization.
const LOGGED_OUT_CODE: u16 = 401;

/// Entries kept in the status history ring.
const HISTORY_CAP: usize = 10;

/// Classified close reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Explicit log-out / de-authorization; requires fresh pairing, never
    /// retried automatically.
    LoggedOut,
    /// Anything else; eligible for automatic reconnect.
    Retryable {
        code: Option<u16>,
        detail: String,
    },
}

impl CloseReason {
    /// Classify a transport close code.
    pub fn classify(code: Option<u16>, detail: Option<&str>) -> Self {
        if code == Some(LOGGED_OUT_CODE) {
            CloseReason::LoggedOut
        } else {
            CloseReason::Retryable {
                code,
                detail: detail.unwrap_or("connection closed").to_string(),
            }
        }
    }

    /// Whether this close requires external re-authentication.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CloseReason::LoggedOut)
    }
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseReason::LoggedOut => write!(f, "logged out"),
            CloseReason::Retryable { code: Some(c), detail } => write!(f, "{detail} (code {c})"),
            CloseReason::Retryable { code: None, detail } => write!(f, "{detail}"),
        }
    }
}

/// Lifecycle state of the supervised connection.
///
/// Exactly one state is current at any time; every transition is a total
/// function of the current state and the transport event that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    /// Waiting for the operator to complete the pairing challenge. A new
    /// challenge replaces the previous one; regeneration is unbounded.
    AwaitingScan { challenge: String },
    Open,
    Closed { reason: CloseReason },
}

impl ConnectionState {
    fn label(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::AwaitingScan { .. } => "awaiting_scan",
            ConnectionState::Open => "open",
            ConnectionState::Closed { .. } => "closed",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Bounded flat-backoff reconnect policy.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    /// Maximum automatic reconnect attempts after retryable closes.
    pub max_attempts: u32,
    /// Flat delay before each reconnect attempt.
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(5),
        }
    }
}

/// Mutable telemetry guarded by one mutex.
struct Telemetry {
    state: ConnectionState,
    connected_since: Option<chrono::DateTime<chrono::Utc>>,
    reconnect_attempts: u32,
    messages_processed: u64,
    history: VecDeque<StatusHistoryEntry>,
    last_transition: tokio::time::Instant,
}

/// How one connected session ended.
enum SessionEnd {
    Cancelled,
    Closed(CloseReason),
}

/// Supervises the transport connection and forwards inbound envelopes to
/// the bot loop over a bounded channel.
pub struct ConnectionSupervisor {
    transport: Arc<dyn Transport>,
    policy: ReconnectPolicy,
    /// Operator chat for ready/log-out notices.
    owner: Option<ChatId>,
    telemetry: Mutex<Telemetry>,
    state_tx: watch::Sender<ConnectionState>,
}

impl ConnectionSupervisor {
    /// Create a supervisor for `transport` with the given reconnect policy.
    pub fn new(
        transport: Arc<dyn Transport>,
        policy: ReconnectPolicy,
        owner: Option<ChatId>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            transport,
            policy,
            owner,
            telemetry: Mutex::new(Telemetry {
                state: ConnectionState::Disconnected,
                connected_since: None,
                reconnect_attempts: 0,
                messages_processed: 0,
                history: VecDeque::with_capacity(HISTORY_CAP),
                last_transition: tokio::time::Instant::now(),
            }),
            state_tx,
        }
    }

    /// Subscribe to lifecycle state changes.
    pub fn state_watch(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Run the supervision loop until cancelled, a terminal close occurs,
    /// or the reconnect budget is exhausted.
    ///
    /// Inbound envelopes received while `Open` are forwarded to
    /// `inbound_tx`; the caller owns the receiving loop.
    pub async fn run(
        &self,
        inbound_tx: mpsc::Sender<Envelope>,
        cancel: CancellationToken,
    ) -> Result<(), CorvidError> {
        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            self.transition(ConnectionState::Connecting, None);
            info!(transport = self.transport.name(), "connecting");

            let end = match self.transport.connect().await {
                Ok(()) => self.pump_events(&inbound_tx, &cancel).await,
                Err(e) => {
                    warn!(error = %e, "connect failed");
                    let reason = CloseReason::Retryable {
                        code: None,
                        detail: e.to_string(),
                    };
                    self.transition(
                        ConnectionState::Closed {
                            reason: reason.clone(),
                        },
                        Some(e.to_string()),
                    );
                    SessionEnd::Closed(reason)
                }
            };

            let reason = match end {
                SessionEnd::Cancelled => return Ok(()),
                SessionEnd::Closed(reason) => reason,
            };

            if reason.is_terminal() {
                warn!("transport logged out; re-authentication required");
                self.transition(
                    ConnectionState::Disconnected,
                    Some("logged out".to_string()),
                );
                self.notify_owner(
                    "Logged out of the transport; scan a fresh pairing challenge to reconnect.",
                )
                .await;
                return Ok(());
            }

            let attempts = self.telemetry.lock().expect("telemetry lock").reconnect_attempts;
            if attempts >= self.policy.max_attempts {
                error!(
                    attempts,
                    "reconnect attempts exhausted, manual restart required"
                );
                self.transition(
                    ConnectionState::Disconnected,
                    Some("reconnect attempts exhausted".to_string()),
                );
                return Err(CorvidError::ReconnectExhausted { attempts });
            }

            let attempt = {
                let mut t = self.telemetry.lock().expect("telemetry lock");
                t.reconnect_attempts += 1;
                t.reconnect_attempts
            };
            info!(
                attempt,
                max = self.policy.max_attempts,
                delay_ms = self.policy.delay.as_millis() as u64,
                reason = %reason,
                "scheduling reconnect"
            );

            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(self.policy.delay) => {}
            }
        }
    }

    /// Consume transport events until the session closes or is cancelled.
    async fn pump_events(
        &self,
        inbound_tx: &mpsc::Sender<Envelope>,
        cancel: &CancellationToken,
    ) -> SessionEnd {
        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => return SessionEnd::Cancelled,
                event = self.transport.next_event() => event,
            };

            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, "transport event stream error");
                    let reason = CloseReason::Retryable {
                        code: None,
                        detail: e.to_string(),
                    };
                    self.transition(
                        ConnectionState::Closed {
                            reason: reason.clone(),
                        },
                        Some(e.to_string()),
                    );
                    return SessionEnd::Closed(reason);
                }
            };

            match event {
                TransportEvent::Connection(update) => match update.phase {
                    ConnectionPhase::Connecting => {
                        self.transition(ConnectionState::Connecting, update.detail);
                    }
                    ConnectionPhase::AwaitingScan => {
                        let challenge = update.pairing_challenge.unwrap_or_default();
                        info!("pairing challenge received, waiting for scan");
                        self.transition(
                            ConnectionState::AwaitingScan { challenge },
                            update.detail,
                        );
                    }
                    ConnectionPhase::Open => {
                        {
                            let mut t = self.telemetry.lock().expect("telemetry lock");
                            t.reconnect_attempts = 0;
                            t.connected_since = Some(chrono::Utc::now());
                        }
                        self.transition(ConnectionState::Open, update.detail);
                        info!(transport = self.transport.name(), "connection open");
                        let notice =
                            format!("Connected to {} and ready.", self.transport.name());
                        self.notify_owner(&notice).await;
                    }
                    ConnectionPhase::Closed => {
                        let reason =
                            CloseReason::classify(update.close_code, update.detail.as_deref());
                        warn!(reason = %reason, "connection closed");
                        self.transition(
                            ConnectionState::Closed {
                                reason: reason.clone(),
                            },
                            update.detail,
                        );
                        return SessionEnd::Closed(reason);
                    }
                },
                TransportEvent::Message(envelope) => {
                    let open = {
                        let mut t = self.telemetry.lock().expect("telemetry lock");
                        if t.state == ConnectionState::Open {
                            t.messages_processed += 1;
                            true
                        } else {
                            false
                        }
                    };
                    if !open {
                        debug!(sender = %envelope.sender, "dropping message received outside open state");
                        continue;
                    }
                    if inbound_tx.send(envelope).await.is_err() {
                        // Receiver side shut down; nothing left to supervise for.
                        return SessionEnd::Cancelled;
                    }
                }
            }
        }
    }

    /// Record a state transition in the telemetry ring and publish it.
    fn transition(&self, next: ConnectionState, detail: Option<String>) {
        {
            let mut t = self.telemetry.lock().expect("telemetry lock");
            let held = t.last_transition.elapsed();
            if t.history.len() == HISTORY_CAP {
                t.history.pop_front();
            }
            t.history.push_back(StatusHistoryEntry {
                state: next.label().to_string(),
                at: chrono::Utc::now(),
                detail,
                held_for: Some(held),
            });
            t.last_transition = tokio::time::Instant::now();
            t.state = next.clone();
        }
        let _ = self.state_tx.send(next);
    }

    /// Send an operator notice if an owner chat is configured.
    async fn notify_owner(&self, text: &str) {
        let Some(owner) = &self.owner else {
            return;
        };
        if let Err(e) = self
            .transport
            .send_text(owner, text, SendOptions::default())
            .await
        {
            warn!(error = %e, "failed to send operator notice");
        }
    }
}

impl HealthSource for ConnectionSupervisor {
    fn snapshot(&self) -> HealthSnapshot {
        let t = self.telemetry.lock().expect("telemetry lock");
        HealthSnapshot {
            state: t.state.label().to_string(),
            connected_since: t.connected_since.filter(|_| t.state == ConnectionState::Open),
            reconnect_attempts: t.reconnect_attempts,
            messages_processed: t.messages_processed,
            score: health_score(&t.state, t.reconnect_attempts, t.connected_since),
            history: t.history.iter().cloned().collect(),
        }
    }
}

/// Best-effort 0-100 health score. Diagnostic output only.
fn health_score(
    state: &ConnectionState,
    reconnect_attempts: u32,
    connected_since: Option<chrono::DateTime<chrono::Utc>>,
) -> u8 {
    let mut score: i32 = 100;
    let open = *state == ConnectionState::Open;

    if !open {
        score -= 40;
    }

    if reconnect_attempts > 2 {
        score -= ((reconnect_attempts as i32) * 5).min(30);
    }

    let uptime_ok = open
        && connected_since
            .map(|since| chrono::Utc::now() - since > chrono::Duration::minutes(5))
            .unwrap_or(false);
    if !uptime_ok {
        score -= if open { 10 } else { 20 };
    }

    score.clamp(0, 100) as u8
}

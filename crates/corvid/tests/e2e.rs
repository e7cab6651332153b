// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests driving the full serve wiring against a mock transport.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use corvid::serve::run_with_cancel;
use corvid_config::CorvidConfig;
use corvid_core::error::CorvidError;
use corvid_core::types::{ConnectionPhase, ConnectionUpdate, TransportEvent};
use corvid_test_utils::{EnvelopeBuilder, MockTransport, SentText};

fn open() -> TransportEvent {
    TransportEvent::Connection(ConnectionUpdate::phase(ConnectionPhase::Open))
}

fn closed(code: u16) -> TransportEvent {
    TransportEvent::Connection(ConnectionUpdate::closed(Some(code), "stream ended"))
}

fn text_msg(sender: &str, body: &str) -> TransportEvent {
    TransportEvent::Message(EnvelopeBuilder::new(sender, "chat-1").body(body).build())
}

/// Poll the captured sends until `pred` holds; panics after ~2 s of
/// (auto-advanced) time.
async fn wait_until<F>(transport: &MockTransport, mut pred: F) -> Vec<SentText>
where
    F: FnMut(&[SentText]) -> bool,
{
    for _ in 0..400 {
        let sent = transport.sent_texts().await;
        if pred(&sent) {
            return sent;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "timed out waiting for sends; got {:?}",
        transport.sent_texts().await
    );
}

#[tokio::test(start_paused = true)]
async fn ping_round_trip() {
    let transport = Arc::new(MockTransport::new());
    transport.push_event(open()).await;
    transport.push_event(text_msg("user-1", ".ping")).await;

    let cancel = CancellationToken::new();
    let runner = {
        let transport = transport.clone();
        let cancel = cancel.clone();
        tokio::spawn(run_with_cancel(CorvidConfig::default(), transport, cancel))
    };

    let sent = wait_until(&transport, |s| s.iter().any(|m| m.text == "pong")).await;
    assert_eq!(sent.iter().filter(|s| s.text == "pong").count(), 1);

    // Default feedback sends the ack and done reactions around execution.
    for _ in 0..400 {
        if transport.reactions().await.len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(transport.reactions().await.len(), 2);

    cancel.cancel();
    runner.await.unwrap().unwrap();
    assert_eq!(transport.connect_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn second_invocation_within_cooldown_is_rejected() {
    let transport = Arc::new(MockTransport::new());
    transport.push_event(open()).await;
    transport.push_event(text_msg("user-1", ".ping")).await;
    transport.push_event(text_msg("user-1", ".ping")).await;

    let cancel = CancellationToken::new();
    let runner = {
        let transport = transport.clone();
        let cancel = cancel.clone();
        tokio::spawn(run_with_cancel(CorvidConfig::default(), transport, cancel))
    };

    let sent = wait_until(&transport, |s| {
        s.iter().any(|m| m.text == "pong") && s.iter().any(|m| m.text.contains("Please wait"))
    })
    .await;

    // Exactly one execution; the other invocation hit the cooldown gate.
    assert_eq!(sent.iter().filter(|s| s.text == "pong").count(), 1);
    assert_eq!(
        sent.iter().filter(|s| s.text.contains("Please wait")).count(),
        1
    );

    cancel.cancel();
    runner.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn unknown_dotted_text_is_silently_ignored() {
    let transport = Arc::new(MockTransport::new());
    transport.push_event(open()).await;
    transport.push_event(text_msg("user-1", ".frobnicate now")).await;

    let cancel = CancellationToken::new();
    let runner = {
        let transport = transport.clone();
        let cancel = cancel.clone();
        tokio::spawn(run_with_cancel(CorvidConfig::default(), transport, cancel))
    };

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(transport.sent_count().await, 0);
    assert!(transport.reactions().await.is_empty());

    cancel.cancel();
    runner.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn flood_of_plain_text_is_flagged_with_escalating_warnings() {
    let transport = Arc::new(MockTransport::new());
    transport.push_event(open()).await;
    // Sender A sends 12 plain messages in rapid succession; none carry the
    // command prefix. The 11th and 12th cross the flood threshold.
    for i in 0..12 {
        transport
            .push_event(text_msg("sender-a", &format!("hello again {i}")))
            .await;
    }

    let cancel = CancellationToken::new();
    let runner = {
        let transport = transport.clone();
        let cancel = cancel.clone();
        tokio::spawn(run_with_cancel(CorvidConfig::default(), transport, cancel))
    };

    let sent = wait_until(&transport, |s| {
        s.iter().any(|m| m.text.contains("Warning 2/3"))
    })
    .await;

    let flagged: Vec<_> = sent
        .iter()
        .filter(|s| s.text.contains("flagged as spam"))
        .collect();
    assert_eq!(flagged.len(), 2);
    assert!(flagged[0].text.contains("flood"));
    assert!(flagged[0].text.contains("Warning 1/3"));
    assert!(flagged[1].text.contains("Warning 2/3"));

    cancel.cancel();
    runner.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn six_retryable_closes_exhaust_the_reconnect_budget() {
    let transport = Arc::new(MockTransport::new());
    for _ in 0..6 {
        transport.push_event(open()).await;
        transport.push_event(closed(500)).await;
    }

    let result = run_with_cancel(
        CorvidConfig::default(),
        transport.clone(),
        CancellationToken::new(),
    )
    .await;

    match result {
        Err(CorvidError::ReconnectExhausted { attempts }) => assert_eq!(attempts, 5),
        other => panic!("expected ReconnectExhausted, got {other:?}"),
    }
    // Initial connect plus five retries, and no seventh attempt.
    assert_eq!(transport.connect_count(), 6);
}

#[tokio::test(start_paused = true)]
async fn logout_close_stops_cleanly_without_retry() {
    let transport = Arc::new(MockTransport::new());
    transport.push_event(open()).await;
    transport.push_event(closed(401)).await;

    let result = run_with_cancel(
        CorvidConfig::default(),
        transport.clone(),
        CancellationToken::new(),
    )
    .await;

    assert!(result.is_ok());
    assert_eq!(transport.connect_count(), 1);
}

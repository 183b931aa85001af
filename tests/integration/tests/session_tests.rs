//! Session Integration Tests
//!
//! Two real sessions talk through an in-process relay over WebSocket.
//!
//! Run with: cargo test -p integration-tests --test session_tests

use std::time::Duration;

use ghost_api::{ApiClient, AuthRequest};
use ghost_core::PresenceStatus;
use ghost_realtime::{ConnectionState, SessionEvent};
use integration_tests::{api_config, handle, TestClient, TestRelay};
use serde_json::json;

const ALICE: &str = "1000001";
const BOB: &str = "1000002";

// ============================================================================
// Connection Tests
// ============================================================================

#[tokio::test]
async fn test_session_connects_to_identity_endpoint() {
    let relay = TestRelay::start().await.unwrap();
    let alice = TestClient::connect(&relay, ALICE).await.unwrap();

    assert_eq!(relay.online(), vec![ALICE.to_string()]);
    assert_eq!(alice.session.view().connection, ConnectionState::Connected);
}

#[tokio::test]
async fn test_reconnects_after_relay_closes() {
    let relay = TestRelay::start().await.unwrap();
    let mut alice = TestClient::connect(&relay, ALICE).await.unwrap();

    assert!(relay.kick(ALICE));
    alice
        .expect(|e| *e == SessionEvent::Disconnected)
        .await
        .unwrap();
    alice.expect(|e| *e == SessionEvent::Connected).await.unwrap();

    assert_eq!(relay.online(), vec![ALICE.to_string()]);
}

#[tokio::test]
async fn test_shutdown_leaves_relay() {
    let relay = TestRelay::start().await.unwrap();
    let mut alice = TestClient::connect(&relay, ALICE).await.unwrap();
    let bob = TestClient::connect(&relay, BOB).await.unwrap();

    bob.session.shutdown().await.unwrap();

    let event = alice
        .expect(|e| matches!(e, SessionEvent::PresenceChanged { status: PresenceStatus::Offline, .. }))
        .await
        .unwrap();
    assert_eq!(
        event,
        SessionEvent::PresenceChanged {
            handle: handle(BOB),
            status: PresenceStatus::Offline
        }
    );

    // No reconnect after shutdown
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(relay.online(), vec![ALICE.to_string()]);
}

// ============================================================================
// Presence Tests
// ============================================================================

#[tokio::test]
async fn test_snapshot_and_deltas() {
    let relay = TestRelay::start().await.unwrap();
    let mut alice = TestClient::connect(&relay, ALICE).await.unwrap();

    // Bob's snapshot already contains Alice
    let bob = TestClient::connect(&relay, BOB).await.unwrap();
    assert!(bob.session.view().is_online(&handle(ALICE)));

    // Alice hears about Bob through a delta
    alice
        .expect(|e| matches!(e, SessionEvent::PresenceChanged { status: PresenceStatus::Online, .. }))
        .await
        .unwrap();
    assert_eq!(alice.session.view().online, vec![handle(BOB)]);
}

// ============================================================================
// Message Tests
// ============================================================================

#[tokio::test]
async fn test_message_round_trip() {
    let relay = TestRelay::start().await.unwrap();
    let alice = TestClient::connect(&relay, ALICE).await.unwrap();
    let mut bob = TestClient::connect(&relay, BOB).await.unwrap();

    bob.session.open_chat(handle(ALICE)).await.unwrap();
    alice.session.open_chat(handle(BOB)).await.unwrap();

    let sent = alice.session.send_message(" hi bob ").await.unwrap().unwrap();
    assert_eq!(sent.text, "hi bob");

    let event = bob
        .expect(|e| matches!(e, SessionEvent::MessageReceived { .. }))
        .await
        .unwrap();
    let SessionEvent::MessageReceived { message } = event else {
        unreachable!()
    };
    assert_eq!(message.text, "hi bob");
    assert_eq!(message.sender, handle(ALICE));
    assert!(!message.is_mine);

    let conversation = bob.session.view().conversation.unwrap();
    assert_eq!(conversation.len(), 1);
    assert_eq!(alice.session.view().conversation.unwrap().len(), 1);
}

#[tokio::test]
async fn test_message_to_closed_chat_is_notification() {
    let relay = TestRelay::start().await.unwrap();
    let alice = TestClient::connect(&relay, ALICE).await.unwrap();
    let mut bob = TestClient::connect(&relay, BOB).await.unwrap();

    alice.session.open_chat(handle(BOB)).await.unwrap();
    alice.session.send_message("knock knock").await.unwrap();

    let event = bob
        .expect(|e| matches!(e, SessionEvent::Notification { .. }))
        .await
        .unwrap();
    assert!(matches!(event, SessionEvent::Notification { message } if message.text == "knock knock"));
    assert!(bob.session.view().conversation.is_none());
}

#[tokio::test]
async fn test_empty_message_never_reaches_relay() {
    let relay = TestRelay::start().await.unwrap();
    let alice = TestClient::connect(&relay, ALICE).await.unwrap();

    alice.session.open_chat(handle(BOB)).await.unwrap();
    let err = alice.session.send_message("   ").await.unwrap_err();
    assert_eq!(err.error_code(), "EMPTY_MESSAGE");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(relay.received_from(ALICE, "message").is_empty());
}

// ============================================================================
// Typing Tests
// ============================================================================

#[tokio::test]
async fn test_typing_reaches_peer_and_stops_on_send() {
    let relay = TestRelay::start().await.unwrap();
    let alice = TestClient::connect(&relay, ALICE).await.unwrap();
    let mut bob = TestClient::connect(&relay, BOB).await.unwrap();

    alice.session.open_chat(handle(BOB)).await.unwrap();
    alice.session.input_changed().await.unwrap();
    alice.session.input_changed().await.unwrap();

    bob.expect(|e| matches!(e, SessionEvent::TypingChanged { is_typing: true, .. }))
        .await
        .unwrap();
    assert!(bob.session.view().is_typing(&handle(ALICE)));

    alice.session.send_message("done").await.unwrap();
    bob.expect(|e| matches!(e, SessionEvent::TypingChanged { is_typing: false, .. }))
        .await
        .unwrap();

    // Two inputs inside the throttle window produce one typing:true
    let typing = relay.received_from(ALICE, "typing");
    assert_eq!(
        typing,
        vec![
            json!({"type": "typing", "recipient_id": BOB, "is_typing": true}),
            json!({"type": "typing", "recipient_id": BOB, "is_typing": false}),
        ]
    );
}

// ============================================================================
// Robustness Tests
// ============================================================================

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    let relay = TestRelay::start().await.unwrap();
    let mut alice = TestClient::connect(&relay, ALICE).await.unwrap();

    relay.push(ALICE, &json!({"type": "status", "user_id": "not-a-handle", "status": "online"}));
    relay.push(ALICE, &json!({"type": "reaction", "emoji": "ghost"}));
    relay.push(ALICE, &json!({"type": "status", "user_id": BOB, "status": "online"}));

    let event = alice
        .expect(|e| matches!(e, SessionEvent::PresenceChanged { .. }))
        .await
        .unwrap();
    assert_eq!(
        event,
        SessionEvent::PresenceChanged {
            handle: handle(BOB),
            status: PresenceStatus::Online
        }
    );
}

// ============================================================================
// REST Collaborator Tests
// ============================================================================

#[tokio::test]
async fn test_authenticate_returns_handle() {
    let relay = TestRelay::start().await.unwrap();
    let api = ApiClient::new(&api_config(&relay)).unwrap();

    let profile = api.authenticate(&AuthRequest::by_id("42")).await.unwrap();
    assert_eq!(profile.telegram_id, "42");
    assert_eq!(profile.anonymous_id.as_str().len(), 7);

    // Same external id, same handle
    let again = api.authenticate(&AuthRequest::by_id("42")).await.unwrap();
    assert_eq!(again.anonymous_id, profile.anonymous_id);
}

#[tokio::test]
async fn test_authenticate_without_id_is_rejected() {
    let relay = TestRelay::start().await.unwrap();
    let api = ApiClient::new(&api_config(&relay)).unwrap();

    let err = api
        .authenticate(&AuthRequest::by_init_data("query_id=1"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("telegram_id or init_data is required"));
}

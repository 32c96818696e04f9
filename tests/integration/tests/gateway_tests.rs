//! Gateway end-to-end tests
//!
//! Each test runs its own gateway over the in-memory store, so nothing
//! external is required.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::time::Duration;

use buddylink_common::SessionPolicy;
use buddylink_core::entities::Attachment;
use buddylink_core::Snowflake;
use buddylink_gateway::events::{BuddyStatusEvent, ImEvent, ImHistoryEvent, WebRtcOfferEvent};
use integration_tests::{Closed, TestGateway, ALICE, BOB, CAROL, DAVE};
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;

const QUIET: Duration = Duration::from_millis(200);

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");

    let response = reqwest::get(format!("{}/health", gateway.base_url()))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_unknown_identity_is_refused() {
    let gateway = TestGateway::start().await.unwrap();

    assert_eq!(gateway.connect_rejected("999999").await.unwrap(), 401);
    assert_eq!(gateway.connect_rejected("not-a-number").await.unwrap(), 401);
    assert_eq!(gateway.state.registry().connection_count(), 0);
}

// ============================================================================
// Presence
// ============================================================================

#[tokio::test]
async fn test_buddies_see_each_other_come_and_go() {
    let gateway = TestGateway::start().await.unwrap();
    let mut alice = gateway.connect(ALICE).await.unwrap();
    let bob = gateway.connect(BOB).await.unwrap();

    let online: BuddyStatusEvent = alice.expect_event("buddy:status").await.unwrap().payload().unwrap();
    assert_eq!(online.user_id, BOB);
    assert_eq!(online.username, "bob");
    assert_eq!(online.status.as_str(), "online");

    bob.close().await.unwrap();
    gateway.wait_offline(BOB).await.unwrap();

    let offline: BuddyStatusEvent = alice.expect_event("buddy:status").await.unwrap().payload().unwrap();
    assert_eq!(offline.user_id, BOB);
    assert_eq!(offline.status.as_str(), "offline");
    assert_eq!(gateway.store.user(BOB).unwrap().status.as_str(), "offline");
}

#[tokio::test]
async fn test_one_way_buddy_gets_no_presence() {
    let gateway = TestGateway::start().await.unwrap();
    let mut carol = gateway.connect(CAROL).await.unwrap();
    let _alice = gateway.connect(ALICE).await.unwrap();

    carol.expect_silence(QUIET).await.unwrap();
}

#[tokio::test]
async fn test_status_update_reaches_buddies() {
    let gateway = TestGateway::start().await.unwrap();
    let mut alice = gateway.connect(ALICE).await.unwrap();
    let mut bob = gateway.connect(BOB).await.unwrap();
    alice.expect_event("buddy:status").await.unwrap();

    bob.send_event("status:update", json!({"status": "busy"})).await.unwrap();

    let event: BuddyStatusEvent = alice.expect_event("buddy:status").await.unwrap().payload().unwrap();
    assert_eq!(event.status.as_str(), "busy");
}

// ============================================================================
// Instant messages
// ============================================================================

#[tokio::test]
async fn test_message_between_online_buddies() {
    let gateway = TestGateway::start().await.unwrap();
    let mut alice = gateway.connect(ALICE).await.unwrap();
    let mut bob = gateway.connect(BOB).await.unwrap();

    alice
        .send_event("im:send", json!({"to": "bob", "message": "hello"}))
        .await
        .unwrap();

    let sent: ImEvent = alice.expect_event("im:sent").await.unwrap().payload().unwrap();
    let received: ImEvent = bob.expect_event("im:new").await.unwrap().payload().unwrap();
    assert_eq!(sent, received);
    assert_eq!(received.from, ALICE);
    assert_eq!(received.message, "hello");
}

#[tokio::test]
async fn test_message_to_non_buddy_is_refused() {
    let gateway = TestGateway::start().await.unwrap();
    let mut alice = gateway.connect(ALICE).await.unwrap();
    let mut carol = gateway.connect(CAROL).await.unwrap();

    alice
        .send_event("im:send", json!({"to": "carol", "message": "hi"}))
        .await
        .unwrap();

    let error = alice.expect_event("im:error").await.unwrap();
    assert_eq!(error.data["error"], "You can only message mutual buddies");
    carol.expect_silence(QUIET).await.unwrap();
    assert_eq!(gateway.store.message_count(), 0);
}

#[tokio::test]
async fn test_message_to_blocker_is_refused() {
    let gateway = TestGateway::start().await.unwrap();
    let mut alice = gateway.connect(ALICE).await.unwrap();

    alice
        .send_event("im:send", json!({"to": "dave", "message": "hi"}))
        .await
        .unwrap();

    let error = alice.expect_event("im:error").await.unwrap();
    assert_eq!(error.data["error"], "Messaging is blocked between these users");
    assert_eq!(gateway.store.message_count(), 0);
    assert!(gateway.store.user(DAVE).is_some());
}

#[tokio::test]
async fn test_message_to_self_is_refused() {
    let gateway = TestGateway::start().await.unwrap();
    let mut alice = gateway.connect(ALICE).await.unwrap();

    alice
        .send_event("im:send", json!({"to": "alice", "message": "note to self"}))
        .await
        .unwrap();

    let error = alice.expect_event("im:error").await.unwrap();
    assert_eq!(error.data["error"], "Cannot send a message to yourself");
    assert_eq!(gateway.store.message_count(), 0);
}

#[tokio::test]
async fn test_message_with_foreign_attachment_is_refused() {
    let gateway = TestGateway::start().await.unwrap();
    gateway.store.add_attachment(Attachment::new(
        Snowflake::new(5001),
        BOB,
        "bob.png",
        "image/png",
        2048,
    ));
    let mut alice = gateway.connect(ALICE).await.unwrap();
    let mut bob = gateway.connect(BOB).await.unwrap();

    alice
        .send_event(
            "im:send",
            json!({"to": "bob", "message": "look", "attachmentIds": ["5001"]}),
        )
        .await
        .unwrap();

    let error = alice.expect_event("im:error").await.unwrap();
    assert_eq!(error.data["error"], "Invalid attachment");
    assert_eq!(gateway.store.message_count(), 0);
    bob.expect_silence(QUIET).await.unwrap();
}

#[tokio::test]
async fn test_offline_recipient_reads_history() {
    let gateway = TestGateway::start().await.unwrap();
    let mut alice = gateway.connect(ALICE).await.unwrap();

    alice
        .send_event("im:send", json!({"to": "bob", "message": "while you were out"}))
        .await
        .unwrap();
    let sent: ImEvent = alice.expect_event("im:sent").await.unwrap().payload().unwrap();

    let mut bob = gateway.connect(BOB).await.unwrap();
    bob.send_event("im:history", json!({"with": "alice"})).await.unwrap();

    let history: ImHistoryEvent = bob.expect_event("im:history").await.unwrap().payload().unwrap();
    assert_eq!(history.messages, vec![sent]);
}

// ============================================================================
// Signaling
// ============================================================================

#[tokio::test]
async fn test_offer_answer_and_candidates_are_relayed() {
    let gateway = TestGateway::start().await.unwrap();
    let mut alice = gateway.connect(ALICE).await.unwrap();
    let mut bob = gateway.connect(BOB).await.unwrap();

    alice
        .send_event(
            "webrtc:offer",
            json!({
                "to": "bob",
                "offer": {"type": "offer", "sdp": "v=0 alice"},
                "fileName": "report.pdf",
                "fileSize": 1_048_576,
                "mimeType": "application/pdf"
            }),
        )
        .await
        .unwrap();

    let offer: WebRtcOfferEvent = bob.expect_event("webrtc:offer").await.unwrap().payload().unwrap();
    assert_eq!(offer.from, ALICE);
    assert_eq!(offer.from_username, "alice");
    assert_eq!(offer.file_name, "report.pdf");
    assert_eq!(offer.offer["sdp"], "v=0 alice");

    bob.send_event(
        "webrtc:answer",
        json!({"to": offer.from_socket_id, "answer": {"type": "answer", "sdp": "v=0 bob"}}),
    )
    .await
    .unwrap();
    let answer = alice.expect_event("webrtc:answer").await.unwrap();
    assert_eq!(answer.data["answer"]["sdp"], "v=0 bob");

    let bob_socket = answer.data["from"].as_str().unwrap().to_string();
    alice
        .send_event("webrtc:ice-candidate", json!({"to": bob_socket, "candidate": {"candidate": "c1"}}))
        .await
        .unwrap();
    let candidate = bob.expect_event("webrtc:ice-candidate").await.unwrap();
    assert_eq!(candidate.data["candidate"]["candidate"], "c1");
    assert_eq!(candidate.data["from"], offer.from_socket_id);
}

#[tokio::test]
async fn test_offer_to_offline_peer_fails() {
    let gateway = TestGateway::start().await.unwrap();
    let mut alice = gateway.connect(ALICE).await.unwrap();

    alice
        .send_event(
            "webrtc:offer",
            json!({"to": "bob", "offer": {}, "fileName": "a.txt", "fileSize": 1}),
        )
        .await
        .unwrap();

    let error = alice.expect_event("webrtc:error").await.unwrap();
    assert_eq!(error.data["error"], "Peer is offline");
}

// ============================================================================
// Sessions and protocol errors
// ============================================================================

#[tokio::test]
async fn test_second_login_replaces_first() {
    let gateway = TestGateway::start().await.unwrap();
    let mut alice = gateway.connect(ALICE).await.unwrap();
    let mut first = gateway.connect(BOB).await.unwrap();
    alice.expect_event("buddy:status").await.unwrap();

    let _second = gateway.connect(BOB).await.unwrap();

    first.expect_event("session:replaced").await.unwrap();
    assert_eq!(first.expect_close().await.unwrap(), Closed::Code(4005));
    assert!(gateway.state.registry().is_online(BOB));

    // The repeated online announcement is the only presence traffic.
    let event: BuddyStatusEvent = alice.expect_event("buddy:status").await.unwrap().payload().unwrap();
    assert_eq!(event.status.as_str(), "online");
    alice.expect_silence(QUIET).await.unwrap();
}

#[tokio::test]
async fn test_second_login_rejected_under_reject_policy() {
    let gateway = TestGateway::start_with_policy(SessionPolicy::Reject).await.unwrap();
    let _first = gateway.connect(BOB).await.unwrap();

    assert_eq!(gateway.connect_rejected(&BOB.to_string()).await.unwrap(), 409);
    assert_eq!(gateway.state.registry().connection_count(), 1);
}

#[tokio::test]
async fn test_silent_client_is_dropped_after_idle_timeout() {
    let gateway = TestGateway::start_with(&[
        ("HEARTBEAT_INTERVAL_SECS", "1"),
        ("IDLE_TIMEOUT_SECS", "2"),
    ])
    .await
    .unwrap();
    // Reading keeps alice answering pings
    let mut alice = gateway.connect(ALICE).await.unwrap();
    // bob never reads, so never answers a ping
    let _bob = gateway.connect(BOB).await.unwrap();

    let online: BuddyStatusEvent = alice.expect_event("buddy:status").await.unwrap().payload().unwrap();
    assert_eq!((online.user_id, online.status.as_str()), (BOB, "online"));

    let offline: BuddyStatusEvent = alice.expect_event("buddy:status").await.unwrap().payload().unwrap();
    assert_eq!((offline.user_id, offline.status.as_str()), (BOB, "offline"));

    gateway.wait_offline(BOB).await.unwrap();
    assert_eq!(gateway.store.user(BOB).unwrap().status.as_str(), "offline");
    assert!(gateway.state.registry().is_online(ALICE));
}

#[tokio::test]
async fn test_unknown_event_closes_socket() {
    let gateway = TestGateway::start().await.unwrap();
    let mut alice = gateway.connect(ALICE).await.unwrap();

    alice.send_event("room:create", json!({})).await.unwrap();
    assert_eq!(alice.expect_close().await.unwrap(), Closed::Code(4001));
    gateway.wait_offline(ALICE).await.unwrap();
}

#[tokio::test]
async fn test_binary_frame_closes_socket() {
    let gateway = TestGateway::start().await.unwrap();
    let mut alice = gateway.connect(ALICE).await.unwrap();

    alice.send_raw(Message::Binary(vec![1, 2, 3])).await.unwrap();
    assert_eq!(alice.expect_close().await.unwrap(), Closed::Code(4002));
}

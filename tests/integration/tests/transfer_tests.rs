//! File transfer over gateway signaling
//!
//! The offer and answer travel through a real gateway; the data channel
//! itself is the in-process memory channel.
//!
//! Run with: cargo test -p integration-tests --test transfer_tests

use std::time::Duration;

use buddylink_gateway::events::{WebRtcAnswerEvent, WebRtcOfferEvent};
use buddylink_transfer::{
    await_answer, memory_channel, FileMetadata, FileReceiver, FileSender, TransferConfig,
    TransferError, TransferSession, TransferState,
};
use integration_tests::{TestGateway, ALICE, BOB};
use serde_json::json;
use tokio::sync::oneshot;

#[tokio::test]
async fn test_file_moves_between_peers_after_signaling() {
    let gateway = TestGateway::start().await.unwrap();
    let mut alice = gateway.connect(ALICE).await.unwrap();
    let mut bob = gateway.connect(BOB).await.unwrap();

    let config = TransferConfig::new()
        .with_chunk_size(1024)
        .with_pacing(Duration::ZERO)
        .with_answer_timeout(Duration::from_secs(5));
    let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    let metadata = FileMetadata::new("notes.bin", data.len() as u64, "application/octet-stream");

    // alice offers
    let mut sending = TransferSession::new(config.chunk_size, data.len() as u64);
    sending.transition(TransferState::Offering).unwrap();
    let (answer_tx, answer_rx) = oneshot::channel::<WebRtcAnswerEvent>();
    let waiting = tokio::spawn(await_answer(answer_rx, config.answer_timeout));

    alice
        .send_event(
            "webrtc:offer",
            json!({
                "to": "bob",
                "offer": {"type": "offer", "sdp": "v=0 alice"},
                "fileName": metadata.file_name,
                "fileSize": metadata.file_size,
                "mimeType": metadata.mime_type
            }),
        )
        .await
        .unwrap();

    // bob accepts
    let offer: WebRtcOfferEvent = bob.expect_event("webrtc:offer").await.unwrap().payload().unwrap();
    assert_eq!(offer.from, ALICE);
    assert_eq!(offer.file_size, data.len() as u64);
    let mut receiver = FileReceiver::new(&config);
    assert_eq!(receiver.session().state(), TransferState::Connecting);

    bob.send_event(
        "webrtc:answer",
        json!({"to": offer.from_socket_id, "answer": {"type": "answer", "sdp": "v=0 bob"}}),
    )
    .await
    .unwrap();

    let answer: WebRtcAnswerEvent = alice.expect_event("webrtc:answer").await.unwrap().payload().unwrap();
    answer_tx.send(answer).unwrap();
    let answer = waiting.await.unwrap().unwrap();
    assert_eq!(answer.answer["sdp"], "v=0 bob");
    sending.transition(TransferState::Connecting).unwrap();

    // Data channel is open
    let (channel, mut frames) = memory_channel(4);
    let receiving = tokio::spawn(async move {
        let mut percentages = Vec::new();
        let file = receiver.run(&mut frames, |p| percentages.push(p.percentage)).await;
        (receiver, file, percentages)
    });

    let chunks = FileSender::new(&channel, &config)
        .send(&mut sending, &metadata, &data, |_| {})
        .await
        .unwrap();
    let (receiver, file, percentages) = receiving.await.unwrap();
    let file = file.unwrap();

    assert_eq!(chunks, 10);
    assert_eq!(sending.state(), TransferState::Completed);
    assert_eq!(receiver.session().state(), TransferState::Completed);
    assert_eq!(file.metadata.file_name, offer.file_name);
    assert_eq!(&file.data[..], &data[..]);
    assert_eq!(percentages.last().copied(), Some(100.0));
}

#[tokio::test]
async fn test_unanswered_offer_times_out() {
    let gateway = TestGateway::start().await.unwrap();
    let mut alice = gateway.connect(ALICE).await.unwrap();
    let mut bob = gateway.connect(BOB).await.unwrap();

    let config = TransferConfig::new().with_answer_timeout(Duration::from_millis(200));
    let mut sending = TransferSession::new(config.chunk_size, 4);
    sending.transition(TransferState::Offering).unwrap();
    let (_answer_tx, answer_rx) = oneshot::channel::<WebRtcAnswerEvent>();

    alice
        .send_event(
            "webrtc:offer",
            json!({"to": "bob", "offer": {}, "fileName": "a.txt", "fileSize": 4}),
        )
        .await
        .unwrap();
    bob.expect_event("webrtc:offer").await.unwrap();

    // bob never answers
    let err = await_answer(answer_rx, config.answer_timeout).await.unwrap_err();
    assert!(matches!(err, TransferError::SignalingTimeout(_)));
    sending.fail();
    assert_eq!(sending.state(), TransferState::Error);
}

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Stream worker tests over in-memory duplex connections.

use comms_protocol::core::packet::Packet;
use comms_protocol::error::CommsError;
use comms_protocol::protocol::message::Message;
use comms_protocol::transport::conn::Connection;
use comms_protocol::transport::worker::Worker;
use comms_protocol::MAX_MESSAGE_SIZE;

fn worker_pair() -> (
    Worker<tokio::io::DuplexStream>,
    Worker<tokio::io::DuplexStream>,
) {
    let (a, b) = tokio::io::duplex(256 * 1024);
    (
        Worker::new(Connection::new(a, "peer-a")),
        Worker::new(Connection::new(b, "peer-b")),
    )
}

#[tokio::test]
async fn test_message_write_read() {
    let (mut a, mut b) = worker_pair();

    a.write_message(&Message::new("SYNC", vec![1, 2, 3]))
        .await
        .unwrap();

    let payload = b.read(MAX_MESSAGE_SIZE).await.unwrap();
    let msg = Message::from_bytes(&payload).unwrap();
    assert_eq!(msg.tag, "SYNC");
    assert_eq!(msg.extra, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_bytes_write_read() {
    let (mut a, mut b) = worker_pair();

    a.write_bytes(&[0xDE, 0xAD, 0xBE, 0xEF]).await.unwrap();
    let payload = b.read(MAX_MESSAGE_SIZE).await.unwrap();
    assert_eq!(payload, vec![0xDE, 0xAD, 0xBE, 0xEF]);
}

#[tokio::test]
async fn test_packet_write_read() {
    let (mut a, mut b) = worker_pair();

    a.write_packet(&Packet::new(vec![9u8; 20_000])).await.unwrap();
    let payload = b.read(MAX_MESSAGE_SIZE).await.unwrap();
    assert_eq!(payload.len(), 20_000);
}

#[tokio::test]
async fn test_read_enforces_caller_ceiling() {
    let (mut a, mut b) = worker_pair();

    a.write_bytes(&[0u8; 100]).await.unwrap();
    let result = b.read(50).await;
    assert!(matches!(result, Err(CommsError::OversizedFrame(100))));
}

#[tokio::test]
async fn test_read_after_peer_drop_is_framing_error() {
    let (a, mut b) = worker_pair();
    drop(a);

    let result = b.read(MAX_MESSAGE_SIZE).await;
    assert!(result.unwrap_err().is_framing());
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let (mut a, _b) = worker_pair();

    a.close().await;
    a.close().await;

    let result = a.write_bytes(b"late").await;
    assert!(matches!(result, Err(CommsError::ConnectionClosed)));
    assert!(matches!(
        a.read(MAX_MESSAGE_SIZE).await,
        Err(CommsError::ConnectionClosed)
    ));
}

#[tokio::test]
async fn test_peer_label_is_kept() {
    let (a, _b) = worker_pair();
    assert_eq!(a.peer_label(), "peer-a");
}

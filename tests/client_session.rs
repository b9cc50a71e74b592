#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Client session lifecycle tests: greeting, request/response, progress
//! reporting, death monotonicity, and teardown.

use comms_protocol::protocol::keywords;
use comms_protocol::protocol::message::{wrap, Message};
use comms_protocol::service::client::{ClientSession, SessionState};
use comms_protocol::transport::conn::Connection;
use comms_protocol::transport::worker::Worker;
use comms_protocol::{CommsError, Packet, MAX_MESSAGE_SIZE};

/// An initialized session plus the server-side worker, greeting consumed
async fn session_pair() -> (
    ClientSession<tokio::io::DuplexStream>,
    Worker<tokio::io::DuplexStream>,
) {
    let (client_end, server_end) = tokio::io::duplex(256 * 1024);
    let session = ClientSession::initialize(Connection::new(client_end, "server")).await;
    let mut server = Worker::new(Connection::new(server_end, "client"));

    let greeting = server.read(MAX_MESSAGE_SIZE).await.unwrap();
    let msg = Message::from_bytes(&greeting).unwrap();
    assert_eq!(msg.tag, keywords::HELLO);

    (session, server)
}

#[tokio::test]
async fn test_initialize_sends_greeting_and_goes_alive() {
    let (session, _server) = session_pair().await;
    assert!(session.alive());
    assert_eq!(session.state(), SessionState::Alive);
}

#[tokio::test]
async fn test_initialize_against_dead_transport_yields_dead_session() {
    let (client_end, server_end) = tokio::io::duplex(1024);
    drop(server_end);

    let session = ClientSession::initialize(Connection::new(client_end, "server")).await;
    assert!(!session.alive());
    assert_eq!(session.state(), SessionState::Dead);
}

#[tokio::test]
async fn test_ping_pong_scenario() {
    let (mut session, mut server) = session_pair().await;

    session.send_request("PING", None).await.unwrap();

    let request = server.read(MAX_MESSAGE_SIZE).await.unwrap();
    let msg = Message::from_bytes(&request).unwrap();
    assert_eq!(msg.tag, "PING");
    assert!(msg.extra.is_empty());

    server.write_packet(&Packet::new(wrap("PONG"))).await.unwrap();

    let reply = session.read_from_server().await.unwrap();
    assert_eq!(reply, wrap("PONG"));
}

#[tokio::test]
async fn test_send_request_carries_extra_data() {
    let (mut session, mut server) = session_pair().await;

    session
        .send_request("STORE", Some(&[1, 2, 3, 4]))
        .await
        .unwrap();

    let request = server.read(MAX_MESSAGE_SIZE).await.unwrap();
    let msg = Message::from_bytes(&request).unwrap();
    assert_eq!(msg.tag, "STORE");
    assert_eq!(msg.extra, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_read_progress_reaches_completion() {
    let (mut session, mut server) = session_pair().await;

    let body = vec![0x42u8; 150_000];
    let server_task = tokio::spawn(async move {
        server.write_packet(&Packet::new(body)).await.unwrap();
        server
    });

    let mut seen: Vec<u8> = Vec::new();
    let payload = session
        .read_from_server_with_progress(|p| seen.push(p))
        .await
        .unwrap();

    assert_eq!(payload.len(), 150_000);
    assert_eq!(*seen.last().unwrap(), 100);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));

    server_task.await.unwrap();
}

#[tokio::test]
async fn test_death_is_monotonic() {
    let (mut session, server) = session_pair().await;
    drop(server);

    // First send hits the broken transport.
    let first = session.send_request("PING", None).await;
    assert!(first.is_err());
    assert!(!session.alive());

    // Every later send short-circuits without touching the transport.
    for _ in 0..3 {
        assert!(matches!(
            session.send_request("PING", None).await,
            Err(CommsError::NotAlive)
        ));
        assert!(matches!(
            session.send_message(&Message::bare("PING")).await,
            Err(CommsError::NotAlive)
        ));
        assert!(matches!(
            session.read_from_server().await,
            Err(CommsError::NotAlive)
        ));
    }
    assert_eq!(session.state(), SessionState::Dead);
}

#[tokio::test]
async fn test_read_fault_kills_session() {
    let (mut session, mut server) = session_pair().await;

    // One empty frame, then the server goes away.
    server.write_packet(&Packet::new(Vec::new())).await.unwrap();
    drop(server);

    // The empty frame arrives intact; the next read sees end-of-stream.
    session.read_from_server().await.unwrap();
    assert!(session.read_from_server().await.is_err());
    assert!(!session.alive());
}

#[tokio::test]
async fn test_close_sends_end_of_session() {
    let (mut session, mut server) = session_pair().await;

    session.close().await;

    let farewell = server.read(MAX_MESSAGE_SIZE).await.unwrap();
    let msg = Message::from_bytes(&farewell).unwrap();
    assert_eq!(msg.tag, keywords::END_OF_SESSION);

    assert!(!session.alive());
    assert!(matches!(
        session.send_request("PING", None).await,
        Err(CommsError::NotAlive)
    ));
}

#[tokio::test]
async fn test_close_on_dead_session_is_quiet() {
    let (client_end, server_end) = tokio::io::duplex(1024);
    drop(server_end);

    let mut session = ClientSession::initialize(Connection::new(client_end, "server")).await;
    session.close().await;
    session.close().await;
    assert_eq!(session.state(), SessionState::Dead);
}

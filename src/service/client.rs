//! # Client Session
//!
//! A stateful, asynchronous wrapper around one outbound connection.
//!
//! The session tracks a single liveness flag through the lifecycle
//! `Uninitialized → Initializing → Alive → Dead`. Death is terminal: any
//! send or receive failure kills the session, every later send
//! short-circuits with [`CommsError::NotAlive`] without touching the
//! transport, and callers must create a new session to reconnect.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, instrument, warn};

use crate::config::MAX_MESSAGE_SIZE;
use crate::error::{CommsError, Result};
use crate::protocol::keywords;
use crate::protocol::message::Message;
use crate::transport::conn::Connection;
use crate::transport::tls::{self, ClientStream, TlsClientConfig};
use crate::transport::worker::Worker;

/// Session lifecycle. The only terminal state is `Dead`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No transport has been attempted yet
    Uninitialized,
    /// Transport exists, greeting not yet acknowledged by a successful write
    Initializing,
    /// Greeting sent; requests may flow
    Alive,
    /// Transport creation failed or an I/O fault occurred. Permanent.
    Dead,
}

/// Client side of one logical session
pub struct ClientSession<S> {
    worker: Option<Worker<S>>,
    state: SessionState,
}

/// Session over the standard TLS transport
pub type TlsClientSession = ClientSession<ClientStream>;

impl ClientSession<ClientStream> {
    /// Connect to `host:port` over TLS and send the greeting frame.
    ///
    /// Transport creation failure yields a permanently dead session rather
    /// than an error: callers check [`ClientSession::alive`].
    #[instrument(skip(config))]
    pub async fn connect(host: &str, port: u16, config: &TlsClientConfig) -> Self {
        let addr = format!("{}:{port}", normalize_host(host));
        match tls::connect(&addr, config).await {
            Ok(stream) => Self::initialize(Connection::new(stream, addr)).await,
            Err(e) => {
                warn!(address = %addr, error = %e, "Transport creation failed");
                Self {
                    worker: None,
                    state: SessionState::Dead,
                }
            }
        }
    }
}

impl<S> ClientSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Take ownership of an established connection and send the greeting
    pub async fn initialize(conn: Connection<S>) -> Self {
        let mut session = Self {
            worker: Some(Worker::new(conn)),
            state: SessionState::Initializing,
        };

        match session.send(&Message::bare(keywords::HELLO)).await {
            Ok(()) => session.state = SessionState::Alive,
            Err(e) => debug!(error = %e, "Greeting failed"),
        }

        session
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// False once any transport or I/O fault has occurred. Never recovers.
    pub fn alive(&self) -> bool {
        self.state == SessionState::Alive
    }

    /// Send a request tag with optional extra data as one framed write
    pub async fn send_request(&mut self, tag: &str, extra: Option<&[u8]>) -> Result<()> {
        if !self.alive() {
            return Err(CommsError::NotAlive);
        }
        self.send(&Message::new(tag, extra.unwrap_or_default()))
            .await
    }

    /// Send a prepared message as one framed write
    pub async fn send_message(&mut self, message: &Message) -> Result<()> {
        if !self.alive() {
            return Err(CommsError::NotAlive);
        }
        self.send(message).await
    }

    /// One blocked read of a single frame from the server
    pub async fn read_from_server(&mut self) -> Result<Vec<u8>> {
        self.read_from_server_with_progress(|_| {}).await
    }

    /// One blocked read of a single frame, reporting advisory progress.
    ///
    /// The observer receives a percentage in `[0, 100]`; it reaches exactly
    /// 100 only on successful completion. Any I/O fault kills the session
    /// and surfaces as a typed error.
    pub async fn read_from_server_with_progress<F>(&mut self, observer: F) -> Result<Vec<u8>>
    where
        F: FnMut(u8),
    {
        if !self.alive() {
            return Err(CommsError::NotAlive);
        }

        let worker = self.worker.as_mut().ok_or(CommsError::NotAlive)?;
        match worker.read_with_progress(MAX_MESSAGE_SIZE, observer).await {
            Ok(payload) => Ok(payload),
            Err(e) => {
                self.state = SessionState::Dead;
                Err(e)
            }
        }
    }

    /// Best-effort end-of-session frame, then unconditionally release the
    /// transport. The session is dead afterwards regardless of outcome.
    pub async fn close(&mut self) {
        if self.alive() {
            let _ = self.send(&Message::bare(keywords::END_OF_SESSION)).await;
        }
        if let Some(mut worker) = self.worker.take() {
            worker.close().await;
        }
        self.state = SessionState::Dead;
    }

    async fn send(&mut self, message: &Message) -> Result<()> {
        let worker = self.worker.as_mut().ok_or(CommsError::NotAlive)?;
        match worker.write_message(message).await {
            Ok(()) => Ok(()),
            Err(e) => {
                // A broken write implies a broken stream.
                self.state = SessionState::Dead;
                Err(e)
            }
        }
    }
}

/// "example.com" from both "example.com" and "https://example.com/"
fn normalize_host(host: &str) -> String {
    host.replace("https://", "").replace('/', "")
}

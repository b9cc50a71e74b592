//! # Relay Session
//!
//! Bridges exactly two peer connections so each sees the other's byte
//! stream directly, with symmetric teardown.
//!
//! The session moves through a fixed set of slots:
//! `Empty → Waiting (one peer) → Connected (two peers) → Closed`. While
//! connected, two independent forwarding tasks splice raw bytes between the
//! peers, one per direction, with no framing. A half-open relay is a
//! failure state, not a degraded-but-valid one: a fault in either direction
//! tears down the whole session.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::RELAY_BUFFER_SIZE;
use crate::protocol::keywords;
use crate::transport::conn::Connection;

type OnClosed = Box<dyn FnOnce() + Send + 'static>;
type SharedWriter<S> = Arc<tokio::sync::Mutex<WriteHalf<S>>>;

/// Slot-based lifecycle: capacity is hard-capped at two peers
enum RelayState<S> {
    Empty,
    Waiting(Connection<S>),
    Connected {
        writers: [PeerWriter<S>; 2],
        tasks: Vec<JoinHandle<()>>,
    },
    Closed,
}

struct PeerWriter<S> {
    writer: SharedWriter<S>,
    peer_label: String,
}

/// Pairs two peer connections and forwards raw bytes between them
pub struct RelaySession<S> {
    state: Mutex<RelayState<S>>,
    cancel: CancellationToken,
    on_closed: Mutex<Option<OnClosed>>,
}

impl<S> RelaySession<S>
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(RelayState::Empty),
            cancel: CancellationToken::new(),
            on_closed: Mutex::new(None),
        })
    }

    /// Register the callback invoked exactly once when the session closes
    pub fn set_on_closed(&self, callback: impl FnOnce() + Send + 'static) {
        *self.on_closed.lock() = Some(Box::new(callback));
    }

    /// Number of peers currently held (0 once closed)
    pub fn peer_count(&self) -> usize {
        match &*self.state.lock() {
            RelayState::Empty | RelayState::Closed => 0,
            RelayState::Waiting(_) => 1,
            RelayState::Connected { .. } => 2,
        }
    }

    /// True while both peers are present and forwarding tasks run
    pub fn is_connected(&self) -> bool {
        matches!(&*self.state.lock(), RelayState::Connected { .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(&*self.state.lock(), RelayState::Closed)
    }

    /// Connect a peer to this session.
    ///
    /// Returns `false` when the session is closed or already holds two
    /// peers. The second accepted peer starts both forwarding tasks and
    /// notifies each peer with the raw [`keywords::PEER_CONNECTED`] signal.
    pub async fn add_peer(self: &Arc<Self>, conn: Connection<S>) -> bool {
        let notify: Vec<(SharedWriter<S>, String)> = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, RelayState::Closed) {
                RelayState::Empty => {
                    *state = RelayState::Waiting(conn);
                    return true;
                }
                RelayState::Waiting(first) => {
                    let (writers, tasks) = self.connect_peers(first, conn);
                    let notify = writers
                        .iter()
                        .map(|p| (Arc::clone(&p.writer), p.peer_label.clone()))
                        .collect();
                    *state = RelayState::Connected { writers, tasks };
                    notify
                }
                prev @ RelayState::Connected { .. } => {
                    *state = prev;
                    return false;
                }
                RelayState::Closed => return false,
            }
        };

        for (writer, peer_label) in notify {
            let mut writer = writer.lock().await;
            let sent = write_signal(&mut *writer, keywords::PEER_CONNECTED).await;
            drop(writer);

            if let Err(e) = sent {
                warn!(peer = %peer_label, error = %e, "Connected signal failed");
                self.close().await;
                break;
            }
        }

        true
    }

    /// Cancel both forwarding tasks, best-effort send the raw
    /// [`keywords::PEER_CLOSED`] signal to each peer, release the
    /// connections, and fire the completion callback. Idempotent.
    pub async fn close(&self) {
        let prev = std::mem::replace(&mut *self.state.lock(), RelayState::Closed);
        match prev {
            RelayState::Closed => return,
            RelayState::Empty => {}
            RelayState::Waiting(conn) => {
                let (mut stream, peer_label) = conn.into_parts();
                farewell(&mut stream, &peer_label).await;
            }
            RelayState::Connected { writers, tasks } => {
                self.cancel.cancel();
                for task in tasks {
                    if let Err(e) = task.await {
                        debug!(error = %e, "Forwarding task aborted");
                    }
                }
                for peer in writers {
                    let mut writer = peer.writer.lock().await;
                    farewell(&mut *writer, &peer.peer_label).await;
                }
            }
        }

        let callback = self.on_closed.lock().take();
        if let Some(callback) = callback {
            callback();
        }
    }

    /// Split both streams and spawn the two forwarding tasks
    fn connect_peers(
        self: &Arc<Self>,
        a: Connection<S>,
        b: Connection<S>,
    ) -> ([PeerWriter<S>; 2], Vec<JoinHandle<()>>) {
        let (a_stream, a_label) = a.into_parts();
        let (b_stream, b_label) = b.into_parts();
        let (a_read, a_write) = tokio::io::split(a_stream);
        let (b_read, b_write) = tokio::io::split(b_stream);
        let a_write = Arc::new(tokio::sync::Mutex::new(a_write));
        let b_write = Arc::new(tokio::sync::Mutex::new(b_write));

        let tasks = vec![
            tokio::spawn(forward(
                Arc::clone(self),
                a_read,
                Arc::clone(&b_write),
                format!("{a_label} -> {b_label}"),
            )),
            tokio::spawn(forward(
                Arc::clone(self),
                b_read,
                Arc::clone(&a_write),
                format!("{b_label} -> {a_label}"),
            )),
        ];

        (
            [
                PeerWriter {
                    writer: a_write,
                    peer_label: a_label,
                },
                PeerWriter {
                    writer: b_write,
                    peer_label: b_label,
                },
            ],
            tasks,
        )
    }
}

/// Copy bytes from one peer's input to the other's output until
/// end-of-stream, an I/O fault, or cancellation.
///
/// End-of-stream ends the copy normally, but still tears the session down:
/// a relay with one finished direction is half-open. Cancellation is
/// observed between buffer copies only; the buffer in flight completes.
async fn forward<S>(
    session: Arc<RelaySession<S>>,
    mut src: ReadHalf<S>,
    dst: SharedWriter<S>,
    direction: String,
) where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    let mut buf = vec![0u8; RELAY_BUFFER_SIZE];

    loop {
        let n = tokio::select! {
            _ = session.cancel.cancelled() => return,
            read = src.read(&mut buf) => match read {
                Ok(0) => {
                    debug!(%direction, "Peer reached end of stream");
                    break;
                }
                Ok(n) => n,
                Err(e) => {
                    warn!(%direction, error = %e, "Relay read failed");
                    break;
                }
            },
        };

        let mut writer = dst.lock().await;
        let copied = async {
            writer.write_all(&buf[..n]).await?;
            writer.flush().await
        }
        .await;
        drop(writer);

        if let Err(e) = copied {
            warn!(%direction, error = %e, "Relay write failed");
            break;
        }
    }

    // Teardown runs detached: close() awaits this task's handle.
    tokio::spawn(async move { session.close().await });
}

/// Raw (unframed) signal write
async fn write_signal<W>(writer: &mut W, signal: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(signal.as_bytes()).await?;
    writer.flush().await
}

/// Best-effort closed signal, then shut the stream down
async fn farewell<W>(writer: &mut W, peer_label: &str)
where
    W: AsyncWrite + Unpin,
{
    if let Err(e) = write_signal(writer, keywords::PEER_CLOSED).await {
        debug!(peer = %peer_label, error = %e, "Closed signal not delivered");
    }
    if let Err(e) = writer.shutdown().await {
        debug!(peer = %peer_label, error = %e, "Shutdown failed");
    }
}

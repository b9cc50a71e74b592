//! # Stream Worker
//!
//! Whole-packet reads and writes over one connection.
//!
//! A worker is bound to a single [`Connection`] for its entire lifetime and
//! holds no session state beyond it. Reads enforce a caller-supplied size
//! ceiling and fail on truncated frames; writes buffer one whole frame and
//! flush before returning, so the remote peer never observes a partial frame
//! at the application level.
//!
//! The worker does no queueing of outbound frames: callers must serialize
//! writers, one call completing (flush included) before the next begins.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufStream};
use tracing::debug;

use crate::core::codec;
use crate::core::packet::Packet;
use crate::error::{CommsError, Result};
use crate::protocol::message::Message;
use crate::transport::conn::Connection;

/// Framed reader/writer for one connection
pub struct Worker<S> {
    stream: Option<BufStream<S>>,
    peer_label: String,
}

impl<S> Worker<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(conn: Connection<S>) -> Self {
        let (stream, peer_label) = conn.into_parts();
        Self {
            stream: Some(BufStream::new(stream)),
            peer_label,
        }
    }

    /// Address label of the remote endpoint
    pub fn peer_label(&self) -> &str {
        &self.peer_label
    }

    /// Read the next inbound payload, bounded by `max_size`
    pub async fn read(&mut self, max_size: usize) -> Result<Vec<u8>> {
        self.read_with_progress(max_size, |_| {}).await
    }

    /// Read the next inbound payload, reporting advisory progress in `[0, 100]`
    pub async fn read_with_progress<F>(&mut self, max_size: usize, observer: F) -> Result<Vec<u8>>
    where
        F: FnMut(u8),
    {
        let stream = self.stream.as_mut().ok_or(CommsError::ConnectionClosed)?;
        codec::assemble_with_progress(stream, max_size, observer).await
    }

    /// Write one framed packet: buffer the whole frame, then flush
    pub async fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(CommsError::ConnectionClosed)?;
        stream.write_all(&packet.to_bytes()).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Frame and write a raw payload
    pub async fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.write_packet(&Packet::new(data)).await
    }

    /// Serialize and write a message as one frame
    pub async fn write_message(&mut self, message: &Message) -> Result<()> {
        self.write_packet(&Packet::new(message.to_bytes())).await
    }

    /// Flush and shut the stream down. Idempotent.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                debug!(peer = %self.peer_label, error = %e, "Shutdown failed");
            }
        }
    }
}

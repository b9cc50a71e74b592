//! Frame assembly from a byte stream.
//!
//! The codec reads exactly one frame header, validates the declared length
//! against a caller-supplied ceiling before any payload byte is read, then
//! accumulates the payload in fixed-size chunks. A stream that ends before
//! the frame is complete is a framing error, never a short payload.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::config::{HEADER_LEN, MAGIC_BYTES, READ_BUFFER_SIZE};
use crate::error::{CommsError, Result};

/// Parse and validate a frame header.
///
/// Checks the magic bytes and bounds the declared payload length by
/// `max_size`. The header slice must be exactly [`HEADER_LEN`] bytes.
pub fn decode_header(header: &[u8], max_size: usize) -> Result<usize> {
    if header.len() != HEADER_LEN || header[..MAGIC_BYTES.len()] != MAGIC_BYTES {
        return Err(CommsError::InvalidHeader);
    }

    let declared = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;
    if declared > max_size {
        return Err(CommsError::OversizedFrame(declared));
    }

    Ok(declared)
}

/// Read one complete frame off `stream` and return its payload.
pub async fn assemble<S>(stream: &mut S, max_size: usize) -> Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    assemble_with_progress(stream, max_size, |_| {}).await
}

/// Read one complete frame off `stream`, reporting advisory progress.
///
/// The observer receives a percentage in `[0, 100]` proportional to bytes
/// received over the declared length, and is called once with 100 on
/// completion. It runs synchronously between chunk reads and must not block.
/// A zero-length payload reports 100 exactly once and skips the read loop.
pub async fn assemble_with_progress<S, F>(
    stream: &mut S,
    max_size: usize,
    mut observer: F,
) -> Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
    F: FnMut(u8),
{
    let mut header = [0u8; HEADER_LEN];
    read_full(stream, &mut header).await?;

    let declared = decode_header(&header, max_size)?;
    if declared == 0 {
        observer(100);
        return Ok(Vec::new());
    }

    let mut payload = Vec::with_capacity(declared);
    let mut chunk = [0u8; READ_BUFFER_SIZE];

    while payload.len() < declared {
        observer((100 * payload.len() / declared) as u8);

        // Clamp so a read never consumes bytes belonging to the next frame.
        let want = (declared - payload.len()).min(READ_BUFFER_SIZE);
        let n = stream.read(&mut chunk[..want]).await?;
        if n == 0 {
            return Err(CommsError::StreamTooShort {
                got: payload.len(),
                expected: declared,
            });
        }
        payload.extend_from_slice(&chunk[..n]);
    }

    observer(100);
    Ok(payload)
}

/// Fill `buf` completely or fail with `StreamTooShort`.
async fn read_full<S>(stream: &mut S, buf: &mut [u8]) -> Result<()>
where
    S: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = stream.read(&mut buf[filled..]).await?;
        if n == 0 {
            return Err(CommsError::StreamTooShort {
                got: filled,
                expected: buf.len(),
            });
        }
        filled += n;
    }
    Ok(())
}

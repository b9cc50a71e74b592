//! Wire-level frame type.
//!
//! A [`Packet`] is one complete unit on the wire: the fixed magic bytes, a
//! 4-byte big-endian payload length, and the payload itself. A packet has no
//! identity beyond its bytes; integrity is delegated to the transport.

use bytes::{BufMut, Bytes, BytesMut};

use crate::config::{HEADER_LEN, MAGIC_BYTES, MAX_MESSAGE_SIZE};
use crate::core::codec::decode_header;
use crate::error::{CommsError, Result};

/// One framed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub payload: Vec<u8>,
}

impl Packet {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Encode as `MAGIC || length || payload`
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_LEN + self.payload.len());
        buf.put_slice(&MAGIC_BYTES);
        buf.put_u32(self.payload.len() as u32);
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Decode a complete in-memory frame.
    ///
    /// The declared length is validated against [`MAX_MESSAGE_SIZE`] before
    /// the payload is touched; a buffer shorter than the declared length is
    /// a framing error, never a silent truncation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(CommsError::InvalidHeader);
        }
        let declared = decode_header(&bytes[..HEADER_LEN], MAX_MESSAGE_SIZE)?;

        let body = &bytes[HEADER_LEN..];
        if body.len() < declared {
            return Err(CommsError::StreamTooShort {
                got: body.len(),
                expected: declared,
            });
        }

        Ok(Self {
            payload: body[..declared].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_roundtrip() {
        let packet = Packet::new(vec![1, 2, 3, 4, 5]);
        let bytes = packet.to_bytes();
        assert_eq!(bytes.len(), HEADER_LEN + 5);
        assert_eq!(&bytes[..4], &MAGIC_BYTES);

        let decoded = Packet::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn test_empty_payload() {
        let packet = Packet::new(Vec::new());
        let decoded = Packet::from_bytes(&packet.to_bytes()).unwrap();
        assert!(decoded.payload.is_empty());
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut bytes = Packet::new(vec![0xAA; 8]).to_bytes().to_vec();
        bytes[0] ^= 0xFF;
        assert!(matches!(
            Packet::from_bytes(&bytes),
            Err(CommsError::InvalidHeader)
        ));
    }

    #[test]
    fn test_truncated_header_rejected() {
        let bytes = Packet::new(vec![1, 2, 3]).to_bytes();
        assert!(matches!(
            Packet::from_bytes(&bytes[..HEADER_LEN - 2]),
            Err(CommsError::InvalidHeader)
        ));
    }

    #[test]
    fn test_short_body_rejected() {
        let bytes = Packet::new(vec![7; 100]).to_bytes();
        let result = Packet::from_bytes(&bytes[..HEADER_LEN + 40]);
        assert!(matches!(
            result,
            Err(CommsError::StreamTooShort {
                got: 40,
                expected: 100
            })
        ));
    }

    #[test]
    fn test_oversized_declared_length_rejected() {
        let mut bytes = MAGIC_BYTES.to_vec();
        bytes.extend_from_slice(&((MAX_MESSAGE_SIZE as u32) + 1).to_be_bytes());
        assert!(matches!(
            Packet::from_bytes(&bytes),
            Err(CommsError::OversizedFrame(_))
        ));
    }
}

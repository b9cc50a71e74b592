//! Application-level messages.
//!
//! A [`Message`] pairs a tag string with optional extra data and serializes
//! as `wrap(tag) ++ extra`, where [`wrap`] produces a self-delimiting string
//! encoding: a marker byte, a 4-byte big-endian length, and the UTF-8 bytes.

use crate::error::{CommsError, Result};

/// Marker byte opening a wrapped string
pub const STRING_MARKER: u8 = 0x01;

/// Self-delimiting encoding of a string: marker, big-endian length, UTF-8.
pub fn wrap(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(1 + 4 + bytes.len());
    out.push(STRING_MARKER);
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
    out
}

/// Decode a wrapped string from the front of `bytes`.
///
/// Returns the string and the remaining unconsumed bytes.
pub fn unwrap_string(bytes: &[u8]) -> Result<(&str, &[u8])> {
    if bytes.len() < 5 || bytes[0] != STRING_MARKER {
        return Err(CommsError::BadMessageData);
    }

    let len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;
    let rest = &bytes[5..];
    if rest.len() < len {
        return Err(CommsError::BadMessageData);
    }

    let s = std::str::from_utf8(&rest[..len]).map_err(|_| CommsError::BadMessageData)?;
    Ok((s, &rest[len..]))
}

/// A tag identifying a request plus extra data to go with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub tag: String,
    pub extra: Vec<u8>,
}

impl Message {
    pub fn new(tag: impl Into<String>, extra: impl Into<Vec<u8>>) -> Self {
        Self {
            tag: tag.into(),
            extra: extra.into(),
        }
    }

    /// A message carrying only its tag
    pub fn bare(tag: impl Into<String>) -> Self {
        Self::new(tag, Vec::new())
    }

    /// Serialize as `wrap(tag) ++ extra`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = wrap(&self.tag);
        out.extend_from_slice(&self.extra);
        out
    }

    /// Reconstruct a message from the form produced by [`Message::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (tag, extra) = unwrap_string(bytes)?;
        Ok(Self {
            tag: tag.to_string(),
            extra: extra.to_vec(),
        })
    }
}

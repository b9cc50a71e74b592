//! # Error Types
//!
//! Error handling for the comms protocol.
//!
//! This module defines all error variants that can occur during protocol
//! operations, from low-level I/O faults to wire-format violations.
//!
//! ## Error Categories
//! - **Transport Errors**: connection establishment and TLS failures
//! - **Framing Errors**: oversized, truncated, or malformed frames
//! - **Session Errors**: operations attempted on a dead session
//!
//! Low-level transport errors are translated into this taxonomy at the
//! Worker/Session boundary; raw `std::io::Error` values never reach
//! application code except wrapped in [`CommsError::Io`].

use std::io;
use thiserror::Error;

/// CommsError is the primary error type for all protocol operations
#[derive(Error, Debug)]
pub enum CommsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("TLS error: {0}")]
    TlsError(String),

    #[error("Invalid frame header")]
    InvalidHeader,

    #[error("Frame too large: {0} bytes")]
    OversizedFrame(usize),

    #[error("Stream too short: got {got} of {expected} bytes")]
    StreamTooShort { got: usize, expected: usize },

    #[error("Session is not alive")]
    NotAlive,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Bad message data")]
    BadMessageData,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CommsError {
    /// True for wire-format violations: bad magic, oversized declared
    /// length, or a stream that ended mid-frame.
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            CommsError::InvalidHeader
                | CommsError::OversizedFrame(_)
                | CommsError::StreamTooShort { .. }
        )
    }
}

/// Type alias for Results using CommsError
pub type Result<T> = std::result::Result<T, CommsError>;

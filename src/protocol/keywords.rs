//! Reserved tag strings exchanged as payload content by convention.
//!
//! The framing layer does not enforce any of these; they are a shared
//! vocabulary between client and server.

/// Greeting sent immediately after connect
pub const HELLO: &str = "HELLO";

/// Announces a cooperative close before the transport is released
pub const END_OF_SESSION: &str = "END_OF_SESSION";

/// Generic acknowledgement
pub const OK: &str = "OK";

/// The server failed to process a request
pub const SERVER_ERROR: &str = "SERVER_ERROR";

/// The server could not decode a received payload
pub const BAD_DATA_RECEIVED: &str = "BAD_DATA_RECEIVED";

/// Relay signal: both peers are present and raw bytes may flow.
/// Written to each peer as raw UTF-8 bytes, not wrapped in a frame.
pub const PEER_CONNECTED: &str = "PEER_CONNECTED";

/// Relay signal: the relay session is torn down.
/// Written to each peer as raw UTF-8 bytes, not wrapped in a frame.
pub const PEER_CLOSED: &str = "PEER_CONNECTION_CLOSED";

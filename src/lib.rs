//! # comms-protocol
//!
//! Framed point-to-point messaging and peer relay core over encrypted TCP.
//!
//! The crate exchanges discrete, variable-length packets between a client
//! and a server, and can relay a raw byte stream between two peers
//! connected through a shared rendezvous server.
//!
//! ## Wire Format
//! ```text
//! Frame := MAGIC(4) || LENGTH(4, big-endian) || PAYLOAD(LENGTH bytes)
//! ```
//!
//! ## Layers
//! - `core`: the frame type and the codec that assembles frames off a stream
//! - `protocol`: tag+extra messages and the reserved keyword vocabulary
//! - `transport`: connection ownership, the framed [`Worker`], TLS setup
//! - `service`: the liveness-tracking [`ClientSession`] and the two-peer
//!   [`RelaySession`]
//!
//! ## Example
//! ```no_run
//! use comms_protocol::service::client::ClientSession;
//! use comms_protocol::transport::tls::TlsClientConfig;
//!
//! # async fn run() {
//! let config = TlsClientConfig::new("example.com");
//! let mut session = ClientSession::connect("example.com", 7878, &config).await;
//! if session.alive() {
//!     let _ = session.send_request("PING", None).await;
//!     let reply = session.read_from_server().await;
//!     let _ = reply;
//! }
//! session.close().await;
//! # }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod transport;
pub mod utils;

pub use crate::config::{CommsConfig, HEADER_LEN, MAGIC_BYTES, MAX_MESSAGE_SIZE};
pub use crate::core::packet::Packet;
pub use crate::error::{CommsError, Result};
pub use crate::protocol::message::Message;
pub use crate::service::client::{ClientSession, SessionState, TlsClientSession};
pub use crate::service::relay::RelaySession;
pub use crate::transport::conn::Connection;
pub use crate::transport::worker::Worker;

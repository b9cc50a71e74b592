//! # Session Services
//!
//! Stateful wrappers over the transport layer.
//!
//! ## Components
//! - **Client**: liveness-tracking wrapper around one outbound connection
//! - **Relay**: pairs two connections and splices their byte streams

pub mod client;
pub mod relay;

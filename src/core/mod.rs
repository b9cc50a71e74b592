//! # Core Protocol Components
//!
//! Low-level packet handling and frame assembly.
//!
//! This module provides the foundation for the protocol: the wire-level
//! frame type and the codec that reads whole frames off a byte stream.
//!
//! ## Components
//! - **Packet**: binary frame format with magic bytes and length prefix
//! - **Codec**: header validation and incremental payload assembly
//!
//! ## Wire Format
//! ```text
//! [Magic(4)] [Length(4, big-endian)] [Payload(N)]
//! ```
//!
//! ## Security
//! - Maximum frame size: 16MB (prevents memory exhaustion)
//! - Magic bytes prevent accidental misinterpretation
//! - Length validation before allocation

pub mod codec;
pub mod packet;

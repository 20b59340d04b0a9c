//! Wire-level transport for Trinity's command/reply fabric.
//!
//! This crate knows nothing about Trinity's commands — only about framing
//! JSON documents over TCP, binding with retry, and running a client-side
//! request/reply channel. `trinity::wire` builds the actual protocol on top.

pub mod acceptor;
pub mod client;
pub mod error;
pub mod framing;

pub use client::{Channel, DEFAULT_CONNECT_TIMEOUT};
pub use error::TransportError;

//! Transport-level error type

use thiserror::Error;

/// Errors raised by framing, acceptance, and the client channel.
///
/// This is deliberately narrower than `trinity::core::error::Error` — the
/// transport crate has no notion of Trinity's commands or remote error
/// codes, only of bytes on a socket.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    #[error("timed out waiting for a reply")]
    Timeout,

    #[error("peer closed the connection")]
    Closed,

    #[error("malformed frame: {0}")]
    Malformed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

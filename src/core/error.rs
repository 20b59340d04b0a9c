//! Error kinds for the Trinity core, per spec.md §7.

use thiserror::Error;

/// Errors a session, proxy call, or brick-getter task can surface.
///
/// Propagation follows spec.md §7: handlers translate local failures into
/// an `ErrorReply` and still reply so the client is never left hanging;
/// network errors on a control connection are fatal to that session only.
#[derive(Debug, Error)]
pub enum Error {
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    #[error("timed out waiting for a reply")]
    Timeout,

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("remote error (code {0})")]
    RemoteError(i32),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("dataset incompatible: {0}")]
    DatasetIncompatible(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Transport(#[from] trinity_transport::TransportError),
}

impl Error {
    /// The `code` carried by an `ErrorReply` on the wire for this error.
    ///
    /// Codes are process-local and stable only within one running pair of
    /// nodes; they exist so a caller can distinguish error *kinds* without
    /// string-matching the message.
    pub fn code(&self) -> i32 {
        match self {
            Error::ConnectFailed(_) => 1,
            Error::Timeout => 2,
            Error::Protocol(_) => 3,
            Error::InvalidArgument(_) => 4,
            Error::RemoteError(code) => *code,
            Error::ResourceExhausted(_) => 5,
            Error::DatasetIncompatible(_) => 6,
            Error::Io(_) => 7,
            Error::Transport(_) => 8,
        }
    }
}

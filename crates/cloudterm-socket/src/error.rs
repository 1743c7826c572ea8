//! Socket error types.

use cloudterm_common::CloudtermError;
use tokio_tungstenite::tungstenite;

/// Errors raised by the socket client.
#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    /// A send was attempted while the connection is not open.
    #[error("socket is not connected")]
    NotConnected,

    #[error("invalid endpoint uri '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    /// `connect` was called on a client that already started.
    #[error("socket connection already started")]
    AlreadyStarted,

    #[error("no tokio runtime available to drive the connection")]
    NoRuntime,

    #[error("connection timed out after {0}s")]
    ConnectTimeout(u64),

    /// Network or protocol fault reported by the WebSocket layer.
    #[error(transparent)]
    Transport(#[from] tungstenite::Error),
}

impl From<SocketError> for CloudtermError {
    fn from(err: SocketError) -> Self {
        CloudtermError::Socket(err.to_string())
    }
}

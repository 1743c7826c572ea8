//! Bridge error types.

use cloudterm_common::CloudtermError;
use cloudterm_socket::SocketError;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Socket(#[from] SocketError),

    /// The bridge was built around a caller-supplied sender and has no
    /// connection of its own to start.
    #[error("bridge has no socket client to connect")]
    NoSocketClient,
}

impl From<BridgeError> for CloudtermError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Socket(e) => e.into(),
            other => CloudtermError::Bridge(other.to_string()),
        }
    }
}

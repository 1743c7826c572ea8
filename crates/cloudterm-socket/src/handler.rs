//! The callback and send traits shared by the client and its users.

use crate::error::SocketError;
use crate::types::{ConnectionState, Handshake};

/// Callbacks a [`SocketClient`](crate::SocketClient) delivers for one
/// connection.
///
/// All callbacks run sequentially on the connection's background task, so
/// an implementation never sees two of them at once. They may run
/// concurrently with any other thread the implementor shares state with.
/// Callbacks must not block: they run inside the async runtime.
pub trait SocketHandler: Send + Sync {
    /// The opening handshake completed. Fires at most once.
    fn on_open(&self, handshake: &Handshake);

    /// One inbound text frame.
    fn on_text(&self, text: &str);

    /// One inbound binary frame.
    fn on_binary(&self, data: &[u8]);

    /// A transport fault. Not necessarily followed by `on_close`.
    fn on_error(&self, error: &SocketError);

    /// The connection reached `Closed`. Fires exactly once per started
    /// connection, whichever side initiated the close.
    fn on_close(&self, code: u16, reason: &str, remote: bool);
}

/// Outbound half of a connection.
pub trait MessageSender: Send + Sync {
    /// Queue one text frame. Fails with `NotConnected` unless open.
    fn send_text(&self, text: &str) -> Result<(), SocketError>;

    /// Queue one binary frame. Fails with `NotConnected` unless open.
    fn send_binary(&self, data: &[u8]) -> Result<(), SocketError>;

    /// Request a local close with a normal close code.
    fn close(&self, reason: &str);

    fn state(&self) -> ConnectionState;
}

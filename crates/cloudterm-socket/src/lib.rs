//! Message-oriented WebSocket client for remote console sessions.
//!
//! Wraps `tokio-tungstenite` behind a callback capability set
//! ([`SocketHandler`]) and a send surface ([`MessageSender`]). One
//! [`SocketClient`] owns one connection for its whole life: no reconnect,
//! no retry.

mod client;
mod error;
mod handler;
mod types;

pub use client::SocketClient;
pub use error::SocketError;
pub use handler::{MessageSender, SocketHandler};
pub use types::{
    ConnectionState, Handshake, SocketOptions, CLOSE_ABNORMAL, CLOSE_NORMAL, CLOSE_NO_STATUS,
};

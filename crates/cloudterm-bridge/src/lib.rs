//! Session bridge between a remote console socket and a terminal.
//!
//! A [`SessionBridge`] owns one WebSocket session and exposes it to a
//! terminal emulator as two byte streams: an [`InboundStream`] to read the
//! remote output from and an [`OutboundSink`] to write keystrokes into.
//! Inbound frames are appended to an in-memory pipe in arrival order; every
//! outbound write is sent as exactly one message. When the session closes
//! the streams are released on the terminal's own context through a
//! [`Dispatcher`].

mod bridge;
pub mod dispatch;
mod error;
pub mod pipe;
mod sink;
mod state;
mod stream;

pub use bridge::SessionBridge;
pub use dispatch::{main_queue, Dispatcher, InlineDispatcher, MainLoop, MainQueue, Task};
pub use error::BridgeError;
pub use sink::OutboundSink;
pub use state::SessionState;
pub use stream::InboundStream;

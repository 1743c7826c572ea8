//! Connection state, handshake info, and client options.

use std::fmt;
use std::time::Duration;

use tokio_tungstenite::tungstenite::handshake::client::Response;

/// Close code for a normal, locally requested close.
pub const CLOSE_NORMAL: u16 = 1000;
/// Reported when the peer's Close frame carried no status code.
pub const CLOSE_NO_STATUS: u16 = 1005;
/// Reported when the connection ended without a Close frame.
pub const CLOSE_ABNORMAL: u16 = 1006;

// ---------------------------------------------------------------------------
// Connection State
// ---------------------------------------------------------------------------

/// Lifecycle of a single socket connection. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    NotYetConnected,
    Connecting,
    Open,
    Closing,
    Closed,
}

impl ConnectionState {
    pub fn is_open(self) -> bool {
        self == ConnectionState::Open
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionState::NotYetConnected => "not-yet-connected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closing => "closing",
            ConnectionState::Closed => "closed",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Handshake
// ---------------------------------------------------------------------------

/// Server response to the opening handshake.
#[derive(Debug, Clone, Default)]
pub struct Handshake {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl Handshake {
    pub(crate) fn from_response(response: &Response) -> Self {
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        Self {
            status: response.status().as_u16(),
            headers,
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Tunables for a [`SocketClient`](crate::SocketClient).
#[derive(Debug, Clone)]
pub struct SocketOptions {
    /// Upper bound on the TCP + TLS + WebSocket handshake.
    pub connect_timeout: Duration,
    /// Send a Ping at this interval while open. `None` disables keepalive.
    pub ping_interval: Option<Duration>,
    /// How long a local close waits for the peer's Close reply before the
    /// connection is dropped.
    pub close_timeout: Duration,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            ping_interval: None,
            close_timeout: Duration::from_secs(5),
        }
    }
}

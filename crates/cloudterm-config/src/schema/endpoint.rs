use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Remote console endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// WebSocket URI of the console session (`ws://` or `wss://`).
    pub uri: Option<String>,
    /// Handshake timeout in seconds (valid range: 1-300).
    pub connect_timeout_secs: u64,
    /// Keepalive ping interval in seconds; 0 disables it (valid range: 0-3600).
    pub ping_interval_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            uri: None,
            connect_timeout_secs: 15,
            ping_interval_secs: 0,
        }
    }
}

impl EndpointConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn ping_interval(&self) -> Option<Duration> {
        (self.ping_interval_secs > 0).then(|| Duration::from_secs(self.ping_interval_secs))
    }
}

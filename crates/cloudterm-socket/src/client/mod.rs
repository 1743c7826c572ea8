//! Public handle for one WebSocket connection.

mod connection;
mod shared;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::http::Uri;

use self::connection::run_connection;
use self::shared::{CloseRequest, Shared};
use crate::error::SocketError;
use crate::handler::{MessageSender, SocketHandler};
use crate::types::{ConnectionState, SocketOptions};

/// Handle for a single WebSocket connection to a fixed endpoint.
///
/// Construction only validates the URI. [`SocketClient::connect`] starts the
/// handshake on a background task which then owns the socket and delivers
/// every [`SocketHandler`] callback. Clones share the same connection.
#[derive(Clone)]
pub struct SocketClient {
    uri: String,
    options: SocketOptions,
    shared: Arc<Shared>,
}

impl std::fmt::Debug for SocketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Console endpoints usually carry an access token in the query.
        f.debug_struct("SocketClient")
            .field("uri", &redact_query(&self.uri))
            .field("options", &self.options)
            .field("state", &self.shared.state())
            .finish()
    }
}

impl SocketClient {
    /// Create an idle client for `uri` (`ws://` or `wss://`).
    pub fn new(uri: &str, options: SocketOptions) -> Result<Self, SocketError> {
        validate_uri(uri)?;
        Ok(Self {
            uri: uri.to_string(),
            options,
            shared: Arc::new(Shared::new()),
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Start the connection on the current tokio runtime.
    pub fn connect(&self, handler: Arc<dyn SocketHandler>) -> Result<JoinHandle<()>, SocketError> {
        let runtime = Handle::try_current().map_err(|_| SocketError::NoRuntime)?;
        self.connect_on(&runtime, handler)
    }

    /// Start the connection on an explicit runtime. A client connects at
    /// most once.
    pub fn connect_on(
        &self,
        runtime: &Handle,
        handler: Arc<dyn SocketHandler>,
    ) -> Result<JoinHandle<()>, SocketError> {
        self.shared.begin_connect()?;
        tracing::info!(uri = %redact_query(&self.uri), "Connecting to console endpoint");
        Ok(runtime.spawn(run_connection(
            self.uri.clone(),
            self.options.clone(),
            Arc::clone(&self.shared),
            handler,
        )))
    }
}

impl MessageSender for SocketClient {
    fn send_text(&self, text: &str) -> Result<(), SocketError> {
        self.shared.enqueue_text(text)
    }

    fn send_binary(&self, data: &[u8]) -> Result<(), SocketError> {
        self.shared.enqueue_binary(data)
    }

    fn close(&self, reason: &str) {
        match self.shared.request_close(reason) {
            CloseRequest::NeverStarted => {
                tracing::debug!("close requested before connect; client is now closed");
            }
            CloseRequest::Deferred => {
                tracing::debug!("close requested during handshake");
            }
            CloseRequest::Sent => {
                tracing::debug!(reason = %reason, "close frame queued");
            }
            CloseRequest::AlreadyClosing => {}
        }
    }

    fn state(&self) -> ConnectionState {
        self.shared.state()
    }
}

fn validate_uri(uri: &str) -> Result<(), SocketError> {
    let invalid = |reason: &str| SocketError::InvalidUri {
        uri: redact_query(uri),
        reason: reason.to_string(),
    };

    let parsed: Uri = uri.parse().map_err(|e| invalid(&format!("{e}")))?;
    match parsed.scheme_str() {
        Some("ws") | Some("wss") => {}
        _ => return Err(invalid("scheme must be ws or wss")),
    }
    if parsed.host().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }
    Ok(())
}

fn redact_query(uri: &str) -> String {
    match uri.split_once('?') {
        Some((base, _)) => format!("{base}?[REDACTED]"),
        None => uri.to_string(),
    }
}

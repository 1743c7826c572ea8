//! The session bridge: one socket session, two terminal streams.

mod handler;
mod notice;


use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cloudterm_common::SessionId;
use cloudterm_socket::{
    ConnectionState, MessageSender, SocketClient, SocketError, SocketHandler, SocketOptions,
    CLOSE_NORMAL,
};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::dispatch::Dispatcher;
use crate::error::BridgeError;
use crate::pipe::{pipe, PipeReader, PipeWriter};
use crate::sink::OutboundSink;
use crate::state::SessionState;
use crate::stream::InboundStream;

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// Every stream end the bridge owns, released together at teardown.
#[derive(Clone)]
struct Endpoints {
    inbound_tx: PipeWriter,
    inbound_rx: PipeReader,
    outbound: OutboundSink,
    released: Arc<AtomicBool>,
}

impl Endpoints {
    fn new(sender: Arc<dyn MessageSender>) -> Self {
        let (inbound_tx, inbound_rx) = pipe();
        Self {
            inbound_tx,
            inbound_rx,
            outbound: OutboundSink::new(sender),
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Close all ends. Safe to call any number of times from any thread.
    fn release(&self, session: &SessionId) {
        self.inbound_tx.close();
        self.inbound_rx.close();
        self.outbound.close();
        if !self.released.swap(true, Ordering::AcqRel) {
            tracing::debug!(session = %session, "Console streams released");
        }
    }
}

// ---------------------------------------------------------------------------
// Bridge
// ---------------------------------------------------------------------------

/// Adapter presenting one remote console session as a pair of byte streams.
///
/// The bridge is the [`SocketHandler`](cloudterm_socket::SocketHandler) of
/// its own connection. Construction does not connect; call
/// [`SessionBridge::connect`] and only use the streams once the state is
/// [`SessionState::Open`].
pub struct SessionBridge {
    id: SessionId,
    client: Option<SocketClient>,
    sender: Arc<dyn MessageSender>,
    dispatcher: Arc<dyn Dispatcher>,
    endpoints: Endpoints,
    state: watch::Sender<SessionState>,
    close_seen: AtomicBool,
}

impl SessionBridge {
    /// Bridge to the console at `uri` with default socket options.
    pub fn new(uri: &str, dispatcher: Arc<dyn Dispatcher>) -> Result<Arc<Self>, BridgeError> {
        Self::with_options(uri, SocketOptions::default(), dispatcher)
    }

    pub fn with_options(
        uri: &str,
        options: SocketOptions,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Result<Arc<Self>, BridgeError> {
        let client = SocketClient::new(uri, options)?;
        let sender: Arc<dyn MessageSender> = Arc::new(client.clone());
        Ok(Arc::new(Self::build(Some(client), sender, dispatcher)))
    }

    /// Bridge over a caller-managed sender. The caller delivers the
    /// [`SocketHandler`](cloudterm_socket::SocketHandler) callbacks itself.
    pub fn with_sender(
        sender: Arc<dyn MessageSender>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Arc<Self> {
        Arc::new(Self::build(None, sender, dispatcher))
    }

    fn build(
        client: Option<SocketClient>,
        sender: Arc<dyn MessageSender>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Connecting);
        Self {
            id: SessionId::new(),
            client,
            endpoints: Endpoints::new(Arc::clone(&sender)),
            sender,
            dispatcher,
            state,
            close_seen: AtomicBool::new(false),
        }
    }

    /// Start the handshake on the current tokio runtime.
    pub fn connect(self: &Arc<Self>) -> Result<JoinHandle<()>, BridgeError> {
        let runtime = Handle::try_current().map_err(|_| SocketError::NoRuntime)?;
        self.connect_on(&runtime)
    }

    pub fn connect_on(self: &Arc<Self>, runtime: &Handle) -> Result<JoinHandle<()>, BridgeError> {
        let client = self.client.as_ref().ok_or(BridgeError::NoSocketClient)?;
        let handler: Arc<dyn SocketHandler> = Arc::clone(self) as Arc<dyn SocketHandler>;
        let handle = client.connect_on(runtime, handler)?;
        tracing::debug!(session = %self.id, "Console session connecting");
        Ok(handle)
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Endpoint URI, when the bridge owns its socket client.
    pub fn uri(&self) -> Option<&str> {
        self.client.as_ref().map(SocketClient::uri)
    }

    /// Stream of remote output for the terminal to read.
    pub fn inbound(&self) -> InboundStream {
        InboundStream::new(self.endpoints.inbound_rx.clone())
    }

    /// Sink for terminal input.
    pub fn outbound(&self) -> OutboundSink {
        self.endpoints.outbound.clone()
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Watch session state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Request a local close. The session reports `Closed` once the socket
    /// confirms; a bridge that never connected closes immediately.
    pub fn close(&self, reason: &str) {
        if self.state() == SessionState::Closed {
            return;
        }
        let never_started = self.sender.state() == ConnectionState::NotYetConnected;
        self.set_state(SessionState::Closing);
        self.sender.close(reason);
        if never_started {
            self.finish_close(CLOSE_NORMAL, reason, false);
        }
    }

    /// Close every stream end now, on the calling thread. Idempotent; safe
    /// to call after the scheduled teardown has already run.
    pub fn release_streams(&self) {
        self.endpoints.release(&self.id);
    }

    fn set_state(&self, next: SessionState) {
        self.state.send_if_modified(|current| {
            if *current == SessionState::Closed || *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

impl Drop for SessionBridge {
    fn drop(&mut self) {
        if self.state() != SessionState::Closed {
            self.sender.close("bridge dropped");
        }
        self.endpoints.release(&self.id);
    }
}

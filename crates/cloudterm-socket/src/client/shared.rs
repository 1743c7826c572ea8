//! State shared between the client handle and its connection task.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

use crate::error::SocketError;
use crate::types::ConnectionState;

pub(crate) struct Shared {
    inner: Mutex<Inner>,
}

struct Inner {
    state: ConnectionState,
    /// Present only while `Open`.
    outbound: Option<mpsc::UnboundedSender<Message>>,
    /// Reason given to a close requested before the handshake finished.
    deferred_close: Option<String>,
}

/// Outcome of the connection task trying to enter `Open`.
pub(crate) enum OpenOutcome {
    Opened,
    /// `close()` arrived mid-handshake; carries its reason.
    CloseRequested(String),
}

pub(crate) enum CloseRequest {
    NeverStarted,
    Deferred,
    Sent,
    AlreadyClosing,
}

impl Shared {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: ConnectionState::NotYetConnected,
                outbound: None,
                deferred_close: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn state(&self) -> ConnectionState {
        self.lock().state
    }

    pub(crate) fn begin_connect(&self) -> Result<(), SocketError> {
        let mut inner = self.lock();
        if inner.state != ConnectionState::NotYetConnected {
            return Err(SocketError::AlreadyStarted);
        }
        inner.state = ConnectionState::Connecting;
        Ok(())
    }

    pub(crate) fn open(&self, outbound: mpsc::UnboundedSender<Message>) -> OpenOutcome {
        let mut inner = self.lock();
        if let Some(reason) = inner.deferred_close.take() {
            return OpenOutcome::CloseRequested(reason);
        }
        inner.state = ConnectionState::Open;
        inner.outbound = Some(outbound);
        OpenOutcome::Opened
    }

    pub(crate) fn enqueue_text(&self, text: &str) -> Result<(), SocketError> {
        self.enqueue(Message::Text(text.to_string().into()))
    }

    pub(crate) fn enqueue_binary(&self, data: &[u8]) -> Result<(), SocketError> {
        self.enqueue(Message::Binary(data.to_vec().into()))
    }

    fn enqueue(&self, message: Message) -> Result<(), SocketError> {
        let inner = self.lock();
        if inner.state != ConnectionState::Open {
            return Err(SocketError::NotConnected);
        }
        match &inner.outbound {
            Some(tx) => tx.send(message).map_err(|_| SocketError::NotConnected),
            None => Err(SocketError::NotConnected),
        }
    }

    pub(crate) fn request_close(&self, reason: &str) -> CloseRequest {
        let mut inner = self.lock();
        match inner.state {
            ConnectionState::NotYetConnected => {
                inner.state = ConnectionState::Closed;
                CloseRequest::NeverStarted
            }
            ConnectionState::Connecting => {
                inner.state = ConnectionState::Closing;
                inner.deferred_close = Some(reason.to_string());
                CloseRequest::Deferred
            }
            ConnectionState::Open => {
                inner.state = ConnectionState::Closing;
                if let Some(tx) = &inner.outbound {
                    let _ = tx.send(Message::Close(Some(normal_close_frame(reason))));
                }
                CloseRequest::Sent
            }
            ConnectionState::Closing | ConnectionState::Closed => CloseRequest::AlreadyClosing,
        }
    }

    pub(crate) fn mark_closed(&self) {
        let mut inner = self.lock();
        inner.state = ConnectionState::Closed;
        inner.outbound = None;
        inner.deferred_close = None;
    }
}

pub(crate) fn normal_close_frame(reason: &str) -> CloseFrame {
    CloseFrame {
        code: CloseCode::Normal,
        reason: reason.to_string().into(),
    }
}

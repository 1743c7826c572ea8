//! Outbound endpoint: every terminal write becomes one socket message.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use cloudterm_socket::{MessageSender, SocketError};

const UNCONNECTED: u8 = 0;
const OPEN: u8 = 1;
const CLOSED: u8 = 2;

/// Write-only stream the terminal sends keystrokes into.
///
/// Nothing is buffered: a write of N bytes is transmitted as one message of
/// exactly those N bytes, or fails. Valid UTF-8 goes out as a text frame;
/// anything else goes out unchanged as a binary frame. Writes before the
/// session opens or after it closes fail with `NotConnected` and transmit
/// nothing.
#[derive(Clone)]
pub struct OutboundSink {
    inner: Arc<SinkInner>,
}

struct SinkInner {
    sender: Arc<dyn MessageSender>,
    state: AtomicU8,
    bytes_sent: AtomicU64,
    messages_sent: AtomicU64,
}

impl OutboundSink {
    pub(crate) fn new(sender: Arc<dyn MessageSender>) -> Self {
        Self {
            inner: Arc::new(SinkInner {
                sender,
                state: AtomicU8::new(UNCONNECTED),
                bytes_sent: AtomicU64::new(0),
                messages_sent: AtomicU64::new(0),
            }),
        }
    }

    /// Allow writes. Has no effect once closed.
    pub(crate) fn open(&self) {
        let _ = self.inner.state.compare_exchange(
            UNCONNECTED,
            OPEN,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Refuse all further writes. Idempotent.
    pub(crate) fn close(&self) {
        self.inner.state.store(CLOSED, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.load(Ordering::Acquire) == CLOSED
    }

    /// Total payload bytes handed to the socket.
    pub fn bytes_sent(&self) -> u64 {
        self.inner.bytes_sent.load(Ordering::Relaxed)
    }

    /// Number of messages handed to the socket.
    pub fn messages_sent(&self) -> u64 {
        self.inner.messages_sent.load(Ordering::Relaxed)
    }

    fn transmit(&self, buf: &[u8]) -> Result<(), SocketError> {
        match std::str::from_utf8(buf) {
            Ok(text) => self.inner.sender.send_text(text),
            Err(_) => {
                tracing::trace!(len = buf.len(), "non-UTF-8 input, sending binary frame");
                self.inner.sender.send_binary(buf)
            }
        }
    }
}

impl Write for OutboundSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.inner.state.load(Ordering::Acquire) != OPEN {
            return Err(not_connected());
        }
        if buf.is_empty() {
            return Ok(0);
        }
        self.transmit(buf).map_err(|e| match e {
            SocketError::NotConnected => not_connected(),
            other => io::Error::other(other),
        })?;
        self.inner
            .bytes_sent
            .fetch_add(buf.len() as u64, Ordering::Relaxed);
        self.inner.messages_sent.fetch_add(1, Ordering::Relaxed);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "console session is not open")
}

//! In-memory byte pipe with one producer and one consumer.
//!
//! A pipe starts unconnected: both ends refuse I/O with `NotConnected` until
//! [`PipeWriter::connect`] is called. Once closed (from either end) writes
//! fail with `BrokenPipe` and reads drain what is buffered, then report EOF.
//! Closing is idempotent.

mod buffer;


use std::io::{self, Read, Write};
use std::sync::Arc;

use self::buffer::PipeCore;

/// Create a connected-on-demand pipe pair.
pub fn pipe() -> (PipeWriter, PipeReader) {
    let core = Arc::new(PipeCore::new());
    (
        PipeWriter {
            core: Arc::clone(&core),
        },
        PipeReader { core },
    )
}

/// Producer end.
#[derive(Clone)]
pub struct PipeWriter {
    core: Arc<PipeCore>,
}

impl PipeWriter {
    /// Join the two ends. Calling it again is harmless.
    pub fn connect(&self) {
        self.core.connect();
    }

    /// Append `bytes` as one unit.
    pub fn push(&self, bytes: &[u8]) -> io::Result<()> {
        self.core.push(bytes)
    }

    pub fn close(&self) {
        self.core.close();
    }

    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.push(buf)?;
        Ok(buf.len())
    }

    /// Pushed bytes are visible to the reader immediately.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Consumer end. Reads block until data arrives or the pipe closes.
#[derive(Clone)]
pub struct PipeReader {
    core: Arc<PipeCore>,
}

impl PipeReader {
    pub fn close(&self) {
        self.core.close();
    }

    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }

    /// Bytes buffered and not yet read.
    pub fn available(&self) -> usize {
        self.core.available()
    }
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.core.pop_into(buf)
    }
}

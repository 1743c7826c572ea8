//! Inbound endpoint handed to the terminal.

use std::io::{self, Read};

use crate::pipe::PipeReader;

/// Byte stream of everything the remote session sent, in arrival order.
///
/// `read` blocks until bytes arrive. Once the session has been torn down it
/// returns what is still buffered and then `Ok(0)`.
#[derive(Clone)]
pub struct InboundStream {
    reader: PipeReader,
}

impl InboundStream {
    pub(crate) fn new(reader: PipeReader) -> Self {
        Self { reader }
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_closed()
    }

    pub fn available(&self) -> usize {
        self.reader.available()
    }
}

impl Read for InboundStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

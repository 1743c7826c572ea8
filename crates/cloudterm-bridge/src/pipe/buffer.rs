//! Shared buffer and state behind both pipe ends.

use std::collections::VecDeque;
use std::io;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

pub(super) struct PipeCore {
    state: Mutex<PipeState>,
    readable: Condvar,
}

struct PipeState {
    buffer: VecDeque<u8>,
    connected: bool,
    closed: bool,
}

impl PipeCore {
    pub(super) fn new() -> Self {
        Self {
            state: Mutex::new(PipeState {
                buffer: VecDeque::new(),
                connected: false,
                closed: false,
            }),
            readable: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PipeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn connect(&self) {
        self.lock().connected = true;
    }

    pub(super) fn close(&self) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        drop(state);
        self.readable.notify_all();
    }

    pub(super) fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub(super) fn available(&self) -> usize {
        self.lock().buffer.len()
    }

    pub(super) fn push(&self, bytes: &[u8]) -> io::Result<()> {
        let mut state = self.lock();
        if state.closed {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        }
        if !state.connected {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "pipe not connected",
            ));
        }
        if bytes.is_empty() {
            return Ok(());
        }
        state.buffer.extend(bytes);
        drop(state);
        self.readable.notify_one();
        Ok(())
    }

    pub(super) fn pop_into(&self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        let mut state = self.lock();
        loop {
            if !state.buffer.is_empty() {
                let n = out.len().min(state.buffer.len());
                for (slot, byte) in out.iter_mut().zip(state.buffer.drain(..n)) {
                    *slot = byte;
                }
                return Ok(n);
            }
            if state.closed {
                return Ok(0);
            }
            if !state.connected {
                return Err(io::Error::new(
                    io::ErrorKind::NotConnected,
                    "pipe not connected",
                ));
            }
            state = self
                .readable
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

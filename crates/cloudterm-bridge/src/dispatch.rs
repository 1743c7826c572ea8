//! Deferred execution on the consumer's own context.
//!
//! Teardown of the stream endpoints is posted to the context the terminal
//! renders on, so a pipe is never closed in the middle of a render pass.
//! [`MainQueue`]/[`MainLoop`] provide such a context for hosts that do not
//! already have one; [`InlineDispatcher`] runs tasks on the caller.

use std::sync::mpsc;
use std::time::Duration;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Something that runs tasks later on a context it owns.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, task: Task);
}

/// Runs each task immediately on the dispatching thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn dispatch(&self, task: Task) {
        task();
    }
}

/// Create a task queue and the loop that drains it.
pub fn main_queue() -> (MainQueue, MainLoop) {
    let (tx, rx) = mpsc::channel();
    (MainQueue { tx }, MainLoop { rx })
}

/// Sending half: posts tasks to a [`MainLoop`].
#[derive(Clone)]
pub struct MainQueue {
    tx: mpsc::Sender<Task>,
}

impl Dispatcher for MainQueue {
    fn dispatch(&self, task: Task) {
        if let Err(mpsc::SendError(task)) = self.tx.send(task) {
            // Nobody is draining the loop any more; run the task here so the
            // work is not lost.
            tracing::debug!("main loop gone, running task inline");
            task();
        }
    }
}

/// Receiving half, owned by the thread acting as the main context.
pub struct MainLoop {
    rx: mpsc::Receiver<Task>,
}

impl MainLoop {
    /// Run every task queued so far. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Run tasks as they arrive until `done` returns true or every
    /// [`MainQueue`] has been dropped. `done` is checked at least every
    /// `poll` interval.
    pub fn run_until(&self, mut done: impl FnMut() -> bool, poll: Duration) {
        while !done() {
            match self.rx.recv_timeout(poll) {
                Ok(task) => task(),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => return,
            }
        }
    }

    /// Wait up to `timeout` for one task and run it. Returns whether a task
    /// ran.
    pub fn run_one(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(task) => {
                task();
                true
            }
            Err(_) => false,
        }
    }
}

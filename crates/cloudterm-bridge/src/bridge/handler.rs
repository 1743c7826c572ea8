//! Socket callbacks: where remote traffic enters the inbound pipe.

use std::sync::atomic::Ordering;

use cloudterm_socket::{Handshake, SocketError, SocketHandler};
use tracing::{debug, info, warn};

use super::notice::close_notice;
use super::SessionBridge;
use crate::state::SessionState;

impl SessionBridge {
    /// Append one frame's bytes to the inbound pipe.
    fn deliver(&self, bytes: &[u8]) {
        if let Err(e) = self.endpoints.inbound_tx.push(bytes) {
            debug!(
                session = %self.id,
                error = %e,
                len = bytes.len(),
                "Dropping inbound frame"
            );
        }
    }

    /// Shared close path for socket-reported and never-connected closes.
    pub(super) fn finish_close(&self, code: u16, reason: &str, remote: bool) {
        if self.close_seen.swap(true, Ordering::AcqRel) {
            debug!(session = %self.id, code, "Duplicate close ignored");
            return;
        }

        if remote {
            info!(
                session = %self.id,
                code,
                reason = %reason,
                "Console session closed by remote host"
            );
            // Written before teardown is scheduled, so it is the last thing
            // the terminal reads.
            self.deliver(close_notice(code, reason).as_bytes());
        } else {
            info!(session = %self.id, code, "Console session closed");
        }

        self.set_state(SessionState::Closed);

        let endpoints = self.endpoints.clone();
        let session = self.id.clone();
        self.dispatcher
            .dispatch(Box::new(move || endpoints.release(&session)));
    }
}

impl SocketHandler for SessionBridge {
    fn on_open(&self, handshake: &Handshake) {
        self.endpoints.inbound_tx.connect();
        self.endpoints.outbound.open();
        self.set_state(SessionState::Open);
        info!(session = %self.id, status = handshake.status, "Console session open");
    }

    fn on_text(&self, text: &str) {
        self.deliver(text.as_bytes());
    }

    fn on_binary(&self, data: &[u8]) {
        self.deliver(data);
    }

    fn on_error(&self, error: &SocketError) {
        warn!(session = %self.id, error = %error, "Exception in the console WebSocket");
    }

    fn on_close(&self, code: u16, reason: &str, remote: bool) {
        self.finish_close(code, reason, remote);
    }
}

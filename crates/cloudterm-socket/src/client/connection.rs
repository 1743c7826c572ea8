//! Background connection task: handshake, frame dispatch, close reporting.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep_until, Instant, Interval};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::shared::{normal_close_frame, OpenOutcome, Shared};
use crate::error::SocketError;
use crate::handler::SocketHandler;
use crate::types::{Handshake, SocketOptions, CLOSE_ABNORMAL, CLOSE_NORMAL, CLOSE_NO_STATUS};

const CLOSE_FLUSH: Duration = Duration::from_secs(1);

/// How the connection ended, as reported to `on_close`.
struct Closed {
    code: u16,
    reason: String,
    remote: bool,
}

impl Closed {
    /// The socket went away without a completed close handshake. If a local
    /// close was already in flight the close still counts as ours.
    fn abnormal(local: Option<(u16, String)>) -> Self {
        match local {
            Some((code, reason)) => Self {
                code,
                reason,
                remote: false,
            },
            None => Self {
                code: CLOSE_ABNORMAL,
                reason: String::new(),
                remote: true,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Connection Task
// ---------------------------------------------------------------------------

/// Drive one connection from handshake to close. `on_close` is always the
/// last callback delivered.
pub(crate) async fn run_connection(
    uri: String,
    options: SocketOptions,
    shared: Arc<Shared>,
    handler: Arc<dyn SocketHandler>,
) {
    let connected =
        tokio::time::timeout(options.connect_timeout, connect_async(uri.as_str())).await;

    let (ws_stream, handshake) = match connected {
        Ok(Ok((ws_stream, response))) => (ws_stream, Handshake::from_response(&response)),
        Ok(Err(e)) => {
            let err = SocketError::from(e);
            warn!(error = %err, "Failed to connect to console endpoint");
            fail_before_open(&shared, handler.as_ref(), err);
            return;
        }
        Err(_elapsed) => {
            let err = SocketError::ConnectTimeout(options.connect_timeout.as_secs());
            warn!(error = %err, "Console endpoint handshake timed out");
            fail_before_open(&shared, handler.as_ref(), err);
            return;
        }
    };

    let (mut ws_write, mut ws_read) = ws_stream.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Set once a Close frame of ours is on the wire.
    let mut local_close: Option<(u16, String)> = None;
    // The peer must answer our Close frame by then.
    let mut close_deadline: Option<Instant> = None;

    match shared.open(outbound_tx) {
        OpenOutcome::Opened => {
            info!(status = handshake.status, "Console socket open");
            handler.on_open(&handshake);
        }
        OpenOutcome::CloseRequested(reason) => {
            debug!("Closing immediately after handshake");
            let _ = ws_write
                .send(Message::Close(Some(normal_close_frame(&reason))))
                .await;
            local_close = Some((CLOSE_NORMAL, reason));
            close_deadline = Some(Instant::now() + options.close_timeout);
        }
    }

    let mut keepalive = options
        .ping_interval
        .map(|period| interval_at(Instant::now() + period, period));

    let closed = loop {
        tokio::select! {
            Some(message) = outbound_rx.recv() => {
                if let Message::Close(Some(frame)) = &message {
                    local_close = Some((u16::from(frame.code), frame.reason.to_string()));
                    close_deadline = Some(Instant::now() + options.close_timeout);
                }
                if let Err(e) = ws_write.send(message).await {
                    let err = SocketError::from(e);
                    warn!(error = %err, "WebSocket send failed");
                    handler.on_error(&err);
                    break Closed::abnormal(local_close.take());
                }
            }

            _ = wait_until(close_deadline) => {
                debug!(
                    timeout_ms = options.close_timeout.as_millis() as u64,
                    "Peer did not answer close, dropping connection"
                );
                break Closed::abnormal(local_close.take());
            }

            _ = next_keepalive(&mut keepalive) => {
                if let Err(e) = ws_write.send(Message::Ping(Vec::new().into())).await {
                    debug!(error = %e, "Keepalive ping failed");
                }
            }

            frame = ws_read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => handler.on_text(text.as_str()),
                    Some(Ok(Message::Binary(data))) => handler.on_binary(&data),
                    Some(Ok(Message::Close(frame))) => {
                        break match local_close.take() {
                            Some((code, reason)) => Closed { code, reason, remote: false },
                            None => {
                                let (code, reason) = frame
                                    .map(|f| (u16::from(f.code), f.reason.to_string()))
                                    .unwrap_or((CLOSE_NO_STATUS, String::new()));
                                Closed { code, reason, remote: true }
                            }
                        };
                    }
                    // tungstenite queues the Pong for an inbound Ping itself.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        let err = SocketError::from(e);
                        warn!(error = %err, "WebSocket error");
                        handler.on_error(&err);
                        break Closed::abnormal(local_close.take());
                    }
                    None => break Closed::abnormal(local_close.take()),
                }
            }
        }
    };

    shared.mark_closed();
    // Flush the close reply tungstenite queued for a peer-initiated close.
    if tokio::time::timeout(CLOSE_FLUSH, ws_write.close()).await.is_err() {
        debug!("Timed out flushing close handshake");
    }
    info!(
        code = closed.code,
        remote = closed.remote,
        "Console socket closed"
    );
    handler.on_close(closed.code, &closed.reason, closed.remote);
}

/// Report a connection that never reached `Open`.
fn fail_before_open(shared: &Shared, handler: &dyn SocketHandler, err: SocketError) {
    handler.on_error(&err);
    shared.mark_closed();
    handler.on_close(CLOSE_ABNORMAL, &err.to_string(), false);
}

async fn next_keepalive(keepalive: &mut Option<Interval>) {
    match keepalive {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

//! Loopback tests against a real `tokio-tungstenite` server.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

use super::*;
use crate::types::{Handshake, CLOSE_ABNORMAL, CLOSE_NORMAL};

#[derive(Debug, Clone, PartialEq)]
enum Seen {
    Open(u16),
    Text(String),
    Binary(Vec<u8>),
    Error,
    Close(u16, String, bool),
}

struct Recorder {
    tx: mpsc::UnboundedSender<Seen>,
}

impl SocketHandler for Recorder {
    fn on_open(&self, handshake: &Handshake) {
        let _ = self.tx.send(Seen::Open(handshake.status));
    }

    fn on_text(&self, text: &str) {
        let _ = self.tx.send(Seen::Text(text.to_string()));
    }

    fn on_binary(&self, data: &[u8]) {
        let _ = self.tx.send(Seen::Binary(data.to_vec()));
    }

    fn on_error(&self, _error: &SocketError) {
        let _ = self.tx.send(Seen::Error);
    }

    fn on_close(&self, code: u16, reason: &str, remote: bool) {
        let _ = self.tx.send(Seen::Close(code, reason.to_string(), remote));
    }
}

fn recorder() -> (Arc<Recorder>, mpsc::UnboundedReceiver<Seen>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(Recorder { tx }), rx)
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Seen>) -> Seen {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("callback within 5s")
        .expect("handler channel open")
}

/// Accept one WebSocket client and hand it to `script`.
async fn serve_once<F, Fut>(script: F) -> String
where
    F: FnOnce(WebSocketStream<TcpStream>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = accept_async(stream).await.unwrap();
        script(ws).await;
    });
    format!("ws://{addr}/console")
}

async fn drain(mut ws: WebSocketStream<TcpStream>) {
    while let Some(Ok(_)) = ws.next().await {}
}

#[test]
fn rejects_non_websocket_scheme() {
    let err = SocketClient::new("https://example.com/console", SocketOptions::default())
        .unwrap_err();
    assert!(matches!(err, SocketError::InvalidUri { .. }));
}

#[test]
fn rejects_unparseable_uri() {
    let err = SocketClient::new("not a uri", SocketOptions::default()).unwrap_err();
    assert!(matches!(err, SocketError::InvalidUri { .. }));
}

#[test]
fn debug_output_redacts_query() {
    let client =
        SocketClient::new("wss://shell.example.com/term?token=secret", SocketOptions::default())
            .unwrap();
    let debug = format!("{client:?}");
    assert!(!debug.contains("secret"));
    assert!(debug.contains("[REDACTED]"));
}

#[test]
fn send_before_connect_is_not_connected() {
    let client = SocketClient::new("ws://127.0.0.1:1/", SocketOptions::default()).unwrap();
    assert_eq!(client.state(), ConnectionState::NotYetConnected);
    assert!(matches!(
        client.send_text("ls\r"),
        Err(SocketError::NotConnected)
    ));
    assert!(matches!(
        client.send_binary(b"ls\r"),
        Err(SocketError::NotConnected)
    ));
}

#[test]
fn connect_without_runtime_fails() {
    let client = SocketClient::new("ws://127.0.0.1:1/", SocketOptions::default()).unwrap();
    let (handler, _rx) = recorder();
    assert!(matches!(client.connect(handler), Err(SocketError::NoRuntime)));
}

#[test]
fn close_before_connect_is_terminal() {
    let client = SocketClient::new("ws://127.0.0.1:1/", SocketOptions::default()).unwrap();
    client.close("never mind");
    assert_eq!(client.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn delivers_frames_in_order_then_remote_close() {
    let uri = serve_once(|mut ws| async move {
        ws.send(Message::Text("hello ".to_string().into())).await.unwrap();
        ws.send(Message::Binary(vec![0x1b, b'[', b'm'].into()))
            .await
            .unwrap();
        ws.send(Message::Text("world".to_string().into())).await.unwrap();
        ws.close(Some(CloseFrame {
            code: CloseCode::Away,
            reason: "idle timeout".to_string().into(),
        }))
        .await
        .unwrap();
        drain(ws).await;
    })
    .await;

    let client = SocketClient::new(&uri, SocketOptions::default()).unwrap();
    let (handler, mut rx) = recorder();
    let task = client.connect(handler).unwrap();

    assert_eq!(next(&mut rx).await, Seen::Open(101));
    assert_eq!(next(&mut rx).await, Seen::Text("hello ".into()));
    assert_eq!(next(&mut rx).await, Seen::Binary(vec![0x1b, b'[', b'm']));
    assert_eq!(next(&mut rx).await, Seen::Text("world".into()));
    assert_eq!(
        next(&mut rx).await,
        Seen::Close(1001, "idle timeout".into(), true)
    );

    task.await.unwrap();
    assert_eq!(client.state(), ConnectionState::Closed);
    assert!(matches!(
        client.send_text("late"),
        Err(SocketError::NotConnected)
    ));
}

#[tokio::test]
async fn each_send_is_one_frame() {
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel::<Message>();
    let uri = serve_once(move |mut ws| async move {
        while let Some(Ok(message)) = ws.next().await {
            if message.is_close() {
                break;
            }
            let _ = seen_tx.send(message);
        }
    })
    .await;

    let client = SocketClient::new(&uri, SocketOptions::default()).unwrap();
    let (handler, mut rx) = recorder();
    client.connect(handler).unwrap();
    assert_eq!(next(&mut rx).await, Seen::Open(101));

    client.send_text("l").unwrap();
    client.send_text("s -la\r").unwrap();
    client.send_binary(&[0xff, 0x00]).unwrap();

    let mut frames = Vec::new();
    for _ in 0..3 {
        let frame = tokio::time::timeout(Duration::from_secs(5), seen_rx.recv())
            .await
            .unwrap()
            .unwrap();
        frames.push(frame);
    }
    assert_eq!(frames[0], Message::Text("l".to_string().into()));
    assert_eq!(frames[1], Message::Text("s -la\r".to_string().into()));
    assert_eq!(frames[2], Message::Binary(vec![0xff, 0x00].into()));
}

#[tokio::test]
async fn local_close_reports_not_remote() {
    let uri = serve_once(drain).await;

    let client = SocketClient::new(&uri, SocketOptions::default()).unwrap();
    let (handler, mut rx) = recorder();
    client.connect(handler).unwrap();
    assert_eq!(next(&mut rx).await, Seen::Open(101));

    client.close("user exit");
    assert!(matches!(
        client.send_text("after close"),
        Err(SocketError::NotConnected)
    ));
    assert_eq!(
        next(&mut rx).await,
        Seen::Close(CLOSE_NORMAL, "user exit".into(), false)
    );
    assert_eq!(client.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn dropped_connection_is_abnormal_remote_close() {
    let uri = serve_once(|mut ws| async move {
        ws.send(Message::Text("bye".to_string().into())).await.unwrap();
        drop(ws);
    })
    .await;

    let client = SocketClient::new(&uri, SocketOptions::default()).unwrap();
    let (handler, mut rx) = recorder();
    client.connect(handler).unwrap();

    assert_eq!(next(&mut rx).await, Seen::Open(101));
    assert_eq!(next(&mut rx).await, Seen::Text("bye".into()));

    // A reset may or may not surface as an error first.
    let mut last = next(&mut rx).await;
    if last == Seen::Error {
        last = next(&mut rx).await;
    }
    assert_eq!(last, Seen::Close(CLOSE_ABNORMAL, String::new(), true));
}

#[tokio::test]
async fn refused_connection_reports_error_then_close() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = SocketClient::new(&format!("ws://{addr}/"), SocketOptions::default()).unwrap();
    let (handler, mut rx) = recorder();
    client.connect(handler).unwrap();

    assert_eq!(next(&mut rx).await, Seen::Error);
    match next(&mut rx).await {
        Seen::Close(code, _, remote) => {
            assert_eq!(code, CLOSE_ABNORMAL);
            assert!(!remote);
        }
        other => panic!("expected close, got {other:?}"),
    }
    assert_eq!(client.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn connect_twice_is_rejected() {
    let uri = serve_once(drain).await;
    let client = SocketClient::new(&uri, SocketOptions::default()).unwrap();
    let (handler, _rx) = recorder();
    client.connect(handler.clone()).unwrap();
    assert!(matches!(
        client.connect(handler),
        Err(SocketError::AlreadyStarted)
    ));
}

#[tokio::test]
async fn local_close_gives_up_on_silent_peer() {
    // Holds the socket open but never reads, so our Close is never answered.
    let uri = serve_once(|ws| async move {
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(ws);
    })
    .await;

    let options = SocketOptions {
        close_timeout: Duration::from_millis(200),
        ..SocketOptions::default()
    };
    let client = SocketClient::new(&uri, options).unwrap();
    let (handler, mut rx) = recorder();
    let task = client.connect(handler).unwrap();
    assert_eq!(next(&mut rx).await, Seen::Open(101));

    client.close("user exit");
    assert_eq!(client.state(), ConnectionState::Closing);
    assert_eq!(
        next(&mut rx).await,
        Seen::Close(CLOSE_NORMAL, "user exit".into(), false)
    );

    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(client.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn keepalive_sends_pings_while_open() {
    let (ping_tx, mut ping_rx) = mpsc::unbounded_channel::<()>();
    let uri = serve_once(move |mut ws| async move {
        while let Some(Ok(message)) = ws.next().await {
            if message.is_ping() {
                let _ = ping_tx.send(());
            }
        }
    })
    .await;

    let options = SocketOptions {
        ping_interval: Some(Duration::from_millis(50)),
        ..SocketOptions::default()
    };
    let client = SocketClient::new(&uri, options).unwrap();
    let (handler, mut rx) = recorder();
    client.connect(handler).unwrap();
    assert_eq!(next(&mut rx).await, Seen::Open(101));

    for _ in 0..2 {
        tokio::time::timeout(Duration::from_secs(5), ping_rx.recv())
            .await
            .expect("ping within 5s")
            .expect("server still reading");
    }
}

#[tokio::test]
async fn close_during_handshake_never_opens() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        // Keep the client in Connecting long enough to close it there.
        tokio::time::sleep(Duration::from_millis(300)).await;
        let ws = accept_async(stream).await.unwrap();
        drain(ws).await;
    });

    let client = SocketClient::new(&format!("ws://{addr}/"), SocketOptions::default()).unwrap();
    let (handler, mut rx) = recorder();
    let task = client.connect(handler).unwrap();

    assert_eq!(client.state(), ConnectionState::Connecting);
    client.close("changed my mind");
    assert_eq!(client.state(), ConnectionState::Closing);
    assert!(matches!(
        client.send_text("ls"),
        Err(SocketError::NotConnected)
    ));

    assert_eq!(
        next(&mut rx).await,
        Seen::Close(CLOSE_NORMAL, "changed my mind".into(), false)
    );
    task.await.unwrap();
    assert_eq!(client.state(), ConnectionState::Closed);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn server_ping_is_answered() {
    let (pong_tx, mut pong_rx) = mpsc::unbounded_channel::<Vec<u8>>();
    let uri = serve_once(move |mut ws| async move {
        ws.send(Message::Ping(b"hb".to_vec().into())).await.unwrap();
        while let Some(Ok(message)) = ws.next().await {
            if let Message::Pong(data) = message {
                let _ = pong_tx.send(data.to_vec());
            }
        }
    })
    .await;

    let client = SocketClient::new(&uri, SocketOptions::default()).unwrap();
    let (handler, mut rx) = recorder();
    client.connect(handler).unwrap();
    assert_eq!(next(&mut rx).await, Seen::Open(101));

    let pong = tokio::time::timeout(Duration::from_secs(5), pong_rx.recv())
        .await
        .expect("pong within 5s")
        .expect("server still reading");
    assert_eq!(pong, b"hb".to_vec());
    // Control frames never reach the handler.
    assert!(rx.try_recv().is_err());
}

#![cfg(feature = "ws")]
#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    reason = "Do not need additional syntax for setting up tests, and https://github.com/rust-lang/rust-clippy/issues/13981"
)]
#![allow(
    unused,
    reason = "Not every test binary uses every helper"
)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt as _, StreamExt as _};
use listen_moe_client::ws::Event;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Clone, Debug)]
enum Command {
    Text(String),
    Close(u16, String),
    /// End the TCP stream without a close frame.
    Drop,
}

/// Mock gateway. Every accepted connection gets every command sent after it was accepted.
pub struct MockWsServer {
    addr: SocketAddr,
    command_tx: broadcast::Sender<Command>,
    /// Text frames written by clients, in arrival order
    received_rx: mpsc::UnboundedReceiver<String>,
    /// One unit per accepted connection
    accepted_rx: mpsc::UnboundedReceiver<()>,
}

impl MockWsServer {
    /// Start a mock WebSocket server on a random port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (command_tx, _) = broadcast::channel::<Command>(100);
        let (received_tx, received_rx) = mpsc::unbounded_channel::<String>();
        let (accepted_tx, accepted_rx) = mpsc::unbounded_channel::<()>();

        let commands = command_tx.clone();

        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };

                let Ok(ws_stream) = tokio_tungstenite::accept_async(stream).await else {
                    continue;
                };

                let (mut write, mut read) = ws_stream.split();
                let received_tx = received_tx.clone();
                let mut command_rx = commands.subscribe();
                drop(accepted_tx.send(()));

                tokio::spawn(async move {
                    loop {
                        tokio::select! {
                            msg = read.next() => {
                                match msg {
                                    Some(Ok(Message::Text(text))) => {
                                        drop(received_tx.send(text.to_string()));
                                    }
                                    Some(Ok(_)) => {}
                                    _ => break,
                                }
                            }
                            command = command_rx.recv() => {
                                match command {
                                    Ok(Command::Text(text)) => {
                                        if write.send(Message::Text(text.into())).await.is_err() {
                                            break;
                                        }
                                    }
                                    Ok(Command::Close(code, reason)) => {
                                        let frame = CloseFrame {
                                            code: CloseCode::from(code),
                                            reason: reason.into(),
                                        };
                                        drop(write.send(Message::Close(Some(frame))).await);
                                        break;
                                    }
                                    Ok(Command::Drop) => break,
                                    Err(_) => break,
                                }
                            }
                        }
                    }
                });
            }
        });

        Self {
            addr,
            command_tx,
            received_rx,
            accepted_rx,
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/gateway", self.addr)
    }

    /// Send a text frame to all connected clients.
    pub fn send(&self, frame: &Value) {
        drop(self.command_tx.send(Command::Text(frame.to_string())));
    }

    /// Send raw text, e.g. invalid JSON.
    pub fn send_raw(&self, text: &str) {
        drop(self.command_tx.send(Command::Text(text.to_owned())));
    }

    /// Close every connected client with `code`.
    pub fn close(&self, code: u16, reason: &str) {
        drop(
            self.command_tx
                .send(Command::Close(code, reason.to_owned())),
        );
    }

    /// Drop every connected socket without a close handshake.
    pub fn drop_connections(&self) {
        drop(self.command_tx.send(Command::Drop));
    }

    /// Wait until a client connects.
    pub async fn accepted(&mut self) {
        timeout(RECV_TIMEOUT, self.accepted_rx.recv())
            .await
            .expect("client did not connect in time")
            .unwrap();
    }

    /// Receive the next text frame written by a client.
    pub async fn recv(&mut self) -> Option<String> {
        timeout(RECV_TIMEOUT, self.received_rx.recv())
            .await
            .ok()
            .flatten()
    }
}

/// Handler that forwards every event into a channel.
pub fn channel_handler() -> (
    impl Fn(Event) -> std::future::Ready<()> + Send + Sync + 'static,
    mpsc::UnboundedReceiver<Event>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handler = move |event: Event| {
        drop(tx.send(event));
        std::future::ready(())
    };
    (handler, rx)
}

pub async fn recv_event(rx: &mut mpsc::UnboundedReceiver<Event>) -> Event {
    timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("no event dispatched in time")
        .unwrap()
}

#[must_use]
pub fn hello(heartbeat_ms: u64) -> Value {
    json!({ "op": 0, "d": { "heartbeat": heartbeat_ms } })
}

#[must_use]
pub fn track_update(title: &str) -> Value {
    json!({
        "op": 1,
        "t": "TRACK_UPDATE",
        "d": {
            "song": {
                "title": title,
                "albums": [],
                "sources": [],
                "artists": [{ "id": 1, "name": "A", "nameRomaji": "A", "image": null }]
            }
        }
    })
}

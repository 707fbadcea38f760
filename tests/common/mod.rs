//! Mock cable server for integration tests.
//!
//! Listens on an ephemeral localhost port, accepts one WebSocket client,
//! sends `welcome`, then plays out a [`Behaviour`].

#![allow(dead_code, reason = "each test binary uses a subset of the helpers")]

use std::sync::Once;
use std::time::Duration;

use cable_client::{Command, Frame};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

/// Channel the event behaviour answers for.
pub const AGENT_CHANNEL: &str = "AgentChannel";

static INIT: Once = Once::new();

/// Route `log` output through the test harness once per binary.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// What the server does after `welcome`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    /// Nothing more; hold the connection open.
    Connect,
    /// Four pings, 100ms apart.
    Heartbeat,
    /// Answer a subscribe to [`AGENT_CHANNEL`] with one event
    /// carrying `{"foo":"bar"}`.
    Event,
    /// Close the connection right after `welcome`.
    Hangup,
}

/// Running mock server.
#[derive(Debug)]
pub struct MockCableServer {
    /// `ws://` address to dial.
    pub address: String,
    /// Commands received from the client, in order.
    pub commands: mpsc::UnboundedReceiver<Command>,
    handle: JoinHandle<()>,
}

impl MockCableServer {
    /// Bind and start serving one client.
    pub async fn start(behaviour: Behaviour) -> Self {
        init_logging();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (commands_tx, commands) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            let (mut write, mut read) = ws.split();

            write.send(text(&Frame::welcome())).await.unwrap();

            match behaviour {
                Behaviour::Connect | Behaviour::Event => {}
                Behaviour::Heartbeat => {
                    let mut ticker = tokio::time::interval(Duration::from_millis(100));
                    ticker.tick().await;
                    for i in 1..=4 {
                        ticker.tick().await;
                        write.send(text(&Frame::ping(i))).await.unwrap();
                    }
                }
                Behaviour::Hangup => {
                    let _ = write.send(Message::Close(None)).await;
                    return;
                }
            }

            // Keep reading until the client goes away.
            while let Some(Ok(msg)) = read.next().await {
                let Message::Text(body) = msg else {
                    continue;
                };
                let Ok(cmd) = serde_json::from_str::<Command>(&body) else {
                    continue;
                };

                if behaviour == Behaviour::Event
                    && cmd.command == "subscribe"
                    && cmd.channel() == AGENT_CHANNEL
                {
                    let event = Frame::event(
                        "event",
                        AGENT_CHANNEL,
                        serde_json::json!({ "foo": "bar" }),
                    );
                    let _ = write.send(text(&event)).await;
                }
                let _ = commands_tx.send(cmd);
            }
        });

        Self {
            address: format!("ws://{addr}/cable"),
            commands,
            handle,
        }
    }

    /// Stop the server task.
    pub fn stop(self) {
        self.handle.abort();
    }
}

fn text(frame: &Frame) -> Message {
    Message::Text(frame.encode().unwrap().into())
}

/// Await `rx.recv()` with a deadline.
pub async fn recv_within<T>(rx: &mut mpsc::UnboundedReceiver<T>, wait: Duration) -> T {
    tokio::time::timeout(wait, rx.recv())
        .await
        .expect("timed out")
        .expect("channel closed")
}

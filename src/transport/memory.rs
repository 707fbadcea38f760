//! In-process transport backed by tokio channels.
//!
//! [`MemoryConnector::new`] returns the connector together with a
//! [`MemoryServer`]. Every successful dial shows up on the server as a
//! [`MemoryPeer`], which plays the cable server for that connection: it
//! receives the client's commands and pushes frames, read errors, or an end
//! of stream at the client.
//!
//! ```ignore
//! let (connector, mut server) = MemoryConnector::new();
//! let mut client = Client::new("memory://cable").with_connector(connector);
//! client.serve().await?;
//!
//! let peer = server.accept().await.unwrap();
//! peer.send_frame(&Frame::welcome())?;
//! ```

// Rust guideline compliant 2026-02

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{Connector, FrameSink, FrameSource, TransportPair};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::protocol::{Command, Frame};

type Inbound = Result<String, ClientError>;

/// Connector that hands each dialed connection to a [`MemoryServer`].
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    accept_tx: mpsc::UnboundedSender<MemoryPeer>,
    refuse: Arc<Mutex<Option<String>>>,
}

/// Accepts connections dialed through the paired [`MemoryConnector`].
#[derive(Debug)]
pub struct MemoryServer {
    accept_rx: mpsc::UnboundedReceiver<MemoryPeer>,
}

/// Server end of one in-memory connection.
#[derive(Debug)]
pub struct MemoryPeer {
    address: String,
    to_client: mpsc::UnboundedSender<Inbound>,
    from_client: mpsc::UnboundedReceiver<String>,
}

/// Client write half.
#[derive(Debug)]
pub struct MemorySink {
    tx: Option<mpsc::UnboundedSender<String>>,
}

/// Client read half.
#[derive(Debug)]
pub struct MemorySource {
    rx: mpsc::UnboundedReceiver<Inbound>,
}

impl MemoryConnector {
    /// Create a connector and the server that accepts its connections.
    #[must_use]
    pub fn new() -> (Self, MemoryServer) {
        let (accept_tx, accept_rx) = mpsc::unbounded_channel();
        let connector = Self {
            accept_tx,
            refuse: Arc::new(Mutex::new(None)),
        };
        (connector, MemoryServer { accept_rx })
    }

    /// Make subsequent dials fail with `reason` (`None` accepts again).
    pub fn refuse(&self, reason: Option<&str>) {
        if let Ok(mut refuse) = self.refuse.lock() {
            *refuse = reason.map(str::to_string);
        }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(
        &self,
        address: &str,
        _config: &ClientConfig,
    ) -> Result<TransportPair, ClientError> {
        let refused = self.refuse.lock().ok().and_then(|r| r.clone());
        if let Some(reason) = refused {
            return Err(ClientError::Connect(reason));
        }

        let (to_client, client_rx) = mpsc::unbounded_channel();
        let (client_tx, from_client) = mpsc::unbounded_channel();

        let peer = MemoryPeer {
            address: address.to_string(),
            to_client,
            from_client,
        };
        if self.accept_tx.send(peer).is_err() {
            return Err(ClientError::Connect(format!(
                "no memory server listening for {address}"
            )));
        }

        Ok((
            Box::new(MemorySink {
                tx: Some(client_tx),
            }),
            Box::new(MemorySource { rx: client_rx }),
        ))
    }
}

impl MemoryServer {
    /// Wait for the next dialed connection.
    pub async fn accept(&mut self) -> Option<MemoryPeer> {
        self.accept_rx.recv().await
    }
}

impl MemoryPeer {
    /// Address the client dialed.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Push raw text at the client.
    pub fn send_text(&self, text: impl Into<String>) -> Result<(), ClientError> {
        self.to_client
            .send(Ok(text.into()))
            .map_err(|e| ClientError::Write(format!("client went away: {e}")))
    }

    /// Push an encoded frame at the client.
    pub fn send_frame(&self, frame: &Frame) -> Result<(), ClientError> {
        self.send_text(frame.encode()?)
    }

    /// Make the client's next read fail with `error`.
    pub fn send_error(&self, error: ClientError) -> Result<(), ClientError> {
        self.to_client
            .send(Err(error))
            .map_err(|e| ClientError::Write(format!("client went away: {e}")))
    }

    /// Wait for the next raw text the client wrote. `None` once the client
    /// closed its write side.
    pub async fn recv_text(&mut self) -> Option<String> {
        self.from_client.recv().await
    }

    /// Wait for the next command the client wrote.
    pub async fn recv_command(&mut self) -> Option<Result<Command, ClientError>> {
        let text = self.recv_text().await?;
        Some(serde_json::from_str(&text).map_err(ClientError::from))
    }

    /// End the stream towards the client.
    pub fn close(self) {
        drop(self);
    }
}

#[async_trait]
impl FrameSink for MemorySink {
    async fn send_text(&mut self, text: &str) -> Result<(), ClientError> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| ClientError::Write("memory sink is closed".into()))?;
        tx.send(text.to_string())
            .map_err(|e| ClientError::Write(format!("memory peer went away: {e}")))
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        self.tx = None;
        Ok(())
    }
}

#[async_trait]
impl FrameSource for MemorySource {
    async fn receive(&mut self) -> Option<Result<String, ClientError>> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dial_reaches_server() {
        let (connector, mut server) = MemoryConnector::new();
        let (mut sink, mut source) = connector
            .connect("memory://cable", &ClientConfig::default())
            .await
            .unwrap();

        let mut peer = server.accept().await.unwrap();
        assert_eq!(peer.address(), "memory://cable");

        sink.send_text("hello").await.unwrap();
        assert_eq!(peer.recv_text().await.as_deref(), Some("hello"));

        peer.send_text("world").unwrap();
        assert_eq!(source.receive().await, Some(Ok("world".to_string())));

        peer.close();
        assert_eq!(source.receive().await, None);
    }

    #[tokio::test]
    async fn test_refused_dial_is_connect_error() {
        let (connector, _server) = MemoryConnector::new();
        connector.refuse(Some("connection refused"));

        let result = connector.connect("memory://cable", &ClientConfig::default()).await;
        assert!(matches!(result, Err(ClientError::Connect(msg)) if msg == "connection refused"));
    }

    #[tokio::test]
    async fn test_dial_without_server_is_connect_error() {
        let (connector, server) = MemoryConnector::new();
        drop(server);

        let result = connector.connect("memory://cable", &ClientConfig::default()).await;
        assert!(matches!(result, Err(ClientError::Connect(_))));
    }

    #[tokio::test]
    async fn test_closed_sink_rejects_writes() {
        let (connector, mut server) = MemoryConnector::new();
        let (mut sink, _source) = connector
            .connect("memory://cable", &ClientConfig::default())
            .await
            .unwrap();
        let mut peer = server.accept().await.unwrap();

        sink.close().await.unwrap();
        assert!(matches!(sink.send_text("late").await, Err(ClientError::Write(_))));
        assert_eq!(peer.recv_text().await, None);
    }
}

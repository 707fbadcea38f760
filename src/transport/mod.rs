//! Transport seam.
//!
//! The client never touches sockets directly. A [`Connector`] dials an
//! address and hands back a split pair: a [`FrameSink`] for outbound text
//! (shared behind the client's write guard) and a [`FrameSource`] for inbound
//! text (owned by the decode loop, its only reader).
//!
//! Two implementations ship with the crate:
//!
//! - [`ws::WsConnector`] - WebSocket via `tokio-tungstenite`
//! - [`memory::MemoryConnector`] - in-process channels, driven by tests

// Rust guideline compliant 2026-02

pub mod memory;
pub mod ws;

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Write half of a transport connection.
#[async_trait]
pub trait FrameSink: Send + std::fmt::Debug {
    /// Send one text message.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Write`] if the connection can no longer be
    /// written to.
    async fn send_text(&mut self, text: &str) -> Result<(), ClientError>;

    /// Close the write side.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Write`] if the close could not be sent.
    async fn close(&mut self) -> Result<(), ClientError>;
}

/// Read half of a transport connection.
#[async_trait]
pub trait FrameSource: Send + std::fmt::Debug {
    /// Receive the next text message, `None` once the peer has ended the
    /// stream. A read failure is returned as `Some(Err(ClientError::Read))`
    /// and does not end the stream by itself.
    async fn receive(&mut self) -> Option<Result<String, ClientError>>;
}

/// A dialed connection, split into its two halves.
pub type TransportPair = (Box<dyn FrameSink>, Box<dyn FrameSource>);

/// Dials cable servers.
#[async_trait]
pub trait Connector: Send + Sync + std::fmt::Debug {
    /// Open a connection to `address`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connect`] if the address is invalid or the
    /// handshake fails.
    async fn connect(&self, address: &str, config: &ClientConfig)
        -> Result<TransportPair, ClientError>;
}

//! Live connection handle passed to callbacks.

// Rust guideline compliant 2026-02

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::ClientError;
use crate::protocol::Command;
use crate::transport::FrameSink;

/// Cloneable handle to the write side of a serving connection.
///
/// Every write goes through one mutex, so concurrent commands never
/// interleave on the wire. The read side is owned by the decode loop and is
/// not reachable from here.
#[derive(Clone)]
pub struct Connection {
    address: Arc<str>,
    writer: Arc<Mutex<Box<dyn FrameSink>>>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Connection {
    pub(crate) fn new(address: &str, sink: Box<dyn FrameSink>) -> Self {
        Self {
            address: Arc::from(address),
            writer: Arc::new(Mutex::new(sink)),
        }
    }

    /// Address this connection was dialed with.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Write one command under the write guard.
    pub async fn send(&self, command: &Command) -> Result<(), ClientError> {
        let text = command.encode()?;
        let mut writer = self.writer.lock().await;
        writer.send_text(&text).await?;
        log::debug!(
            "[Cable] Sent {} for {}",
            command.command,
            command.channel()
        );
        Ok(())
    }

    /// Subscribe to `channel`.
    pub async fn subscribe(&self, channel: &str) -> Result<(), ClientError> {
        self.send(&Command::subscribe(channel)).await
    }

    /// Cancel the subscription to `channel`.
    pub async fn unsubscribe(&self, channel: &str) -> Result<(), ClientError> {
        self.send(&Command::unsubscribe(channel)).await
    }

    /// Invoke `action` on `channel` with `data` merged into the payload.
    pub async fn perform(
        &self,
        channel: &str,
        action: &str,
        data: serde_json::Value,
    ) -> Result<(), ClientError> {
        self.send(&Command::perform(channel, action, data)).await
    }

    pub(crate) async fn close(&self) -> Result<(), ClientError> {
        self.writer.lock().await.close().await
    }
}

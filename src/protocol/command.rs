//! Outbound control commands.
//!
//! ```text
//! {"command":"subscribe","identifier":"{\"channel\":\"AgentChannel\"}"}
//! {"command":"message","identifier":"...","data":"{\"action\":\"speak\",\"text\":\"hi\"}"}
//! ```

// Rust guideline compliant 2026-02

use serde::{Deserialize, Serialize};

use super::identifier::ChannelIdentifier;
use crate::error::ClientError;

/// Command kind for subscribing to a channel.
pub const SUBSCRIBE: &str = "subscribe";
/// Command kind for cancelling a subscription.
pub const UNSUBSCRIBE: &str = "unsubscribe";
/// Command kind for invoking a channel action.
pub const MESSAGE: &str = "message";

/// A control frame sent from client to server.
///
/// Built once per call and not retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Command kind (`subscribe`, `unsubscribe`, `message`, ...).
    pub command: String,
    /// Target channel.
    pub identifier: ChannelIdentifier,
    /// Optional payload, omitted from the wire when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Command {
    /// Build a command of an arbitrary kind for `channel`.
    pub fn new(kind: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            command: kind.into(),
            identifier: ChannelIdentifier::new(channel),
            data: None,
        }
    }

    /// `subscribe` command for `channel`.
    pub fn subscribe(channel: impl Into<String>) -> Self {
        Self::new(SUBSCRIBE, channel)
    }

    /// `unsubscribe` command for `channel`.
    pub fn unsubscribe(channel: impl Into<String>) -> Self {
        Self::new(UNSUBSCRIBE, channel)
    }

    /// `message` command invoking `action` on `channel`.
    ///
    /// The server expects `data` as a JSON *string* holding the action name
    /// merged with the caller's fields. Non-object `data` contributes nothing.
    pub fn perform(channel: impl Into<String>, action: &str, data: serde_json::Value) -> Self {
        let mut data_obj = serde_json::json!({ "action": action });
        if let serde_json::Value::Object(map) = data {
            for (k, v) in map {
                data_obj[&k] = v;
            }
        }
        Self::new(MESSAGE, channel).with_data(serde_json::Value::String(data_obj.to_string()))
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Channel this command targets.
    #[must_use]
    pub fn channel(&self) -> &str {
        self.identifier.channel()
    }

    /// Serialize to the text sent over the transport.
    pub fn encode(&self) -> Result<String, ClientError> {
        serde_json::to_string(self).map_err(|e| {
            ClientError::Write(format!("failed to encode {} command: {e}", self.command))
        })
    }
}

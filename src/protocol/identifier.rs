//! Channel identifier codec.
//!
//! The cable protocol carries the channel identifier as a JSON object that has
//! been serialized to text and then embedded as a *string* field, so on the
//! wire it is encoded twice:
//!
//! ```text
//! {"command":"subscribe","identifier":"{\"channel\":\"AgentChannel\"}"}
//!                                     └──── string holding an object ────┘
//! ```
//!
//! [`ChannelIdentifier`] implements `Serialize`/`Deserialize` with both layers,
//! so frames and commands can embed it directly.

// Rust guideline compliant 2026-02

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ClientError;

/// Identifies the logical channel a subscription or data frame belongs to.
///
/// Equality is by channel name. Extra identifier parameters sent by a server
/// are ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelIdentifier {
    channel: String,
}

/// The object nested inside the identifier string.
#[derive(Debug, Serialize, Deserialize)]
struct InnerIdentifier {
    channel: String,
}

impl ChannelIdentifier {
    /// Create an identifier for `channel`.
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }

    /// The channel name.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The inner layer: `{"channel":"<name>"}`.
    #[must_use]
    pub fn inner_json(&self) -> String {
        serde_json::json!({ "channel": self.channel }).to_string()
    }

    /// Full wire form: the inner object serialized again as a JSON string.
    #[must_use]
    pub fn encode(&self) -> String {
        serde_json::Value::String(self.inner_json()).to_string()
    }

    /// Reverse [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Decode`] when `wire` is not a JSON string, when
    /// the string does not hold a JSON object, or when the object has no
    /// `channel` field.
    pub fn decode(wire: &str) -> Result<Self, ClientError> {
        let outer: String = serde_json::from_str(wire)?;
        Self::from_inner_json(&outer)
    }

    fn from_inner_json(inner: &str) -> Result<Self, ClientError> {
        let inner: InnerIdentifier = serde_json::from_str(inner)
            .map_err(|e| ClientError::Decode(format!("invalid channel identifier: {e}")))?;
        Ok(Self::new(inner.channel))
    }
}

impl std::fmt::Display for ChannelIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.channel)
    }
}

impl From<&str> for ChannelIdentifier {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ChannelIdentifier {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl Serialize for ChannelIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner_json())
    }
}

impl<'de> Deserialize<'de> for ChannelIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let inner = String::deserialize(deserializer)?;
        Self::from_inner_json(&inner).map_err(D::Error::custom)
    }
}

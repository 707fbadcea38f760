//! Inbound frame model.
//!
//! Every text message the server sends decodes into a [`Frame`]. Its `type`
//! tag decides which dispatch category it belongs to:
//!
//! | `type`        | Category            |
//! |---------------|---------------------|
//! | `welcome`     | connection ack      |
//! | `ping`        | liveness            |
//! | anything else | channel data        |
//!
//! Payload fields stay as raw JSON; consumers decode them through
//! [`Payload::data`] / [`Payload::message`].

// Rust guideline compliant 2026-02

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::identifier::ChannelIdentifier;
use crate::error::ClientError;

/// Type tag of the one-time connection-acknowledgement frame.
pub const WELCOME: &str = "welcome";
/// Type tag of the periodic liveness frame.
pub const PING: &str = "ping";

/// Dispatch category of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Handshake completed (`welcome`).
    ConnectAck,
    /// Connection is alive (`ping`).
    Liveness,
    /// Channel-scoped data (any other type, including none).
    ChannelData,
}

impl FrameKind {
    /// Classify a `type` tag.
    #[must_use]
    pub fn classify(frame_type: &str) -> Self {
        match frame_type {
            WELCOME => Self::ConnectAck,
            PING => Self::Liveness,
            _ => Self::ChannelData,
        }
    }
}

/// One decoded protocol message. Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    frame_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identifier: Option<ChannelIdentifier>,
}

impl Frame {
    /// A `welcome` frame.
    #[must_use]
    pub fn welcome() -> Self {
        Self::with_type(WELCOME)
    }

    /// A `ping` frame carrying a timestamp message, as servers send them.
    #[must_use]
    pub fn ping(timestamp: i64) -> Self {
        Self {
            message: Some(serde_json::Value::from(timestamp)),
            ..Self::with_type(PING)
        }
    }

    /// A channel-data frame for `channel` carrying `data`.
    pub fn event(
        frame_type: impl Into<String>,
        channel: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            data: Some(data),
            identifier: Some(ChannelIdentifier::new(channel)),
            ..Self::with_type(frame_type)
        }
    }

    /// A bare frame with only a `type` tag.
    pub fn with_type(frame_type: impl Into<String>) -> Self {
        Self {
            frame_type: Some(frame_type.into()),
            message: None,
            data: None,
            identifier: None,
        }
    }

    /// Attach an identifier.
    #[must_use]
    pub fn with_identifier(mut self, identifier: ChannelIdentifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Attach a `message` payload.
    #[must_use]
    pub fn with_message(mut self, message: serde_json::Value) -> Self {
        self.message = Some(message);
        self
    }

    /// Decode one transport message.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Decode`] for malformed JSON, a malformed
    /// identifier, or a channel-data frame that carries no identifier.
    pub fn decode(text: &str) -> Result<Self, ClientError> {
        let frame: Self = serde_json::from_str(text)?;
        if frame.kind() == FrameKind::ChannelData && frame.identifier.is_none() {
            return Err(ClientError::Decode(format!(
                "channel frame of type {:?} has no identifier",
                frame.frame_type()
            )));
        }
        Ok(frame)
    }

    /// Serialize to wire text.
    pub fn encode(&self) -> Result<String, ClientError> {
        serde_json::to_string(self).map_err(ClientError::from)
    }

    /// The `type` tag, empty when absent.
    #[must_use]
    pub fn frame_type(&self) -> &str {
        self.frame_type.as_deref().unwrap_or_default()
    }

    /// Dispatch category.
    #[must_use]
    pub fn kind(&self) -> FrameKind {
        FrameKind::classify(self.frame_type())
    }

    /// Channel identifier, present on channel-scoped frames.
    #[must_use]
    pub fn identifier(&self) -> Option<&ChannelIdentifier> {
        self.identifier.as_ref()
    }

    /// Raw `message` payload.
    #[must_use]
    pub fn raw_message(&self) -> Option<&serde_json::Value> {
        self.message.as_ref()
    }

    /// Raw `data` payload.
    #[must_use]
    pub fn raw_data(&self) -> Option<&serde_json::Value> {
        self.data.as_ref()
    }
}

/// What callbacks receive: the decoded frame, with typed accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    frame: Frame,
}

impl Payload {
    /// Wrap a frame.
    #[must_use]
    pub fn new(frame: Frame) -> Self {
        Self { frame }
    }

    /// The underlying frame.
    #[must_use]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Unwrap the underlying frame.
    #[must_use]
    pub fn into_frame(self) -> Frame {
        self.frame
    }

    /// Channel name of the frame, if it is channel-scoped.
    #[must_use]
    pub fn channel(&self) -> Option<&str> {
        self.frame.identifier().map(ChannelIdentifier::channel)
    }

    /// Decode the `data` field into `T`. An absent field decodes as `null`.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        decode_field(self.frame.data.as_ref())
    }

    /// Decode the `message` field into `T`. An absent field decodes as `null`.
    pub fn message<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        decode_field(self.frame.message.as_ref())
    }
}

fn decode_field<T: DeserializeOwned>(field: Option<&serde_json::Value>) -> Result<T, ClientError> {
    let value = field.cloned().unwrap_or(serde_json::Value::Null);
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_partition() {
        assert_eq!(FrameKind::classify("welcome"), FrameKind::ConnectAck);
        assert_eq!(FrameKind::classify("ping"), FrameKind::Liveness);
        for other in ["", "event", "confirm_subscription", "Welcome", "PING", "welcome "] {
            assert_eq!(FrameKind::classify(other), FrameKind::ChannelData, "{other:?}");
        }
    }

    #[test]
    fn test_decode_welcome() {
        let frame = Frame::decode(r#"{"type":"welcome"}"#).unwrap();
        assert_eq!(frame.kind(), FrameKind::ConnectAck);
        assert!(frame.identifier().is_none());
    }

    #[test]
    fn test_decode_ping_with_message() {
        let frame = Frame::decode(r#"{"type":"ping","message":1700000000}"#).unwrap();
        assert_eq!(frame.kind(), FrameKind::Liveness);
        assert_eq!(Payload::new(frame).message::<i64>().unwrap(), 1_700_000_000);
    }

    #[test]
    fn test_decode_channel_frame() {
        let text = r#"{"identifier":"{\"channel\":\"AgentChannel\"}","message":{"n":1}}"#;
        let frame = Frame::decode(text).unwrap();
        assert_eq!(frame.kind(), FrameKind::ChannelData);
        assert_eq!(frame.frame_type(), "");
        assert_eq!(frame.identifier().unwrap().channel(), "AgentChannel");
    }

    #[test]
    fn test_decode_null_type_is_channel_data() {
        let text = r#"{"type":null,"identifier":"{\"channel\":\"A\"}"}"#;
        assert_eq!(Frame::decode(text).unwrap().kind(), FrameKind::ChannelData);
    }

    #[test]
    fn test_channel_frame_requires_identifier() {
        let result = Frame::decode(r#"{"type":"event","data":{}}"#);
        assert!(matches!(result, Err(ClientError::Decode(_))));
    }

    #[test]
    fn test_welcome_tolerates_identifier() {
        let frame = Frame::welcome().with_identifier(ChannelIdentifier::new("AgentChannel"));
        let decoded = Frame::decode(&frame.encode().unwrap()).unwrap();
        assert_eq!(decoded.kind(), FrameKind::ConnectAck);
    }

    #[test]
    fn test_malformed_identifier_is_decode_error() {
        let result = Frame::decode(r#"{"type":"event","identifier":{"channel":"A"}}"#);
        assert!(matches!(result, Err(ClientError::Decode(_))));
    }

    #[test]
    fn test_payload_data_decodes_lazily() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Foo {
            foo: String,
        }

        let frame = Frame::event("event", "AgentChannel", serde_json::json!({ "foo": "bar" }));
        let payload = Payload::new(Frame::decode(&frame.encode().unwrap()).unwrap());

        assert_eq!(payload.channel(), Some("AgentChannel"));
        assert_eq!(payload.data::<Foo>().unwrap(), Foo { foo: "bar".into() });
        assert_eq!(
            payload.data::<serde_json::Value>().unwrap(),
            serde_json::json!({ "foo": "bar" })
        );
    }

    #[test]
    fn test_raw_fields_and_into_frame() {
        let frame = Frame::with_type("confirm_subscription")
            .with_identifier(ChannelIdentifier::new("AgentChannel"))
            .with_message(serde_json::json!({ "ok": true }));
        let decoded = Frame::decode(&frame.encode().unwrap()).unwrap();

        assert_eq!(decoded.raw_message(), Some(&serde_json::json!({ "ok": true })));
        assert!(decoded.raw_data().is_none());

        let payload = Payload::new(decoded);
        assert_eq!(payload.frame().frame_type(), "confirm_subscription");
        assert_eq!(payload.into_frame(), frame);
    }

    #[test]
    fn test_payload_absent_field_decodes_as_null() {
        let payload = Payload::new(Frame::welcome());
        assert_eq!(payload.data::<Option<String>>().unwrap(), None);
        assert!(payload.data::<String>().is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn only_welcome_and_ping_leave_channel_data(tag in "\\PC*") {
                let recognized = tag == WELCOME || tag == PING;
                prop_assert_eq!(FrameKind::classify(&tag) != FrameKind::ChannelData, recognized);
            }

            #[test]
            fn decoded_kind_follows_type_tag(
                tag in prop_oneof![Just(WELCOME.to_string()), Just(PING.to_string()), "\\PC*"],
            ) {
                let frame = Frame::with_type(tag.clone())
                    .with_identifier(ChannelIdentifier::new("AgentChannel"));
                let decoded = Frame::decode(&frame.encode().unwrap()).unwrap();
                prop_assert_eq!(decoded.kind(), FrameKind::classify(&tag));
                prop_assert_eq!(decoded.frame_type(), tag.as_str());
            }
        }
    }
}

//! Error type shared by every layer of the client.
//!
//! Failures are either returned synchronously to the immediate caller
//! (`Connect`, `Write`, `NotConnected`, `InvalidState`) or pushed onto the
//! error-reporting path by the decode loop (`Read`, `Decode`, `Closed`).
//! Nothing is retried.

// Rust guideline compliant 2026-02

/// Lifecycle state of a [`Client`](crate::Client).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Callbacks may be registered; not yet dialed.
    Constructed,
    /// Transport dialed, decode loop and dispatch tasks running.
    Serving,
    /// Shutdown signaled. Terminal.
    Closed,
}

impl std::fmt::Display for ClientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constructed => write!(f, "constructed"),
            Self::Serving => write!(f, "serving"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Errors that can occur while talking to a cable server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Failed to dial the transport.
    Connect(String),
    /// Transport read failed.
    Read(String),
    /// A frame or channel identifier could not be decoded.
    Decode(String),
    /// Failed to write a command to the transport.
    Write(String),
    /// The peer ended the stream.
    Closed,
    /// A write was attempted before `serve()` succeeded.
    NotConnected,
    /// A lifecycle call was made from a state that does not allow it.
    InvalidState {
        /// The rejected operation.
        operation: &'static str,
        /// The state the client was in.
        state: ClientState,
    },
}

impl ClientError {
    pub(crate) fn invalid_state(operation: &'static str, state: ClientState) -> Self {
        Self::InvalidState { operation, state }
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect(msg) => write!(f, "Connection failed: {msg}"),
            Self::Read(msg) => write!(f, "Read failed: {msg}"),
            Self::Decode(msg) => write!(f, "Decode error: {msg}"),
            Self::Write(msg) => write!(f, "Write failed: {msg}"),
            Self::Closed => write!(f, "Connection closed by peer"),
            Self::NotConnected => write!(f, "Client is not connected"),
            Self::InvalidState { operation, state } => {
                write!(f, "Cannot {operation} while client is {state}")
            }
        }
    }
}

impl std::error::Error for ClientError {}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_display() {
        let err = ClientError::invalid_state("serve", ClientState::Serving);
        assert_eq!(err.to_string(), "Cannot serve while client is serving");
    }

    #[test]
    fn test_serde_error_maps_to_decode() {
        let err: ClientError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}

//! Cable wire protocol: identifiers, outbound commands, inbound frames.
//!
//! # Wire format
//!
//! ```text
//! client → server   {"command": "subscribe"|"unsubscribe"|"message",
//!                    "identifier": "<double-encoded channel object>",
//!                    "data"?: ...}
//!
//! server → client   {"type": "welcome"|"ping"|<other>,
//!                    "message"?: ..., "data"?: ...,
//!                    "identifier"?: "<double-encoded channel object>"}
//! ```

// Rust guideline compliant 2026-02

pub mod command;
pub mod frame;
pub mod identifier;

pub use command::Command;
pub use frame::{Frame, FrameKind, Payload};
pub use identifier::ChannelIdentifier;

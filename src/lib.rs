//! Cable client - ActionCable-style pub/sub over one long-lived connection.
//!
//! A [`Client`] dials a cable server, sends subscribe/unsubscribe commands
//! tagged with double-encoded channel identifiers, and fans inbound frames
//! out to per-category callbacks.
//!
//! # Architecture
//!
//! ```text
//!   transport ──► decode loop ──► DispatchHub ──► dispatch task ──► callback
//!   (FrameSource)  (classify)     (one slot per     (one per
//!                                  category)        registration)
//!
//!   caller ──► Command ──► write guard ──► transport (FrameSink)
//! ```
//!
//! # Modules
//!
//! - [`protocol`] - channel identifier codec, commands, frames
//! - [`hub`] - unbuffered handoff slots and the shutdown broadcast
//! - [`client`] - registration, lifecycle, decode loop, dispatch tasks
//! - [`transport`] - transport traits plus WebSocket and in-memory impls
//! - [`config`] - transport configuration

// Rust guideline compliant 2026-02

pub mod client;
pub mod config;
pub mod error;
pub mod hub;
pub mod protocol;
pub mod transport;

// Re-export commonly used types
pub use client::{Client, Connection};
pub use config::ClientConfig;
pub use error::{ClientError, ClientState};
pub use hub::DispatchHub;
pub use protocol::{ChannelIdentifier, Command, Frame, FrameKind, Payload};

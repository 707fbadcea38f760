//! Dispatch hub: fan-out point between the decode loop and callback tasks.
//!
//! # Architecture
//!
//! ```text
//!                    ┌──────────── DispatchHub ────────────┐
//!   decode loop ───► │ connect   (welcome)   ──► on_connect   │
//!                    │ heartbeat (ping)      ──► on_heartbeat │
//!                    │ event     (other)     ──► on_event(s)  │
//!                    │ error     (reported)  ──► on_error     │
//!                    │ shutdown  (broadcast) ──► every task   │
//!                    └─────────────────────────────────────┘
//! ```
//!
//! # Delivery contract
//!
//! Every category slot is an unbuffered [`Slot`]: a routed frame is taken by
//! exactly one waiting consumer, and the decode loop waits until that happens.
//! Registering two callbacks on one category splits frames between them
//! rather than duplicating them. A category with no consumer drops frames.
//!
//! Shutdown is a [`CancellationToken`]: firing it wakes every waiting task at
//! once and it stays fired.

// Rust guideline compliant 2026-02

pub mod slot;

use tokio_util::sync::CancellationToken;

use crate::error::ClientError;
use crate::protocol::{Frame, FrameKind};

pub use slot::{Slot, SlotReceiver};

/// Per-client set of handoff slots plus the shutdown broadcast.
#[derive(Debug)]
pub struct DispatchHub {
    connect: Slot<Frame>,
    heartbeat: Slot<Frame>,
    event: Slot<Frame>,
    error: Slot<ClientError>,
    shutdown: CancellationToken,
}

impl Default for DispatchHub {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchHub {
    /// Create a hub with empty slots and an unfired shutdown signal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connect: Slot::new("connect"),
            heartbeat: Slot::new("heartbeat"),
            event: Slot::new("event"),
            error: Slot::new("error"),
            shutdown: CancellationToken::new(),
        }
    }

    /// Slot serving frames of `kind`.
    #[must_use]
    pub fn slot(&self, kind: FrameKind) -> &Slot<Frame> {
        match kind {
            FrameKind::ConnectAck => &self.connect,
            FrameKind::Liveness => &self.heartbeat,
            FrameKind::ChannelData => &self.event,
        }
    }

    /// Slot serving reported errors.
    #[must_use]
    pub fn errors(&self) -> &Slot<ClientError> {
        &self.error
    }

    /// Hand `frame` to a consumer of its category.
    ///
    /// Returns the frame back when the category has no consumer.
    pub async fn route(&self, frame: Frame) -> Result<(), Frame> {
        let slot = self.slot(frame.kind());
        log::debug!(
            "[Cable] Routing {:?} frame to {} slot",
            frame.frame_type(),
            slot.name()
        );
        slot.deliver(frame).await
    }

    /// Push an error onto the error-reporting path.
    ///
    /// Without an error consumer the error is logged and dropped.
    pub async fn report(&self, error: ClientError) {
        if let Err(error) = self.error.deliver(error).await {
            log::warn!("[Cable] {}", error);
        }
    }

    /// Fire the shutdown broadcast. Returns `false` if it had already fired.
    pub fn shutdown(&self) -> bool {
        if self.shutdown.is_cancelled() {
            return false;
        }
        self.shutdown.cancel();
        true
    }

    /// Whether shutdown has fired.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Clone of the shutdown token for tasks to await.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

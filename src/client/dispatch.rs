//! Dispatch task bodies.
//!
//! Each registered callback becomes one task. Looping tasks select between
//! their hub slot and the shutdown token, biased towards shutdown so no
//! callback fires once the client is closed.

// Rust guideline compliant 2026-02

use std::future::Future;

use futures_util::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use super::connection::Connection;
use crate::hub::SlotReceiver;
use crate::protocol::Frame;

/// What a task is handed when the client starts serving.
#[derive(Debug, Clone)]
pub(crate) struct TaskContext {
    pub(crate) conn: Connection,
    pub(crate) shutdown: CancellationToken,
}

/// A registered callback, waiting for `serve()` to start it.
pub(crate) type DispatchTask = Box<dyn FnOnce(TaskContext) -> BoxFuture<'static, ()> + Send>;

/// Take items from `rx` until shutdown, handing each to `handle`.
///
/// `handle` returns `None` to skip an item without invoking the callback.
pub(crate) async fn run_slot_loop<T, F, Fut>(
    label: &'static str,
    rx: SlotReceiver<T>,
    ctx: TaskContext,
    mut handle: F,
) where
    F: FnMut(Connection, T) -> Option<Fut>,
    Fut: Future<Output = anyhow::Result<()>>,
{
    log::debug!("[Cable] {} task started", label);
    loop {
        let item = tokio::select! {
            biased;
            () = ctx.shutdown.cancelled() => break,
            item = rx.recv() => match item {
                Some(item) => item,
                None => break,
            },
        };

        if let Some(callback) = handle(ctx.conn.clone(), item) {
            log_failure(label, callback.await);
        }
    }
    log::debug!("[Cable] {} task stopped", label);
}

/// Skip frames for other channels.
pub(crate) fn is_for_channel(frame: &Frame, channel: &str) -> bool {
    frame
        .identifier()
        .is_some_and(|identifier| identifier.channel() == channel)
}

pub(crate) fn log_failure(label: &str, result: anyhow::Result<()>) {
    if let Err(e) = result {
        log::warn!("[Cable] {} callback failed: {:#}", label, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ChannelIdentifier;

    #[test]
    fn test_is_for_channel() {
        let frame = Frame::event("event", "A", serde_json::json!({}));
        assert!(is_for_channel(&frame, "A"));
        assert!(!is_for_channel(&frame, "B"));

        let confirm = Frame::with_type("confirm_subscription")
            .with_identifier(ChannelIdentifier::new("B"));
        assert!(!is_for_channel(&confirm, "A"));
        assert!(!is_for_channel(&Frame::welcome(), "A"));
    }
}

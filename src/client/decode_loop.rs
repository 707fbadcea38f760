//! The single reader task.
//!
//! Pulls text off the transport, decodes it into a [`Frame`], and hands it to
//! the hub slot for its category. Each iteration:
//!
//! ```text
//! receive ─┬─ text ──► Frame::decode ─┬─ ok  ──► hub.route (waits for a taker)
//!          │                          └─ err ──► hub.report, continue
//!          ├─ read error ──────────────────────► hub.report, continue
//!          └─ end of stream ───────────────────► hub.report(Closed), stop
//! ```
//!
//! Every wait also races the shutdown token, so the loop stops reading once
//! the client is closed.

// Rust guideline compliant 2026-02

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::ClientError;
use crate::hub::DispatchHub;
use crate::protocol::Frame;
use crate::transport::FrameSource;

/// Run until shutdown or end of stream.
pub(crate) async fn run(mut source: Box<dyn FrameSource>, hub: Arc<DispatchHub>) {
    let shutdown = hub.shutdown_token();
    log::debug!("[Cable] Decode loop started");

    loop {
        let Some(received) = until_shutdown(&shutdown, source.receive()).await else {
            log::debug!("[Cable] Decode loop stopping on shutdown");
            return;
        };

        let text = match received {
            Some(Ok(text)) => text,
            Some(Err(e)) => {
                if until_shutdown(&shutdown, hub.report(e)).await.is_none() {
                    return;
                }
                continue;
            }
            None => {
                log::info!("[Cable] Stream ended by peer, decode loop exiting");
                until_shutdown(&shutdown, hub.report(ClientError::Closed)).await;
                return;
            }
        };

        let frame = match Frame::decode(&text) {
            Ok(frame) => frame,
            Err(e) => {
                log::debug!(
                    "[Cable] Undecodable frame: {}",
                    text.chars().take(100).collect::<String>()
                );
                if until_shutdown(&shutdown, hub.report(e)).await.is_none() {
                    return;
                }
                continue;
            }
        };

        match until_shutdown(&shutdown, hub.route(frame)).await {
            None => return,
            Some(Ok(())) => {}
            Some(Err(dropped)) => {
                log::trace!(
                    "[Cable] No consumer for {:?} frame, dropping",
                    dropped.frame_type()
                );
            }
        }
    }
}

/// Drive `fut` unless shutdown fires first.
async fn until_shutdown<F: Future>(shutdown: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        () = shutdown.cancelled() => None,
        out = fut => Some(out),
    }
}

//! Unbuffered single-consumer handoff slot.
//!
//! A [`Slot`] hands one item at a time from a producer to whichever
//! [`SlotReceiver`] is waiting. [`Slot::deliver`] does not return until a
//! receiver has taken the item, so a slow receiver stalls the producer and
//! nothing queues up behind it.
//!
//! When several receivers wait on the same slot, exactly one of them takes a
//! given item. This is delivery to a single consumer, not multicast.

// Rust guideline compliant 2026-02

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Mutex};

/// An item in flight together with the acknowledgement the taker fires.
#[derive(Debug)]
struct Handoff<T> {
    item: T,
    taken: oneshot::Sender<()>,
}

/// Producer side of a handoff slot.
#[derive(Debug)]
pub struct Slot<T> {
    name: &'static str,
    /// Serializes producers so the buffered handoff is always the caller's own.
    send_lock: Mutex<()>,
    tx: mpsc::Sender<Handoff<T>>,
    rx: Arc<Mutex<mpsc::Receiver<Handoff<T>>>>,
    consumers: Arc<AtomicUsize>,
}

/// Consumer side of a handoff slot. Dropping it unregisters the consumer.
#[derive(Debug)]
pub struct SlotReceiver<T> {
    name: &'static str,
    rx: Arc<Mutex<mpsc::Receiver<Handoff<T>>>>,
    consumers: Arc<AtomicUsize>,
}

impl<T> Slot<T> {
    /// Create an empty slot. `name` appears in log lines.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        // Capacity 1 holds the single in-flight handoff; the producer waits
        // for its acknowledgement before offering another.
        let (tx, rx) = mpsc::channel(1);
        Self {
            name,
            send_lock: Mutex::new(()),
            tx,
            rx: Arc::new(Mutex::new(rx)),
            consumers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Slot name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register a consumer.
    #[must_use]
    pub fn receiver(&self) -> SlotReceiver<T> {
        self.consumers.fetch_add(1, Ordering::SeqCst);
        SlotReceiver {
            name: self.name,
            rx: Arc::clone(&self.rx),
            consumers: Arc::clone(&self.consumers),
        }
    }

    /// Number of registered consumers.
    #[must_use]
    pub fn consumer_count(&self) -> usize {
        self.consumers.load(Ordering::SeqCst)
    }

    /// Hand `item` to one waiting consumer, waiting until it is taken.
    ///
    /// Returns the item back when no consumer is registered, since none can
    /// ever take it. There is no timeout: if consumers exist but none is
    /// receiving, this waits until one is.
    ///
    /// Dropping the returned future before a consumer takes the item
    /// withdraws it, so a consumer that starts receiving later never sees it.
    pub async fn deliver(&self, item: T) -> Result<(), T> {
        if self.consumer_count() == 0 {
            return Err(item);
        }

        let _producer = self.send_lock.lock().await;
        let (taken, taken_rx) = oneshot::channel();
        if let Err(mpsc::error::SendError(handoff)) = self.tx.send(Handoff { item, taken }).await {
            return Err(handoff.item);
        }

        let mut withdraw = Withdraw {
            name: self.name,
            rx: &self.rx,
            armed: true,
        };
        // The receiver half lives as long as the slot, so the handoff is only
        // dropped unacknowledged when the slot itself goes away.
        if taken_rx.await.is_err() {
            log::trace!("[Cable] {} slot dropped an in-flight item", self.name);
        }
        withdraw.armed = false;
        Ok(())
    }
}

/// Pulls an untaken handoff back out of the buffer when `deliver` is
/// cancelled mid-flight.
///
/// If a consumer holds the receiver lock it is already waiting on the buffer
/// and takes the item as part of the cancelled delivery.
struct Withdraw<'a, T> {
    name: &'static str,
    rx: &'a Mutex<mpsc::Receiver<Handoff<T>>>,
    armed: bool,
}

impl<T> Drop for Withdraw<'_, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Ok(mut rx) = self.rx.try_lock() {
            if rx.try_recv().is_ok() {
                log::trace!("[Cable] {} slot withdrew an untaken item", self.name);
            }
        }
    }
}

impl<T> SlotReceiver<T> {
    /// Wait for the next item. Cancel safe: an item is never lost when the
    /// returned future is dropped before completion.
    pub async fn recv(&self) -> Option<T> {
        let mut rx = self.rx.lock().await;
        let handoff = rx.recv().await?;
        let _ = handoff.taken.send(());
        Some(handoff.item)
    }

    /// Slot name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Drop for SlotReceiver<T> {
    fn drop(&mut self) {
        self.consumers.fetch_sub(1, Ordering::SeqCst);
    }
}

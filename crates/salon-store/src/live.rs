//! Live query subscription handle.
//!
//! A subscription is a cancellable asynchronous stream producer: a
//! background task pushes events into an mpsc channel and watches a cancel
//! flag.  Consumers drain with [`Subscription::next`]; after
//! [`Subscription::cancel`] no further event is delivered, including events
//! already buffered in the channel.

use serde_json::Value;
use tokio::sync::{mpsc, watch};

/// One delivery on a live query channel.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// A full refreshed ordered snapshot of the watched query.
    Snapshot(Vec<Value>),
    /// The subscription failed.  Terminal: the producer stops after
    /// sending this and no automatic retry is attempted.
    Error(String),
}

/// Consumer handle for a live query.
pub struct Subscription {
    rx: mpsc::Receiver<WatchEvent>,
    cancel_tx: watch::Sender<bool>,
    cancelled: bool,
}

impl Subscription {
    pub(crate) fn new(rx: mpsc::Receiver<WatchEvent>, cancel_tx: watch::Sender<bool>) -> Self {
        Self {
            rx,
            cancel_tx,
            cancelled: false,
        }
    }

    /// Await the next event.  Returns `None` once the producer has stopped
    /// or the subscription was cancelled; buffered events are dropped after
    /// cancellation rather than delivered.
    pub async fn next(&mut self) -> Option<WatchEvent> {
        if self.cancelled {
            return None;
        }
        self.rx.recv().await
    }

    /// Cancel the subscription.  Signals the producer to stop and release
    /// the remote channel; idempotent.
    pub fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        let _ = self.cancel_tx.send(true);
        self.rx.close();
    }

    /// Whether `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Producer-side endpoints for a new subscription.
pub(crate) struct SubscriptionProducer {
    pub tx: mpsc::Sender<WatchEvent>,
    pub cancel_rx: watch::Receiver<bool>,
}

/// Build a subscription pair with the given channel capacity.
pub(crate) fn channel(capacity: usize) -> (SubscriptionProducer, Subscription) {
    let (tx, rx) = mpsc::channel(capacity);
    let (cancel_tx, cancel_rx) = watch::channel(false);
    (
        SubscriptionProducer { tx, cancel_rx },
        Subscription::new(rx, cancel_tx),
    )
}

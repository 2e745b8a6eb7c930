//! Bounded-channel notification dispatcher.
//!
//! The request path enqueues through the sync `Notifier` port and
//! returns immediately; a background worker drains the queue into a
//! `NotificationSink`. A full queue drops the notification with a
//! warning rather than blocking the request, and delivery failures are
//! logged and swallowed, so dispatch never participates in the primary
//! verdict.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::ports::{Notification, NotificationSink, Notifier};

/// Queue depth before notifications are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Fire-and-forget notifier backed by a bounded channel and a worker
/// task.
pub struct ChannelNotifier {
    tx: mpsc::Sender<Notification>,
}

impl ChannelNotifier {
    /// Spawns the delivery worker and returns the notifier plus the
    /// worker handle (held by the caller for shutdown).
    pub fn spawn(sink: Arc<dyn NotificationSink>) -> (Self, JoinHandle<()>) {
        Self::spawn_with_capacity(sink, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn spawn_with_capacity(
        sink: Arc<dyn NotificationSink>,
        capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Notification>(capacity);

        let worker = tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                if let Err(err) = sink.deliver(&notification).await {
                    warn!(error = %err, "notification delivery failed");
                } else {
                    debug!("notification delivered");
                }
            }
        });

        (Self { tx }, worker)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if let Err(err) = self.tx.try_send(notification) {
            // Backpressure policy: drop rather than block the request.
            warn!(error = %err, "notification queue full, dropping");
        }
    }
}

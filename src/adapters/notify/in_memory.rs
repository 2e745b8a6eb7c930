//! In-memory notification sink for tests and local development.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{Notification, NotificationSink, NotifyError};

/// Capturing sink; optionally failing or stalling to exercise the
/// dispatcher's error and backpressure paths.
#[derive(Default)]
pub struct InMemoryNotificationSink {
    delivered: Mutex<Vec<Notification>>,
    failures: AtomicU32,
    fail_all: bool,
    stall: bool,
}

impl InMemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every delivery.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// A sink that never finishes a delivery.
    pub fn stalled() -> Self {
        Self {
            stall: true,
            ..Self::default()
        }
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.stall {
            std::future::pending::<()>().await;
        }
        if self.fail_all {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(NotifyError::Rejected("sink configured to fail".to_string()));
        }
        self.delivered.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

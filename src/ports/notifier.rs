//! Notification ports.
//!
//! `Notifier` is the fire-and-forget handle the request path uses; it
//! never blocks and never fails the caller. `NotificationSink` is the
//! delivery side a background worker drains into.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{PaymentId, UserId};
use crate::domain::referral::CommissionType;

/// Transactional notifications emitted by the settlement flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A payment settled; the payer gets a receipt.
    PaymentCompleted {
        payment_id: PaymentId,
        user_id: UserId,
        amount: f64,
        currency: String,
    },

    /// A commission row was recorded for a referrer.
    CommissionEarned {
        affiliate_id: UserId,
        kind: CommissionType,
        amount: f64,
        currency: String,
    },
}

/// Fire-and-forget notification handle for the request path.
///
/// Implementations must swallow every failure; notification delivery
/// never participates in the primary success/failure verdict.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Delivery side consumed by the background dispatcher.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Errors from notification delivery. Always logged, never propagated.
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("notification transport error: {0}")]
    Transport(String),

    #[error("notification rejected: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifier_is_object_safe() {
        fn _accepts_dyn(_n: &dyn Notifier) {}
        fn _accepts_sink(_s: &dyn NotificationSink) {}
    }
}

//! Payment-specific error types.

use thiserror::Error;

use super::record::PaymentStatus;

/// Errors raised by the payment aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// Attempted a status transition outside the one-directional
    /// pending -> completed / pending -> failed machine.
    #[error("invalid payment transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },
}

impl PaymentError {
    pub fn invalid_transition(from: PaymentStatus, to: PaymentStatus) -> Self {
        PaymentError::InvalidTransition { from, to }
    }
}

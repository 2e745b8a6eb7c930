//! Payment repository port.

use async_trait::async_trait;
use chrono::Duration;

use crate::domain::foundation::{PaymentId, StoreError, Timestamp, UserId};
use crate::domain::payment::PaymentRecord;

/// Repository port for the payment ledger.
///
/// The provider reference carries a uniqueness constraint; `insert` must
/// surface a violation as `StoreError::DuplicateReference` so the
/// locator can recover from synthesis races by re-querying.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Exact lookup by external transaction reference.
    async fn find_by_reference(&self, reference: &str)
        -> Result<Option<PaymentRecord>, StoreError>;

    /// Most recent pending payment owned by the user created within the
    /// trailing window.
    async fn find_recent_pending_for_user(
        &self,
        user_id: &UserId,
        window: Duration,
    ) -> Result<Option<PaymentRecord>, StoreError>;

    /// Backfills the provider reference on an adopted payment.
    async fn set_provider_reference(
        &self,
        id: &PaymentId,
        reference: &str,
    ) -> Result<(), StoreError>;

    /// Inserts a new record; duplicate provider references must map to
    /// `StoreError::DuplicateReference`.
    async fn insert(&self, record: &PaymentRecord) -> Result<(), StoreError>;

    /// Persists the pending -> completed transition.
    async fn mark_completed(&self, id: &PaymentId, paid_at: Timestamp) -> Result<(), StoreError>;

    /// Persists the pending -> failed transition.
    async fn mark_failed(&self, id: &PaymentId) -> Result<(), StoreError>;

    /// Binds a resolved account to a guest payment.
    async fn bind_user(&self, id: &PaymentId, user_id: &UserId) -> Result<(), StoreError>;
}

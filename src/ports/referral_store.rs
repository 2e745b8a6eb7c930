//! Referral store port.
//!
//! The referral subsystem owns these tables; the core reads referrals
//! for a paid user, appends commission rows, and marks referrals
//! completed.

use async_trait::async_trait;

use crate::domain::foundation::{CommissionId, ReferralId, StoreError, UserId};
use crate::domain::referral::{CommissionDraft, ReferralRecord};

/// Port into the referral subsystem's store.
#[async_trait]
pub trait ReferralStore: Send + Sync {
    /// The most recent pending or completed referral where the given
    /// user is the referred party.
    async fn latest_for_referred(
        &self,
        referred_id: &UserId,
    ) -> Result<Option<ReferralRecord>, StoreError>;

    /// Appends one commission ledger row. Rows are independent; the
    /// store never merges or deduplicates them.
    async fn create_commission(&self, draft: &CommissionDraft)
        -> Result<CommissionId, StoreError>;

    /// Marks a referral completed.
    async fn complete_referral(&self, id: &ReferralId) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referral_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn ReferralStore) {}
    }
}

//! Commission attribution engine.
//!
//! Runs after membership provisioning, only when the paid user was
//! referred. Selects a base commission from the link-type/member-type
//! matrix, appends the cascading flat bonuses, notifies the referrer
//! per recorded row, and marks the referral completed. Individual row
//! failures never block the remaining rows.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::foundation::{PackageId, StoreError, UserId};
use crate::domain::membership::MemberType;
use crate::domain::payment::PaymentRecord;
use crate::domain::referral::{CommissionDraft, CommissionType, ReferralRecord};
use crate::ports::{MembershipStore, Notification, Notifier, ReferralStore};

/// Flat-bonus amounts appended on top of base commissions.
#[derive(Debug, Clone)]
pub struct CommissionPolicy {
    /// Fixed bonus alongside an `affiliate_referral` base commission.
    pub affiliate_upgrade_bonus: f64,

    /// Fixed bonus when a DCS link produced a `learner_referral` base.
    pub dcs_addon_bonus: f64,

    /// Currency of both flat bonuses, independent of the base
    /// commission's currency.
    pub bonus_currency: String,
}

impl Default for CommissionPolicy {
    fn default() -> Self {
        Self {
            affiliate_upgrade_bonus: 10_000.0,
            dcs_addon_bonus: 5_000.0,
            bonus_currency: "NGN".to_string(),
        }
    }
}

/// Command to attribute commissions for a settled payment.
#[derive(Debug, Clone)]
pub struct AttributeCommissionsCommand {
    /// The paid (referred) user.
    pub user_id: UserId,
    pub payment: PaymentRecord,
}

/// What attribution recorded.
#[derive(Debug, Clone, Default)]
pub struct AttributeCommissionsResult {
    pub rows_created: u32,
    pub referral_completed: bool,
}

/// Errors aborting attribution before any row is attempted.
#[derive(Debug, Error)]
pub enum AttributionError {
    #[error("membership package {0} not found")]
    PackageNotFound(PackageId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Handler appending referral commission ledger rows.
pub struct AttributeCommissionsHandler {
    referrals: Arc<dyn ReferralStore>,
    memberships: Arc<dyn MembershipStore>,
    notifier: Arc<dyn Notifier>,
    policy: CommissionPolicy,
}

impl AttributeCommissionsHandler {
    pub fn new(
        referrals: Arc<dyn ReferralStore>,
        memberships: Arc<dyn MembershipStore>,
        notifier: Arc<dyn Notifier>,
        policy: CommissionPolicy,
    ) -> Self {
        Self {
            referrals,
            memberships,
            notifier,
            policy,
        }
    }

    pub async fn handle(
        &self,
        cmd: AttributeCommissionsCommand,
    ) -> Result<AttributeCommissionsResult, AttributionError> {
        let referral = match self.referrals.latest_for_referred(&cmd.user_id).await? {
            Some(referral) => referral,
            None => return Ok(AttributeCommissionsResult::default()),
        };

        let package = self
            .memberships
            .find_package(&cmd.payment.package_id)
            .await?
            .ok_or(AttributionError::PackageNotFound(cmd.payment.package_id))?;

        let base_kind = match (referral.link_type.is_bonus_eligible(), package.member_type) {
            (true, MemberType::Affiliate) => Some(CommissionType::AffiliateReferral),
            (_, MemberType::Learner) => Some(CommissionType::LearnerReferral),
            (false, MemberType::Affiliate) => None,
        };

        let mut result = AttributeCommissionsResult::default();

        if let Some(kind) = base_kind {
            let base = CommissionDraft::rated(
                referral.referrer_id,
                referral.id,
                cmd.payment.id,
                kind,
                package.referral_rate,
                cmd.payment.amount,
                cmd.payment.currency.clone(),
            );
            result.rows_created += self.record(&referral, base).await;

            for bonus in self.bonuses(&referral, &cmd, kind) {
                result.rows_created += self.record(&referral, bonus).await;
            }
        }

        // Completion runs after every row attempt, recorded or not.
        match self.referrals.complete_referral(&referral.id).await {
            Ok(()) => result.referral_completed = true,
            Err(err) => {
                warn!(referral_id = %referral.id, error = %err, "referral completion failed");
            }
        }

        Ok(result)
    }

    /// The cascading flat bonuses unlocked by the base commission.
    fn bonuses(
        &self,
        referral: &ReferralRecord,
        cmd: &AttributeCommissionsCommand,
        base_kind: CommissionType,
    ) -> Vec<CommissionDraft> {
        let mut bonuses = Vec::new();
        if base_kind == CommissionType::AffiliateReferral {
            bonuses.push(CommissionDraft::flat_bonus(
                referral.referrer_id,
                referral.id,
                cmd.payment.id,
                CommissionType::AffiliateUpgradeBonus,
                self.policy.affiliate_upgrade_bonus,
                self.policy.bonus_currency.clone(),
                "affiliate upgrade bonus",
            ));
        }
        if referral.link_type.is_bonus_eligible() && base_kind == CommissionType::LearnerReferral {
            bonuses.push(CommissionDraft::flat_bonus(
                referral.referrer_id,
                referral.id,
                cmd.payment.id,
                CommissionType::DcsAddonBonus,
                self.policy.dcs_addon_bonus,
                self.policy.bonus_currency.clone(),
                "dcs addon bonus",
            ));
        }
        bonuses
    }

    /// Appends one ledger row, notifying the referrer on success.
    /// Returns 1 when recorded so callers can count rows.
    async fn record(&self, referral: &ReferralRecord, draft: CommissionDraft) -> u32 {
        match self.referrals.create_commission(&draft).await {
            Ok(commission_id) => {
                info!(
                    commission_id = %commission_id,
                    referrer_id = %referral.referrer_id,
                    kind = draft.kind.as_str(),
                    amount = draft.amount,
                    "commission recorded"
                );
                self.notifier.notify(Notification::CommissionEarned {
                    affiliate_id: draft.affiliate_id,
                    kind: draft.kind,
                    amount: draft.amount,
                    currency: draft.currency,
                });
                1
            }
            Err(err) => {
                warn!(
                    referrer_id = %referral.referrer_id,
                    kind = draft.kind.as_str(),
                    error = %err,
                    "commission row failed, continuing"
                );
                0
            }
        }
    }
}

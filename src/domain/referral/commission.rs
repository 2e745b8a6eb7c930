//! Commission ledger entries.
//!
//! Commission rows are independent, append-only entries; one payment can
//! produce several (a base commission plus flat bonuses). The core never
//! merges or deduplicates them.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PaymentId, ReferralId, UserId};

/// The enumerated commission kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionType {
    /// Base commission: DCS link referred an affiliate-tier purchase.
    AffiliateReferral,
    /// Base commission: any link referred a learner-tier purchase.
    LearnerReferral,
    /// Fixed bonus appended alongside an affiliate referral.
    AffiliateUpgradeBonus,
    /// Fixed bonus appended when a DCS link produced a learner referral.
    DcsAddonBonus,
}

impl CommissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommissionType::AffiliateReferral => "affiliate_referral",
            CommissionType::LearnerReferral => "learner_referral",
            CommissionType::AffiliateUpgradeBonus => "affiliate_upgrade_bonus",
            CommissionType::DcsAddonBonus => "dcs_addon_bonus",
        }
    }

    pub fn is_flat_bonus(&self) -> bool {
        matches!(
            self,
            CommissionType::AffiliateUpgradeBonus | CommissionType::DcsAddonBonus
        )
    }
}

/// Commission settlement lifecycle, owned by the referral subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    Pending,
    Available,
    Paid,
    Cancelled,
}

impl CommissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommissionStatus::Pending => "pending",
            CommissionStatus::Available => "available",
            CommissionStatus::Paid => "paid",
            CommissionStatus::Cancelled => "cancelled",
        }
    }
}

/// A commission row to be appended to the referral subsystem's ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionDraft {
    /// The referrer earning this commission.
    pub affiliate_id: UserId,
    pub referral_id: Option<ReferralId>,
    pub payment_id: Option<PaymentId>,
    pub kind: CommissionType,

    /// Commission amount in `currency`.
    pub amount: f64,
    pub currency: String,

    /// Rate applied to the base amount; zero for flat bonuses.
    pub rate: f64,
    pub base_amount: f64,
    pub base_currency: String,

    pub status: CommissionStatus,
    pub notes: Option<String>,
}

impl CommissionDraft {
    /// Base commission computed from a package rate and payment amount.
    pub fn rated(
        affiliate_id: UserId,
        referral_id: ReferralId,
        payment_id: PaymentId,
        kind: CommissionType,
        rate: f64,
        base_amount: f64,
        base_currency: impl Into<String>,
    ) -> Self {
        let currency = base_currency.into();
        Self {
            affiliate_id,
            referral_id: Some(referral_id),
            payment_id: Some(payment_id),
            kind,
            amount: rate * base_amount,
            currency: currency.clone(),
            rate,
            base_amount,
            base_currency: currency,
            status: CommissionStatus::Pending,
            notes: None,
        }
    }

    /// Flat bonus row with a fixed amount and currency, independent of
    /// the base commission's currency.
    pub fn flat_bonus(
        affiliate_id: UserId,
        referral_id: ReferralId,
        payment_id: PaymentId,
        kind: CommissionType,
        amount: f64,
        currency: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        let currency = currency.into();
        Self {
            affiliate_id,
            referral_id: Some(referral_id),
            payment_id: Some(payment_id),
            kind,
            amount,
            currency: currency.clone(),
            rate: 0.0,
            base_amount: amount,
            base_currency: currency,
            status: CommissionStatus::Pending,
            notes: Some(notes.into()),
        }
    }
}

//! Referral record read from the referral subsystem.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ReferralId, Timestamp, UserId};

/// Distinguishes a plain referral link from the bonus-eligible DCS link
/// that unlocks extra flat bonus commissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferralLinkType {
    Plain,
    Dcs,
}

impl ReferralLinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferralLinkType::Plain => "plain",
            ReferralLinkType::Dcs => "dcs",
        }
    }

    /// DCS links are the bonus-eligible variant.
    pub fn is_bonus_eligible(&self) -> bool {
        matches!(self, ReferralLinkType::Dcs)
    }
}

/// Referral lifecycle; the core only writes the `Completed` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferralStatus {
    Pending,
    Completed,
    Expired,
}

impl ReferralStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferralStatus::Pending => "pending",
            ReferralStatus::Completed => "completed",
            ReferralStatus::Expired => "expired",
        }
    }
}

/// A referrer/referred pair as recorded by the referral subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralRecord {
    pub id: ReferralId,
    pub referrer_id: UserId,
    pub referred_id: UserId,
    pub link_type: ReferralLinkType,
    pub status: ReferralStatus,
    pub created_at: Timestamp,
}

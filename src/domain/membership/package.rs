//! Membership package catalog entry.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::PackageId;

/// Tier of member a package provisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberType {
    Learner,
    Affiliate,
}

impl MemberType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberType::Learner => "learner",
            MemberType::Affiliate => "affiliate",
        }
    }
}

/// Catalog entry describing what a membership payment buys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipPackage {
    pub id: PackageId,
    pub name: String,
    pub member_type: MemberType,

    /// Membership term length; expiry = start + this many calendar months.
    pub duration_months: u32,

    /// Referral commission rate applied to the payment amount
    /// (e.g. 0.3 for 30%).
    pub referral_rate: f64,
}

impl MembershipPackage {
    /// Affiliate packages grant lifetime access and promote the buyer's
    /// profile role.
    pub fn is_affiliate(&self) -> bool {
        self.member_type == MemberType::Affiliate
    }
}

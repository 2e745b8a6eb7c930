//! Referral records and commission ledger types.
//!
//! Referral and commission rows belong to the referral subsystem; this
//! core reads referrals, appends commission rows, and writes the
//! referral completion transition.

mod commission;
mod record;

pub use commission::{CommissionDraft, CommissionStatus, CommissionType};
pub use record::{ReferralLinkType, ReferralRecord, ReferralStatus};

//! Shared building blocks used across the domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::StoreError;
pub use ids::{CommissionId, MembershipId, PackageId, PaymentId, ReferralId, UserId};
pub use timestamp::Timestamp;

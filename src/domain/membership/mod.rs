//! Membership entitlements and packages.

mod package;
mod record;

pub use package::{MemberType, MembershipPackage};
pub use record::MembershipRecord;

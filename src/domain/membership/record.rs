//! Membership entitlement record.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MembershipId, PackageId, PaymentId, Timestamp, UserId};

use super::package::MembershipPackage;

/// A user's membership entitlement, owned by this core for the duration
/// of provisioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub id: MembershipId,
    pub user_id: UserId,
    pub package_id: PackageId,

    /// Payment that provisioned this membership.
    pub payment_id: PaymentId,

    pub starts_at: Timestamp,
    pub expires_at: Timestamp,

    pub active: bool,

    /// Addon capability flag; addon-upgrade payments set this on the
    /// existing active record instead of inserting a new row.
    pub addon: bool,

    /// Set for affiliate packages only; the entitlement does not expire
    /// on the normal term schedule.
    pub lifetime_access: bool,
}

impl MembershipRecord {
    /// Provisions a fresh membership from a completed payment.
    ///
    /// Expiry is `starts_at + package.duration_months` calendar months.
    pub fn provision(
        user_id: UserId,
        package: &MembershipPackage,
        payment_id: PaymentId,
        starts_at: Timestamp,
        addon: bool,
    ) -> Self {
        Self {
            id: MembershipId::new(),
            user_id,
            package_id: package.id,
            payment_id,
            starts_at,
            expires_at: starts_at.add_months(package.duration_months),
            active: true,
            addon,
            lifetime_access: package.is_affiliate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::membership::MemberType;

    fn package(member_type: MemberType, months: u32) -> MembershipPackage {
        MembershipPackage {
            id: PackageId::new(),
            name: "Standard".to_string(),
            member_type,
            duration_months: months,
            referral_rate: 0.2,
        }
    }

    #[test]
    fn provision_computes_expiry_from_duration() {
        let start = Timestamp::parse_rfc3339("2024-03-15T00:00:00Z").unwrap();
        let pkg = package(MemberType::Learner, 6);
        let m = MembershipRecord::provision(UserId::new(), &pkg, PaymentId::new(), start, false);

        assert_eq!(m.expires_at, start.add_months(6));
        assert!(m.active);
        assert!(!m.addon);
        assert!(!m.lifetime_access);
    }

    #[test]
    fn affiliate_package_grants_lifetime_access() {
        let pkg = package(MemberType::Affiliate, 12);
        let m = MembershipRecord::provision(
            UserId::new(),
            &pkg,
            PaymentId::new(),
            Timestamp::now(),
            false,
        );
        assert!(m.lifetime_access);
    }
}

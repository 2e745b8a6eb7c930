//! Membership store port.

use async_trait::async_trait;

use crate::domain::foundation::{MembershipId, PackageId, StoreError, UserId};
use crate::domain::membership::{MembershipPackage, MembershipRecord};

/// Store port for membership entitlements and the package catalog.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Catalog lookup for a membership package.
    async fn find_package(&self, id: &PackageId) -> Result<Option<MembershipPackage>, StoreError>;

    /// The user's currently-active membership, if any.
    async fn find_active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<MembershipRecord>, StoreError>;

    /// Inserts a freshly provisioned membership row.
    async fn insert(&self, record: &MembershipRecord) -> Result<(), StoreError>;

    /// Sets the addon capability flag on an existing membership.
    async fn set_addon_flag(&self, id: &MembershipId) -> Result<(), StoreError>;
}

//! Membership provisioner.
//!
//! Turns a completed payment into an entitlement: either flips the
//! addon flag on the user's active membership, or inserts a fresh
//! membership row with expiry computed from the package duration.
//! Affiliate packages additionally promote the payer's profile role.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::domain::foundation::{MembershipId, PackageId, StoreError, Timestamp, UserId};
use crate::domain::membership::MembershipRecord;
use crate::domain::payment::PaymentRecord;
use crate::ports::{AccountError, AccountService, MembershipStore};

/// Command to provision the entitlement for a completed payment.
#[derive(Debug, Clone)]
pub struct ProvisionMembershipCommand {
    pub payment: PaymentRecord,

    /// Resolved owner; may differ from `payment.user_id` when account
    /// resolution just bound a guest payer.
    pub user_id: UserId,

    /// Addon hint from the gateway metadata. Consulted only when the
    /// payment record itself carries no addon information, since
    /// gateway metadata is not guaranteed to survive the round trip.
    pub gateway_addon_hint: bool,
}

/// What provisioning did.
#[derive(Debug, Clone)]
pub enum ProvisionMembershipResult {
    /// Existing active membership extended with the addon capability.
    AddonUpgraded { membership_id: MembershipId },

    /// Fresh membership inserted.
    Provisioned {
        membership_id: MembershipId,
        lifetime_access: bool,
    },
}

/// Errors from provisioning. The caller logs these and keeps the
/// payment completed; a provisioning failure is an operational alert,
/// not a user-facing one.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("membership package {0} not found")]
    PackageNotFound(PackageId),

    #[error("no active membership to upgrade for user {0}")]
    NoActiveMembership(UserId),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Account(#[from] AccountError),
}

/// Handler provisioning memberships from completed payments.
pub struct ProvisionMembershipHandler {
    memberships: Arc<dyn MembershipStore>,
    accounts: Arc<dyn AccountService>,
}

impl ProvisionMembershipHandler {
    pub fn new(memberships: Arc<dyn MembershipStore>, accounts: Arc<dyn AccountService>) -> Self {
        Self {
            memberships,
            accounts,
        }
    }

    pub async fn handle(
        &self,
        cmd: ProvisionMembershipCommand,
    ) -> Result<ProvisionMembershipResult, ProvisionError> {
        // Record metadata takes precedence over the gateway hint.
        let addon = if cmd.payment.has_addon_metadata() {
            cmd.payment.is_addon_upgrade()
        } else {
            cmd.gateway_addon_hint
        };

        if addon {
            return self.upgrade_addon(&cmd).await;
        }
        self.provision_new(&cmd, false).await
    }

    /// Addon upgrade mutates the active row; no new row, no expiry
    /// recompute.
    async fn upgrade_addon(
        &self,
        cmd: &ProvisionMembershipCommand,
    ) -> Result<ProvisionMembershipResult, ProvisionError> {
        let active = self
            .memberships
            .find_active_for_user(&cmd.user_id)
            .await?
            .ok_or(ProvisionError::NoActiveMembership(cmd.user_id))?;

        self.memberships.set_addon_flag(&active.id).await?;
        info!(membership_id = %active.id, user_id = %cmd.user_id, "addon capability enabled");

        Ok(ProvisionMembershipResult::AddonUpgraded {
            membership_id: active.id,
        })
    }

    async fn provision_new(
        &self,
        cmd: &ProvisionMembershipCommand,
        addon: bool,
    ) -> Result<ProvisionMembershipResult, ProvisionError> {
        let package = self
            .memberships
            .find_package(&cmd.payment.package_id)
            .await?
            .ok_or(ProvisionError::PackageNotFound(cmd.payment.package_id))?;

        let record = MembershipRecord::provision(
            cmd.user_id,
            &package,
            cmd.payment.id,
            Timestamp::now(),
            addon,
        );
        self.memberships.insert(&record).await?;

        if package.is_affiliate() {
            self.accounts.promote_to_affiliate(&cmd.user_id).await?;
            info!(user_id = %cmd.user_id, "payer promoted to affiliate");
        }

        info!(
            membership_id = %record.id,
            user_id = %cmd.user_id,
            package = %package.name,
            "membership provisioned"
        );

        Ok(ProvisionMembershipResult::Provisioned {
            membership_id: record.id,
            lifetime_access: record.lifetime_access,
        })
    }
}

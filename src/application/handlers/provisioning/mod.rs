//! Post-completion provisioning: account resolution for guest payers
//! and membership creation/upgrade.

mod provision_membership;
mod resolve_account;

pub use provision_membership::{
    ProvisionError, ProvisionMembershipCommand, ProvisionMembershipHandler,
    ProvisionMembershipResult,
};
pub use resolve_account::{
    ResolveAccountCommand, ResolveAccountError, ResolveAccountHandler, ResolveAccountResult,
};

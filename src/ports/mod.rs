//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the settlement core and the outside world. Adapters implement them.
//!
//! ## Gateway Ports
//!
//! - `GatewayClient` - Per-provider transaction verification
//!
//! ## Store Ports
//!
//! - `PaymentRepository` - Payment ledger persistence
//! - `MembershipStore` - Membership entitlements and package catalog
//! - `ReferralStore` - Referral reads and commission appends (owned by
//!   the referral subsystem; this core only consumes the interface)
//!
//! ## Collaborator Ports (excluded subsystems)
//!
//! - `AccountService` - Account lookup/creation and magic-link dispatch
//! - `Notifier` / `NotificationSink` - Best-effort transactional
//!   notifications

mod account_service;
mod gateway_client;
mod membership_store;
mod notifier;
mod payment_repository;
mod referral_store;

pub use account_service::{AccountError, AccountService, MagicLinkRequest};
pub use gateway_client::{GatewayClient, GatewayError};
pub use membership_store::MembershipStore;
pub use notifier::{Notification, NotificationSink, Notifier, NotifyError};
pub use payment_repository::PaymentRepository;
pub use referral_store::ReferralStore;

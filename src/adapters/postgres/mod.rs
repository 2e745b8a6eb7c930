//! PostgreSQL implementations of the store ports.

mod membership_store;
mod payment_repository;
mod referral_store;

pub use membership_store::PostgresMembershipStore;
pub use payment_repository::PostgresPaymentRepository;
pub use referral_store::PostgresReferralStore;

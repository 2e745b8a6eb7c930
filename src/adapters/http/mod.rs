//! HTTP adapters - REST API implementations.

pub mod verification;

pub use verification::{verification_router, VerificationAppState};

//! Domain layer: value objects, aggregates, and domain errors.

pub mod foundation;
pub mod gateway;
pub mod membership;
pub mod payment;
pub mod referral;

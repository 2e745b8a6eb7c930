//! Command handlers, grouped by flow.
//!
//! `verification` owns the inbound verify-payment request end to end;
//! `provisioning` and `commissions` are the post-completion stages it
//! fans out into.

pub mod commissions;
pub mod provisioning;
pub mod verification;

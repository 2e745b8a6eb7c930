//! MemberPay - Payment Settlement Core
//!
//! This crate settles gateway payments against the internal ledger and
//! fans out the consequences of a confirmed payment: membership
//! provisioning and multi-tier referral commission attribution.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

//! Adapters - Implementations of ports against real infrastructure.

pub mod accounts;
pub mod gateways;
pub mod http;
pub mod notify;
pub mod postgres;

//! Application layer: command handlers orchestrating domain logic
//! through the ports.

pub mod handlers;

//! Accounts collaborator adapters.

mod http_client;

pub use http_client::{AccountsConfig, HttpAccountService};

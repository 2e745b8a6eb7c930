//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `MEMBERPAY` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use memberpay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod accounts;
mod commissions;
mod database;
mod error;
mod gateways;
mod notify;
mod server;

pub use accounts::AccountsServiceConfig;
pub use commissions::CommissionsConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use gateways::{GatewaySection, GatewaysConfig};
pub use notify::NotifyConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Payment gateway credentials (Paystack, Flutterwave)
    #[serde(default)]
    pub gateways: GatewaysConfig,

    /// Accounts service (user lookup, magic links)
    #[serde(default)]
    pub accounts: AccountsServiceConfig,

    /// Outbound notification dispatch
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Commission policy overrides
    #[serde(default)]
    pub commissions: CommissionsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads a `.env` file if present, then reads environment variables
    /// with the `MEMBERPAY` prefix. `__` separates nested values:
    ///
    /// - `MEMBERPAY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `MEMBERPAY__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("MEMBERPAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.gateways.validate()?;
        self.accounts.validate()?;
        self.notify.validate()?;
        self.commissions.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

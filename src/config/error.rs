//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid Paystack secret key format")]
    InvalidPaystackKey,

    #[error("Invalid Flutterwave secret key format")]
    InvalidFlutterwaveKey,

    #[error("Service URL must use http or https: {0}")]
    InvalidServiceUrl(&'static str),

    #[error("Commission bonus amounts must not be negative")]
    NegativeBonusAmount,

    #[error("Notification queue capacity must be greater than zero")]
    InvalidQueueCapacity,
}

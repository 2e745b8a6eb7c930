//! Accounts service configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Configuration for the external accounts service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountsServiceConfig {
    /// Base URL of the accounts service
    #[serde(default)]
    pub base_url: String,

    /// Service-to-service token
    #[serde(default)]
    pub service_token: String,
}

impl AccountsServiceConfig {
    /// Validate accounts service configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("ACCOUNTS__BASE_URL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidServiceUrl("accounts"));
        }
        if self.service_token.is_empty() {
            return Err(ValidationError::MissingRequired("ACCOUNTS__SERVICE_TOKEN"));
        }
        Ok(())
    }
}

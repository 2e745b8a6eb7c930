//! Notification dispatch configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Configuration for the outbound notification sink and its queue.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Base URL of the messaging service
    #[serde(default)]
    pub base_url: String,

    /// Service-to-service token
    #[serde(default)]
    pub service_token: String,

    /// Capacity of the in-process notification queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl NotifyConfig {
    /// Validate notification configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("NOTIFY__BASE_URL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidServiceUrl("notify"));
        }
        if self.service_token.is_empty() {
            return Err(ValidationError::MissingRequired("NOTIFY__SERVICE_TOKEN"));
        }
        if self.queue_capacity == 0 {
            return Err(ValidationError::InvalidQueueCapacity);
        }
        Ok(())
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            service_token: String::new(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_queue_capacity() -> usize {
    crate::adapters::notify::DEFAULT_QUEUE_CAPACITY
}

//! HTTP notification sink.
//!
//! Posts each notification as JSON to the messaging collaborator's
//! dispatch endpoint, which owns template rendering and the actual
//! email/event fan-out.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::ports::{Notification, NotificationSink, NotifyError};

/// Configuration for the messaging collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifySinkConfig {
    /// Base URL of the messaging service.
    pub base_url: String,

    /// Service-to-service token.
    pub service_token: SecretString,
}

/// Sink delivering notifications over HTTP.
pub struct HttpNotificationSink {
    client: reqwest::Client,
    config: NotifySinkConfig,
}

impl HttpNotificationSink {
    pub fn new(config: NotifySinkConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn dispatch_url(&self) -> String {
        format!("{}/api/notifications/dispatch", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl NotificationSink for HttpNotificationSink {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.dispatch_url())
            .bearer_auth(self.config.service_token.expose_secret())
            .json(notification)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::Rejected(format!(
                "dispatch endpoint returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

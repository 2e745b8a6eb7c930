//! HTTP client for the accounts collaborator.
//!
//! The accounts service owns user records, sign-in links, and profile
//! roles; this adapter speaks its service-to-service API.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::domain::foundation::{PaymentId, UserId};
use crate::ports::{AccountError, AccountService, MagicLinkRequest};

/// Configuration for the accounts collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountsConfig {
    /// Base URL of the accounts service.
    pub base_url: String,

    /// Service-to-service token.
    pub service_token: SecretString,
}

/// Accounts service client over HTTP.
pub struct HttpAccountService {
    client: reqwest::Client,
    config: AccountsConfig,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user_id: UserId,
}

impl HttpAccountService {
    pub fn new(config: AccountsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Overrides the base URL, for tests against a local server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn token(&self) -> &str {
        self.config.service_token.expose_secret()
    }
}

#[async_trait]
impl AccountService for HttpAccountService {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserId>, AccountError> {
        let response = self
            .client
            .get(self.url("/api/users/lookup"))
            .query(&[("email", email)])
            .bearer_auth(self.token())
            .send()
            .await
            .map_err(|e| AccountError::Transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AccountError::Rejected(format!(
                "lookup returned {}",
                response.status()
            )));
        }

        let envelope: UserEnvelope = response
            .json()
            .await
            .map_err(|e| AccountError::Transport(e.to_string()))?;
        Ok(Some(envelope.user_id))
    }

    async fn create_account(
        &self,
        email: &str,
        payment_id: &PaymentId,
    ) -> Result<UserId, AccountError> {
        let response = self
            .client
            .post(self.url("/api/users"))
            .bearer_auth(self.token())
            .json(&serde_json::json!({
                "email": email,
                "payment_id": payment_id,
            }))
            .send()
            .await
            .map_err(|e| AccountError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AccountError::Rejected(format!(
                "account creation returned {}",
                response.status()
            )));
        }

        let envelope: UserEnvelope = response
            .json()
            .await
            .map_err(|e| AccountError::Transport(e.to_string()))?;
        debug!(user_id = %envelope.user_id, "account created");
        Ok(envelope.user_id)
    }

    async fn send_magic_link(&self, request: MagicLinkRequest) -> Result<(), AccountError> {
        let response = self
            .client
            .post(self.url("/api/auth/magic-link"))
            .bearer_auth(self.token())
            .json(&request)
            .send()
            .await
            .map_err(|e| AccountError::LinkDispatch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AccountError::LinkDispatch(format!(
                "magic link endpoint returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn promote_to_affiliate(&self, user_id: &UserId) -> Result<(), AccountError> {
        let response = self
            .client
            .post(self.url(&format!("/api/users/{}/promote-affiliate", user_id)))
            .bearer_auth(self.token())
            .send()
            .await
            .map_err(|e| AccountError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AccountError::Rejected(format!(
                "promotion returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

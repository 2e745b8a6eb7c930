//! Paystack gateway adapter.
//!
//! Implements the `GatewayClient` port against Paystack's
//! `GET /transaction/verify/{reference}` endpoint.
//!
//! # Normalization
//!
//! - `data.status == "success"` maps to the canonical `Success`;
//!   `"failed"` to `Failed`; anything else (including absence) to `Other`
//! - Amounts arrive in minor units (kobo) and are divided by 100
//! - `paid_at` falls back to `created_at` when absent

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::gateway::{GatewayProvider, GatewayTxStatus, VerificationOutcome};
use crate::domain::foundation::Timestamp;
use crate::ports::{GatewayClient, GatewayError};

/// Paystack API configuration.
#[derive(Clone)]
pub struct PaystackConfig {
    /// Secret API key (sk_live_... or sk_test_...).
    secret_key: SecretString,

    /// Base URL for the Paystack API (default: https://api.paystack.co).
    api_base_url: String,
}

impl PaystackConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: SecretString::new(secret_key.into()),
            api_base_url: "https://api.paystack.co".to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Paystack implementation of the `GatewayClient` port.
pub struct PaystackGateway {
    config: PaystackConfig,
    http_client: reqwest::Client,
}

impl PaystackGateway {
    pub fn new(config: PaystackConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

/// Raw verification envelope as Paystack documents it.
#[derive(Debug, Deserialize)]
struct PaystackVerifyResponse {
    status: bool,
    #[allow(dead_code)]
    message: Option<String>,
    data: Option<PaystackTransaction>,
}

#[derive(Debug, Deserialize)]
struct PaystackTransaction {
    status: Option<String>,
    /// Amount in kobo (minor units).
    amount: Option<i64>,
    currency: Option<String>,
    paid_at: Option<String>,
    created_at: Option<String>,
    reference: Option<String>,
    metadata: Option<serde_json::Value>,
    customer: Option<PaystackCustomer>,
}

#[derive(Debug, Deserialize)]
struct PaystackCustomer {
    email: Option<String>,
}

fn normalize_status(raw: Option<&str>) -> GatewayTxStatus {
    match raw {
        Some("success") => GatewayTxStatus::Success,
        Some("failed") => GatewayTxStatus::Failed,
        _ => GatewayTxStatus::Other,
    }
}

/// Maps the raw envelope into the canonical outcome shape.
///
/// An envelope that reports success but carries no `data` object is a
/// partial response the normalization cannot work with.
fn normalize(
    response: PaystackVerifyResponse,
    reference: &str,
) -> Result<VerificationOutcome, GatewayError> {
    if response.status && response.data.is_none() {
        return Err(GatewayError::MissingField("data"));
    }
    let data = response.data;

    let status = normalize_status(
        data.as_ref()
            .and_then(|d| d.status.as_deref()),
    );

    let paid_at = data
        .as_ref()
        .and_then(|d| d.paid_at.as_deref().or(d.created_at.as_deref()))
        .and_then(Timestamp::parse_rfc3339);

    Ok(VerificationOutcome {
        provider: GatewayProvider::Paystack,
        ok: response.status && data.is_some(),
        status,
        amount: data
            .as_ref()
            .and_then(|d| d.amount)
            .map(|kobo| kobo as f64 / 100.0)
            .unwrap_or(0.0),
        currency: data
            .as_ref()
            .and_then(|d| d.currency.clone())
            .unwrap_or_default(),
        paid_at,
        reference: data
            .as_ref()
            .and_then(|d| d.reference.clone())
            .unwrap_or_else(|| reference.to_string()),
        customer_email: data
            .as_ref()
            .and_then(|d| d.customer.as_ref())
            .and_then(|c| c.email.clone()),
        metadata: data
            .and_then(|d| d.metadata)
            .unwrap_or(serde_json::Value::Null),
    })
}

#[async_trait]
impl GatewayClient for PaystackGateway {
    fn provider(&self) -> GatewayProvider {
        GatewayProvider::Paystack
    }

    async fn verify(&self, reference: &str) -> Result<VerificationOutcome, GatewayError> {
        let url = format!(
            "{}/transaction/verify/{}",
            self.config.api_base_url, reference
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.config.secret_key.expose_secret())
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                provider = "paystack",
                reference,
                http_status = status.as_u16(),
                "Paystack verification returned non-2xx"
            );
            return Err(GatewayError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let raw: PaystackVerifyResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        let outcome = normalize(raw, reference)?;
        tracing::debug!(
            provider = "paystack",
            reference = %outcome.reference,
            status = ?outcome.status,
            "Paystack verification normalized"
        );
        Ok(outcome)
    }
}

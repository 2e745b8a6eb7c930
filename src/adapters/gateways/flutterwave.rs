//! Flutterwave gateway adapter.
//!
//! Implements the `GatewayClient` port against Flutterwave's
//! `GET /v3/transactions/verify_by_reference?tx_ref={reference}`
//! endpoint.
//!
//! # Normalization
//!
//! - `data.status == "successful"` maps to the canonical `Success`
//!   (Flutterwave's vocabulary differs from Paystack's `"success"`)
//! - Amounts arrive in major units and pass through unchanged
//! - Transaction reference lives under `tx_ref`, metadata under `meta`

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::foundation::Timestamp;
use crate::domain::gateway::{GatewayProvider, GatewayTxStatus, VerificationOutcome};
use crate::ports::{GatewayClient, GatewayError};

/// Flutterwave API configuration.
#[derive(Clone)]
pub struct FlutterwaveConfig {
    /// Secret API key (FLWSECK-...).
    secret_key: SecretString,

    /// Base URL for the Flutterwave API (default: https://api.flutterwave.com).
    api_base_url: String,
}

impl FlutterwaveConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: SecretString::new(secret_key.into()),
            api_base_url: "https://api.flutterwave.com".to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Flutterwave implementation of the `GatewayClient` port.
pub struct FlutterwaveGateway {
    config: FlutterwaveConfig,
    http_client: reqwest::Client,
}

impl FlutterwaveGateway {
    pub fn new(config: FlutterwaveConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

/// Raw verification envelope as Flutterwave documents it.
#[derive(Debug, Deserialize)]
struct FlutterwaveVerifyResponse {
    /// "success" or "error" for the call itself.
    status: String,
    #[allow(dead_code)]
    message: Option<String>,
    data: Option<FlutterwaveTransaction>,
}

#[derive(Debug, Deserialize)]
struct FlutterwaveTransaction {
    status: Option<String>,
    /// Amount in major units.
    amount: Option<f64>,
    currency: Option<String>,
    created_at: Option<String>,
    tx_ref: Option<String>,
    meta: Option<serde_json::Value>,
    customer: Option<FlutterwaveCustomer>,
}

#[derive(Debug, Deserialize)]
struct FlutterwaveCustomer {
    email: Option<String>,
}

fn normalize_status(raw: Option<&str>) -> GatewayTxStatus {
    match raw {
        Some("successful") => GatewayTxStatus::Success,
        Some("failed") => GatewayTxStatus::Failed,
        _ => GatewayTxStatus::Other,
    }
}

/// Maps the raw envelope into the canonical outcome shape.
///
/// An envelope that reports success but carries no `data` object is a
/// partial response the normalization cannot work with.
fn normalize(
    response: FlutterwaveVerifyResponse,
    reference: &str,
) -> Result<VerificationOutcome, GatewayError> {
    if response.status == "success" && response.data.is_none() {
        return Err(GatewayError::MissingField("data"));
    }
    let ok = response.status == "success" && response.data.is_some();
    let data = response.data;

    let status = normalize_status(data.as_ref().and_then(|d| d.status.as_deref()));

    // Flutterwave has no separate paid-at; created_at stands in.
    let paid_at = data
        .as_ref()
        .and_then(|d| d.created_at.as_deref())
        .and_then(Timestamp::parse_rfc3339);

    Ok(VerificationOutcome {
        provider: GatewayProvider::Flutterwave,
        ok,
        status,
        amount: data.as_ref().and_then(|d| d.amount).unwrap_or(0.0),
        currency: data
            .as_ref()
            .and_then(|d| d.currency.clone())
            .unwrap_or_default(),
        paid_at,
        reference: data
            .as_ref()
            .and_then(|d| d.tx_ref.clone())
            .unwrap_or_else(|| reference.to_string()),
        customer_email: data
            .as_ref()
            .and_then(|d| d.customer.as_ref())
            .and_then(|c| c.email.clone()),
        metadata: data
            .and_then(|d| d.meta)
            .unwrap_or(serde_json::Value::Null),
    })
}

#[async_trait]
impl GatewayClient for FlutterwaveGateway {
    fn provider(&self) -> GatewayProvider {
        GatewayProvider::Flutterwave
    }

    async fn verify(&self, reference: &str) -> Result<VerificationOutcome, GatewayError> {
        let url = format!(
            "{}/v3/transactions/verify_by_reference",
            self.config.api_base_url
        );

        let response = self
            .http_client
            .get(&url)
            .query(&[("tx_ref", reference)])
            .bearer_auth(self.config.secret_key.expose_secret())
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                provider = "flutterwave",
                reference,
                http_status = status.as_u16(),
                "Flutterwave verification returned non-2xx"
            );
            return Err(GatewayError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let raw: FlutterwaveVerifyResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        let outcome = normalize(raw, reference)?;
        tracing::debug!(
            provider = "flutterwave",
            reference = %outcome.reference,
            status = ?outcome.status,
            "Flutterwave verification normalized"
        );
        Ok(outcome)
    }
}

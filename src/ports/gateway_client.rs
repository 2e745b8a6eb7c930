//! Gateway client port for external transaction verification.
//!
//! One implementation per provider. Each adapter issues the provider's
//! verification call and maps the response into the canonical
//! [`VerificationOutcome`] shape, so callers never branch on a
//! provider-specific field name or status string.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::gateway::{GatewayProvider, VerificationOutcome};

/// Port for a single payment gateway's transaction verification.
#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// The provider this client talks to.
    fn provider(&self) -> GatewayProvider;

    /// Verify a transaction by its external reference.
    ///
    /// Returns a normalized outcome on any well-formed gateway response,
    /// including declined transactions; `GatewayError` is reserved for
    /// transport failures, non-2xx statuses, and malformed bodies.
    async fn verify(&self, reference: &str) -> Result<VerificationOutcome, GatewayError>;
}

impl std::fmt::Debug for dyn GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("provider", &self.provider())
            .finish()
    }
}

/// Errors from gateway verification calls.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Network-level failure reaching the gateway.
    #[error("gateway transport error: {0}")]
    Transport(String),

    /// The gateway answered with a non-2xx status.
    #[error("gateway returned HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The body was not the JSON shape the provider documents.
    #[error("malformed gateway response: {0}")]
    MalformedResponse(String),

    /// A field the normalization requires was absent.
    #[error("gateway response missing required field '{0}'")]
    MissingField(&'static str),
}

impl GatewayError {
    /// Transport failures are worth retrying; everything else is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Transport(_))
    }
}

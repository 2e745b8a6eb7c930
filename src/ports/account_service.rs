//! Account service port for the accounts collaborator.
//!
//! Guest checkouts arrive with no bound user; this port covers the
//! existing-account check, account creation with payment binding, and
//! passwordless sign-in ("magic") link dispatch. Failures here are hard
//! failures for the request: provisioning cannot continue without a
//! user id.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{PackageId, PaymentId, UserId};

/// Port into the accounts subsystem.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Looks up an existing account by email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserId>, AccountError>;

    /// Creates an account for a guest payer and binds it to the payment.
    async fn create_account(
        &self,
        email: &str,
        payment_id: &PaymentId,
    ) -> Result<UserId, AccountError>;

    /// Issues a passwordless sign-in link scoped to the purchase.
    async fn send_magic_link(&self, request: MagicLinkRequest) -> Result<(), AccountError>;

    /// Promotes a user's profile role to affiliate.
    async fn promote_to_affiliate(&self, user_id: &UserId) -> Result<(), AccountError>;
}

/// Magic-link dispatch request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagicLinkRequest {
    pub user_id: UserId,
    pub email: String,

    /// Purchased membership package, scoping the post-login landing.
    pub package_id: PackageId,

    /// Referral metadata to carry through sign-in, when present.
    pub referral_metadata: Option<serde_json::Value>,
}

/// Errors from the accounts collaborator.
#[derive(Debug, Clone, Error)]
pub enum AccountError {
    #[error("account service transport error: {0}")]
    Transport(String),

    #[error("account service rejected the request: {0}")]
    Rejected(String),

    #[error("failed to send sign-in link: {0}")]
    LinkDispatch(String),
}

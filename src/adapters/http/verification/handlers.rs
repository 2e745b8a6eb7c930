//! HTTP handlers for the verification endpoint.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::response::IntoResponse;
use http::StatusCode;

use crate::adapters::gateways::GatewayRegistry;
use crate::application::handlers::commissions::CommissionPolicy;
use crate::application::handlers::verification::{
    VerificationError, VerifyPaymentCommand, VerifyPaymentHandler,
};
use crate::domain::foundation::UserId;
use crate::ports::{AccountService, MembershipStore, Notifier, PaymentRepository, ReferralStore};

use super::dto::{ErrorResponse, VerifyPaymentRequest, VerifyPaymentResponse};

/// Shared application state containing all dependencies.
///
/// Cloned per request; all dependencies are Arc-wrapped.
#[derive(Clone)]
pub struct VerificationAppState {
    pub payments: Arc<dyn PaymentRepository>,
    pub registry: Arc<GatewayRegistry>,
    pub memberships: Arc<dyn MembershipStore>,
    pub referrals: Arc<dyn ReferralStore>,
    pub accounts: Arc<dyn AccountService>,
    pub notifier: Arc<dyn Notifier>,
    pub commission_policy: CommissionPolicy,
}

impl VerificationAppState {
    pub fn verify_payment_handler(&self) -> VerifyPaymentHandler {
        VerifyPaymentHandler::new(
            self.payments.clone(),
            self.registry.clone(),
            self.memberships.clone(),
            self.referrals.clone(),
            self.accounts.clone(),
            self.notifier.clone(),
            self.commission_policy.clone(),
        )
    }
}

/// POST /api/payments/verify - Verify a gateway transaction.
pub async fn verify_payment(
    State(state): State<VerificationAppState>,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<impl IntoResponse, VerificationApiError> {
    let user_id = parse_user_id(request.user_id.as_deref())?;

    let handler = state.verify_payment_handler();
    let result = handler
        .handle(VerifyPaymentCommand {
            reference: request.reference,
            user_id,
        })
        .await?;

    Ok(Json(VerifyPaymentResponse::from(result)))
}

/// GET /health - Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

fn parse_user_id(raw: Option<&str>) -> Result<Option<UserId>, VerificationApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<UserId>()
            .map(Some)
            .map_err(|_| VerificationApiError::InvalidUserId),
    }
}

/// API error newtype mapping flow errors onto HTTP status codes.
#[derive(Debug)]
pub enum VerificationApiError {
    InvalidUserId,
    Flow(VerificationError),
}

impl From<VerificationError> for VerificationApiError {
    fn from(err: VerificationError) -> Self {
        Self::Flow(err)
    }
}

impl IntoResponse for VerificationApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match &self {
            VerificationApiError::InvalidUserId => (
                StatusCode::BAD_REQUEST,
                "INVALID_USER_ID",
                "userId must be a valid UUID".to_string(),
            ),
            VerificationApiError::Flow(err) => {
                let (status, code) = match err {
                    VerificationError::MissingReference => {
                        (StatusCode::BAD_REQUEST, "MISSING_REFERENCE")
                    }
                    VerificationError::PaymentNotFound => {
                        (StatusCode::NOT_FOUND, "PAYMENT_NOT_FOUND")
                    }
                    VerificationError::MissingPackageHint => {
                        (StatusCode::BAD_REQUEST, "MISSING_PACKAGE_HINT")
                    }
                    VerificationError::GatewayNotConfigured(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "GATEWAY_NOT_CONFIGURED")
                    }
                    VerificationError::Account(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "ACCOUNT_RESOLUTION_FAILED",
                    ),
                    VerificationError::Store(_) | VerificationError::Payment(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                    }
                };
                (status, code, err.to_string())
            }
        };

        let body = ErrorResponse::new(code, message);
        (status, Json(body)).into_response()
    }
}

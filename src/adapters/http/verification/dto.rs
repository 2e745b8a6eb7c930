//! HTTP DTOs for the verification endpoint.

use serde::{Deserialize, Serialize};

use crate::application::handlers::verification::VerifyPaymentResult;
use crate::domain::payment::PaymentStatus;

/// Request to verify a gateway transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    /// External transaction reference from the gateway redirect.
    pub reference: String,

    /// Claimed owner; absent or empty for guest checkouts.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Definitive verdict about the payment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub message: String,
    pub already_verified: bool,
    pub payment: PaymentDetails,
    pub account_created: bool,
    pub signin_link_sent: bool,
}

/// Settled payment details.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub id: String,
    pub amount: f64,
    pub currency: String,
    pub status: PaymentStatus,
    pub package_id: String,
}

impl From<VerifyPaymentResult> for VerifyPaymentResponse {
    fn from(result: VerifyPaymentResult) -> Self {
        Self {
            success: result.success,
            message: result.message,
            already_verified: result.already_verified,
            payment: PaymentDetails {
                id: result.payment_id.to_string(),
                amount: result.amount,
                currency: result.currency,
                status: result.status,
                package_id: result.package_id.to_string(),
            },
            account_created: result.account_created,
            signin_link_sent: result.signin_link_sent,
        }
    }
}

/// Standard error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{PackageId, PaymentId};

    #[test]
    fn request_accepts_missing_user_id() {
        let request: VerifyPaymentRequest =
            serde_json::from_str(r#"{ "reference": "tx_1" }"#).unwrap();
        assert_eq!(request.reference, "tx_1");
        assert!(request.user_id.is_none());
    }

    #[test]
    fn response_serializes_camel_case() {
        let result = VerifyPaymentResult {
            success: true,
            message: "payment verified successfully".to_string(),
            already_verified: false,
            payment_id: PaymentId::new(),
            amount: 150.0,
            currency: "NGN".to_string(),
            status: PaymentStatus::Completed,
            package_id: PackageId::new(),
            account_created: true,
            signin_link_sent: true,
        };

        let json = serde_json::to_value(VerifyPaymentResponse::from(result)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["accountCreated"], true);
        assert_eq!(json["signinLinkSent"], true);
        assert_eq!(json["payment"]["status"], "completed");
    }
}

//! Axum router for the verification API.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{health, verify_payment, VerificationAppState};

/// Creates the verification API router.
///
/// # Routes
/// - `POST /api/payments/verify` - Verify a gateway transaction
/// - `GET /health` - Liveness probe
pub fn verification_router() -> Router<VerificationAppState> {
    Router::new()
        .route("/api/payments/verify", post(verify_payment))
        .route("/health", get(health))
}

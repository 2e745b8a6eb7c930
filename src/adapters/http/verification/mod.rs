//! HTTP adapter for the payment verification endpoint.
//!
//! - `POST /api/payments/verify` - Verify a gateway transaction
//! - `GET /health` - Liveness probe

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::VerificationAppState;
pub use routes::verification_router;

//! Payment verification flow.

mod errors;
mod payment_locator;
mod verify_payment;

pub use errors::VerificationError;
pub use payment_locator::{LocatedPayment, PaymentLocator, FALLBACK_WINDOW_MINUTES};
pub use verify_payment::{VerifyPaymentCommand, VerifyPaymentHandler, VerifyPaymentResult};

//! Payment ledger aggregate.

mod errors;
mod record;

pub use errors::PaymentError;
pub use record::{PaymentKind, PaymentRecord, PaymentStatus};

//! Payment gateway adapters.
//!
//! One adapter per provider, each implementing the `GatewayClient` port,
//! plus the registry that resolves a provider to its client.

mod flutterwave;
mod paystack;
mod registry;

pub use flutterwave::{FlutterwaveConfig, FlutterwaveGateway};
pub use paystack::{PaystackConfig, PaystackGateway};
pub use registry::{GatewayRegistry, RegistryError};

//! Error taxonomy for the verification flow.

use thiserror::Error;

use crate::adapters::gateways::RegistryError;
use crate::domain::foundation::StoreError;
use crate::domain::gateway::GatewayProvider;
use crate::domain::payment::PaymentError;
use crate::ports::AccountError;

/// Errors that abort a verification request.
///
/// Gateway-side verification failures are absent on purpose: a declined
/// or unverifiable transaction marks the payment failed and produces a
/// negative verdict, not an error. Post-completion provisioning errors
/// other than account resolution are logged and swallowed, so they do
/// not appear here either.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// The request carried no transaction reference.
    #[error("transaction reference is required")]
    MissingReference,

    /// No stored, adoptable, or synthesizable payment matches the
    /// reference.
    #[error("no payment found for the given reference")]
    PaymentNotFound,

    /// A payment had to be synthesized but the gateway metadata carries
    /// no membership package id, so provisioning cannot proceed.
    #[error("gateway metadata carries no membership package id")]
    MissingPackageHint,

    /// The record names a provider with no configured client.
    #[error("no gateway client configured for provider '{0}'")]
    GatewayNotConfigured(GatewayProvider),

    /// The store rejected a write the flow cannot recover from.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The record was in a state the requested transition forbids.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Account resolution failed; provisioning cannot continue without
    /// a user id.
    #[error(transparent)]
    Account(#[from] AccountError),
}

impl From<crate::application::handlers::provisioning::ResolveAccountError> for VerificationError {
    fn from(err: crate::application::handlers::provisioning::ResolveAccountError) -> Self {
        use crate::application::handlers::provisioning::ResolveAccountError;
        match err {
            ResolveAccountError::Account(err) => VerificationError::Account(err),
            ResolveAccountError::Store(err) => VerificationError::Store(err),
        }
    }
}

impl From<RegistryError> for VerificationError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotConfigured(provider) => {
                VerificationError::GatewayNotConfigured(provider)
            }
        }
    }
}

//! Gateway registry.
//!
//! Resolves a provider to its client. Resolution fails closed: an
//! unregistered provider is a configuration error, never a silent
//! default. The only multi-provider path is the fixed-order probe used
//! for payments the store has never seen.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::gateway::GatewayProvider;
use crate::ports::GatewayClient;

/// Maps providers to their `GatewayClient` implementations.
pub struct GatewayRegistry {
    clients: HashMap<GatewayProvider, Arc<dyn GatewayClient>>,
}

/// Errors from gateway resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No client registered for the requested provider.
    #[error("no gateway client configured for provider '{0}'")]
    NotConfigured(GatewayProvider),
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    /// Registers a client under its own provider.
    pub fn with_client(mut self, client: Arc<dyn GatewayClient>) -> Self {
        self.clients.insert(client.provider(), client);
        self
    }

    /// Resolves the client for a provider; fails closed when absent.
    pub fn resolve(
        &self,
        provider: GatewayProvider,
    ) -> Result<Arc<dyn GatewayClient>, RegistryError> {
        self.clients
            .get(&provider)
            .cloned()
            .ok_or(RegistryError::NotConfigured(provider))
    }

    /// Registered clients in the fixed probe priority order.
    pub fn probe_clients(&self) -> Vec<Arc<dyn GatewayClient>> {
        GatewayProvider::probe_order()
            .iter()
            .filter_map(|p| self.clients.get(p).cloned())
            .collect()
    }
}

impl Default for GatewayRegistry {
    fn default() -> Self {
        Self::new()
    }
}

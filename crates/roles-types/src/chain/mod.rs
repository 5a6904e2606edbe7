//! Chain identity and chain-provider registries.
//!
//! - [`ChainId`] - A CAIP-2 chain identifier (e.g., `eip155:100` for Gnosis Chain)
//! - [`ChainProviderOps`] - What every configured chain provider can report about itself
//! - [`ChainRegistry`] - Configured providers keyed by chain id
//! - [`FromConfig`] - Async construction of providers from configuration

mod chain_id;

pub use chain_id::*;

use std::collections::HashMap;

/// Common operations exposed by every chain provider.
pub trait ChainProviderOps {
    /// The chain this provider talks to.
    fn chain_id(&self) -> ChainId;
}

impl<T: ChainProviderOps> ChainProviderOps for std::sync::Arc<T> {
    fn chain_id(&self) -> ChainId {
        (**self).chain_id()
    }
}

/// Builds `Self` from a configuration value, possibly touching the network.
#[async_trait::async_trait]
pub trait FromConfig<C>: Sized {
    async fn from_config(config: &C) -> Result<Self, Box<dyn std::error::Error>>;
}

/// Configured chain providers, one per chain id.
#[derive(Debug, Clone)]
pub struct ChainRegistry<P> {
    providers: HashMap<ChainId, P>,
}

impl<P> ChainRegistry<P> {
    pub fn new(providers: HashMap<ChainId, P>) -> Self {
        Self { providers }
    }

    /// Provider configured for `chain_id`, if any.
    pub fn by_chain_id(&self, chain_id: &ChainId) -> Option<&P> {
        self.providers.get(chain_id)
    }

    pub fn chain_ids(&self) -> impl Iterator<Item = &ChainId> {
        self.providers.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy(ChainId);

    impl ChainProviderOps for Dummy {
        fn chain_id(&self) -> ChainId {
            self.0.clone()
        }
    }

    #[test]
    fn test_registry_lookup_by_chain_id() {
        let gnosis = ChainId::new("eip155", "100");
        let mut providers = HashMap::new();
        let provider = Dummy(gnosis.clone());
        providers.insert(provider.chain_id(), provider);
        let registry = ChainRegistry::new(providers);

        assert!(registry.by_chain_id(&gnosis).is_some());
        assert!(registry.by_chain_id(&ChainId::new("eip155", "1")).is_none());
        assert_eq!(registry.chain_ids().count(), 1);
    }
}

//! Configured Roles Modifier deployments, one per chain.
//!
//! - [`ChainProvider`] - Ledger client plus the modifier, role and account used on that chain
//! - [`ChainRegistry`] - Providers keyed by [`ChainId`], built from [`ChainsConfig`]

use alloy_primitives::Address;
use roles_chain_eip155::chain::{Eip155ChainReference, Eip155LedgerClient, LedgerClient};
use roles_types::chain::{ChainId, ChainProviderOps, ChainRegistry, FromConfig};
use std::collections::HashMap;

use crate::config::{ChainConfig, ChainsConfig};

#[derive(Debug, thiserror::Error)]
#[error("node at {rpc} reports chain id {reported}, configured for {configured}")]
pub struct ChainMismatch {
    pub rpc: String,
    pub configured: Eip155ChainReference,
    pub reported: u64,
}

/// A Roles Modifier reachable through one RPC endpoint.
#[derive(Debug, Clone)]
pub struct ChainProvider {
    client: Eip155LedgerClient,
    roles_mod: Address,
    role: u16,
    account: Option<Address>,
}

impl ChainProvider {
    pub fn client(&self) -> &Eip155LedgerClient {
        &self.client
    }

    pub fn roles_mod(&self) -> Address {
        self.roles_mod
    }

    pub fn role(&self) -> u16 {
        self.role
    }

    /// Role member configured for simulation, if any.
    pub fn account(&self) -> Option<Address> {
        self.account
    }
}

/// Connects to the configured RPC and checks that it serves the configured chain.
///
/// # Errors
///
/// Returns an error if:
/// - the chain is not an `eip155` chain
/// - the node cannot be reached
/// - the node reports a different chain id
#[async_trait::async_trait]
impl FromConfig<ChainConfig> for ChainProvider {
    async fn from_config(config: &ChainConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let chain = Eip155ChainReference::try_from(&config.chain)?;
        let client = Eip155LedgerClient::connect_http(chain, config.rpc.clone());
        let reported = LedgerClient::chain_id(&client).await?;
        if reported != chain.inner() {
            return Err(ChainMismatch {
                rpc: config.rpc.to_string(),
                configured: chain,
                reported,
            }
            .into());
        }
        #[cfg(feature = "telemetry")]
        tracing::info!(
            chain = %config.chain,
            roles_mod = %config.roles_mod,
            role = config.role,
            "Connected to chain"
        );
        Ok(Self {
            client,
            roles_mod: config.roles_mod,
            role: config.role,
            account: config.account,
        })
    }
}

impl ChainProviderOps for ChainProvider {
    fn chain_id(&self) -> ChainId {
        ChainProviderOps::chain_id(&self.client)
    }
}

/// Initializes a provider for every configured chain.
///
/// # Errors
///
/// Returns an error if any chain provider fails to initialize.
#[async_trait::async_trait]
impl FromConfig<ChainsConfig> for ChainRegistry<ChainProvider> {
    async fn from_config(chains: &ChainsConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let mut providers = HashMap::new();
        for chain in chains.iter() {
            let chain_provider = ChainProvider::from_config(chain).await?;
            providers.insert(chain_provider.chain_id(), chain_provider);
        }
        Ok(Self::new(providers))
    }
}

//! Registry of well-known networks.
//!
//! Maps human-readable network names (as used in operation plans and config files) to their
//! CAIP-2 chain identifiers.

use std::sync::LazyLock;

use crate::chain::ChainId;

/// A well-known network: its human-readable name and CAIP-2 identifier.
#[derive(Debug, Clone)]
pub struct KnownNetwork {
    pub name: &'static str,
    pub chain_id: ChainId,
}

static KNOWN_NETWORKS: LazyLock<Vec<KnownNetwork>> = LazyLock::new(|| {
    vec![
        KnownNetwork {
            name: "ethereum",
            chain_id: ChainId::new("eip155", "1"),
        },
        KnownNetwork {
            name: "gnosis",
            chain_id: ChainId::new("eip155", "100"),
        },
    ]
});

/// All networks known to this crate.
pub fn known_networks() -> &'static [KnownNetwork] {
    KNOWN_NETWORKS.as_slice()
}

pub fn chain_id_by_network_name(network_name: &str) -> Option<&'static ChainId> {
    KNOWN_NETWORKS
        .iter()
        .find(|network| network.name.eq_ignore_ascii_case(network_name))
        .map(|network| &network.chain_id)
}

pub fn network_name_by_chain_id(chain_id: &ChainId) -> Option<&'static str> {
    KNOWN_NETWORKS
        .iter()
        .find(|network| &network.chain_id == chain_id)
        .map(|network| network.name)
}

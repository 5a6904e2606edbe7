use roles_types::chain::ChainId;

use crate::chain::Eip155ChainReference;
use crate::multisend::{MULTISEND_ADDRESS, MultiSendDeployment};

/// Per-network instances for the EVM networks this crate knows about.
///
/// Implemented for chain identifiers and for per-network deployments, so
/// `ChainId::gnosis()` and `MultiSendDeployment::gnosis()` read the same way.
pub trait KnownNetworkEip155<A> {
    /// Ethereum mainnet (eip155:1)
    fn ethereum() -> A;
    /// Gnosis Chain (eip155:100)
    fn gnosis() -> A;
}

impl KnownNetworkEip155<ChainId> for ChainId {
    fn ethereum() -> ChainId {
        Eip155ChainReference::ethereum().into()
    }

    fn gnosis() -> ChainId {
        Eip155ChainReference::gnosis().into()
    }
}

impl KnownNetworkEip155<Eip155ChainReference> for Eip155ChainReference {
    fn ethereum() -> Eip155ChainReference {
        Eip155ChainReference::new(1)
    }

    fn gnosis() -> Eip155ChainReference {
        Eip155ChainReference::new(100)
    }
}

impl KnownNetworkEip155<MultiSendDeployment> for MultiSendDeployment {
    fn ethereum() -> MultiSendDeployment {
        MultiSendDeployment {
            chain_reference: Eip155ChainReference::ethereum(),
            address: MULTISEND_ADDRESS,
        }
    }

    fn gnosis() -> MultiSendDeployment {
        MultiSendDeployment {
            chain_reference: Eip155ChainReference::gnosis(),
            address: MULTISEND_ADDRESS,
        }
    }
}

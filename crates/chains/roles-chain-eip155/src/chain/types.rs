use roles_types::chain::ChainId;
use std::fmt;

/// The numeric chain id of an EVM network (`1` for Ethereum, `100` for Gnosis Chain).
///
/// Converts to and from the `eip155:<n>` CAIP-2 [`ChainId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Eip155ChainReference(u64);

impl Eip155ChainReference {
    pub const NAMESPACE: &'static str = "eip155";

    pub fn new(chain_id: u64) -> Self {
        Self(chain_id)
    }

    pub fn inner(&self) -> u64 {
        self.0
    }

    pub fn as_chain_id(&self) -> ChainId {
        ChainId::new(Self::NAMESPACE, self.0.to_string())
    }
}

impl fmt::Display for Eip155ChainReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Eip155ChainReference> for ChainId {
    fn from(value: Eip155ChainReference) -> Self {
        value.as_chain_id()
    }
}

impl From<&Eip155ChainReference> for ChainId {
    fn from(value: &Eip155ChainReference) -> Self {
        value.as_chain_id()
    }
}

/// The chain id is not in the `eip155` namespace or its reference is not a number.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{0} is not an eip155 chain id")]
pub struct NotEip155Chain(pub ChainId);

impl TryFrom<&ChainId> for Eip155ChainReference {
    type Error = NotEip155Chain;

    fn try_from(value: &ChainId) -> Result<Self, Self::Error> {
        if value.namespace() != Self::NAMESPACE {
            return Err(NotEip155Chain(value.clone()));
        }
        value
            .reference()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| NotEip155Chain(value.clone()))
    }
}

impl TryFrom<ChainId> for Eip155ChainReference {
    type Error = NotEip155Chain;

    fn try_from(value: ChainId) -> Result<Self, Self::Error> {
        Self::try_from(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_and_from_chain_id() {
        let gnosis = Eip155ChainReference::new(100);
        let chain_id: ChainId = gnosis.into();
        assert_eq!(chain_id.to_string(), "eip155:100");
        assert_eq!(Eip155ChainReference::try_from(&chain_id), Ok(gnosis));
    }

    #[test]
    fn rejects_other_namespaces() {
        let solana = ChainId::new("solana", "5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp");
        assert!(Eip155ChainReference::try_from(&solana).is_err());
        let bogus = ChainId::new("eip155", "mainnet");
        assert!(Eip155ChainReference::try_from(bogus).is_err());
    }
}

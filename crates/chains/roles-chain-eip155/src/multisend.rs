//! Batching of normalized transactions through the MultiSend router.
//!
//! One transaction passes through unchanged. Two or more are packed into a single
//! `multiSend(bytes)` call that the avatar *delegatecalls* on the network's router, so every
//! inner transaction executes in the avatar's context.
//!
//! Each packed entry is `operation (1) ‖ to (20) ‖ value (32) ‖ data length (32) ‖ data`, with
//! no padding between entries.

use alloy_primitives::{Address, Bytes, U256, address};
use roles_types::chain::ChainId;

use crate::abi::{AbiValue, EncodeError, TypedSignature, encode_call};
use crate::chain::Eip155ChainReference;
use crate::networks::KnownNetworkEip155;
use crate::operation::{Operation, TxData};

/// MultiSend v1.4.1 deployment, identical on every supported network.
pub const MULTISEND_ADDRESS: Address = address!("0x8D29bE29923b68abfDD21e541b9374737B49cdAD");

const ENTRY_HEADER_LEN: usize = 1 + 20 + 32 + 32;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MultiSendError {
    #[error("cannot batch an empty list of transactions")]
    EmptyBatch,
    #[error("no MultiSend router is known for network {0}")]
    UnknownNetwork(ChainId),
    #[error("malformed MultiSend entry at byte {offset}: {reason}")]
    MalformedEntry { offset: usize, reason: &'static str },
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// The MultiSend router deployed on a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiSendDeployment {
    pub chain_reference: Eip155ChainReference,
    pub address: Address,
}

impl MultiSendDeployment {
    pub fn known() -> [MultiSendDeployment; 2] {
        [Self::ethereum(), Self::gnosis()]
    }

    pub fn by_chain_reference(chain: Eip155ChainReference) -> Option<MultiSendDeployment> {
        Self::known()
            .into_iter()
            .find(|deployment| deployment.chain_reference == chain)
    }

    /// Looks up the router for a CAIP-2 chain id; non-EVM ids never match.
    pub fn by_chain_id(chain: &ChainId) -> Option<MultiSendDeployment> {
        Eip155ChainReference::try_from(chain)
            .ok()
            .and_then(Self::by_chain_reference)
    }
}

/// Appends one packed entry to `out`.
pub fn pack_entry(tx: &TxData, out: &mut Vec<u8>) {
    out.push(tx.operation.as_u8());
    out.extend_from_slice(tx.to.as_slice());
    out.extend_from_slice(&tx.value.to_be_bytes::<32>());
    out.extend_from_slice(&U256::from(tx.data.len()).to_be_bytes::<32>());
    out.extend_from_slice(&tx.data);
}

/// Concatenates packed entries in order.
pub fn pack(txs: &[TxData]) -> Bytes {
    let mut out = Vec::with_capacity(
        txs.iter()
            .map(|tx| ENTRY_HEADER_LEN + tx.data.len())
            .sum(),
    );
    for tx in txs {
        pack_entry(tx, &mut out);
    }
    out.into()
}

/// Splits a packed blob back into transactions.
pub fn unpack(packed: &[u8]) -> Result<Vec<TxData>, MultiSendError> {
    let mut txs = Vec::new();
    let mut offset = 0;
    while offset < packed.len() {
        let rest = &packed[offset..];
        if rest.len() < ENTRY_HEADER_LEN {
            return Err(MultiSendError::MalformedEntry {
                offset,
                reason: "truncated header",
            });
        }
        let operation = Operation::try_from(rest[0]).map_err(|_| MultiSendError::MalformedEntry {
            offset,
            reason: "unknown operation",
        })?;
        let to = Address::from_slice(&rest[1..21]);
        let value = U256::from_be_slice(&rest[21..53]);
        let data_len = U256::from_be_slice(&rest[53..85]);
        let data_len = usize::try_from(data_len)
            .ok()
            .filter(|len| *len <= rest.len() - ENTRY_HEADER_LEN)
            .ok_or(MultiSendError::MalformedEntry {
                offset,
                reason: "data length exceeds remaining input",
            })?;
        let data = Bytes::copy_from_slice(&rest[ENTRY_HEADER_LEN..ENTRY_HEADER_LEN + data_len]);
        txs.push(TxData {
            operation,
            to,
            value,
            data,
        });
        offset += ENTRY_HEADER_LEN + data_len;
    }
    Ok(txs)
}

fn multisend_signature() -> Result<TypedSignature, EncodeError> {
    TypedSignature::parse(&[("transactions", "bytes")])
}

/// Collapses `txs` into the single transaction to hand to the Roles Modifier.
///
/// A single transaction is returned unchanged, whatever the network. Two or more become a
/// zero-value delegatecall to the network's MultiSend router.
pub fn multi_or_one(txs: &[TxData], chain: &ChainId) -> Result<TxData, MultiSendError> {
    match txs {
        [] => Err(MultiSendError::EmptyBatch),
        [single] => Ok(single.clone()),
        many => {
            let deployment = MultiSendDeployment::by_chain_id(chain)
                .ok_or_else(|| MultiSendError::UnknownNetwork(chain.clone()))?;
            let data = encode_call(
                "multiSend",
                &multisend_signature()?,
                &[AbiValue::Bytes(pack(many))],
            )?;
            Ok(TxData {
                operation: Operation::DelegateCall,
                to: deployment.address,
                value: U256::ZERO,
                data,
            })
        }
    }
}

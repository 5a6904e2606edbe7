//! One-call entry points: plan a list of transactions and run it through a Roles Modifier.

use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use roles_types::chain::ChainId;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::abi::EncodeError;
use crate::chain::{BlockId, LedgerClient};
use crate::multisend::{MultiSendError, multi_or_one};
use crate::operation::{OperationDescriptor, TxData};
use crate::roles::{FeeOverrides, PipelineState, ReceiptPolling, RolesError, RolesModifier};

#[derive(Debug, thiserror::Error)]
pub enum OperationsError {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    MultiSend(#[from] MultiSendError),
    #[error(transparent)]
    Roles(#[from] RolesError),
}

/// Materializes descriptors for one avatar, in order.
pub fn resolve(
    descriptors: &[OperationDescriptor],
    avatar: Option<Address>,
) -> Result<Vec<TxData>, EncodeError> {
    descriptors
        .iter()
        .map(|descriptor| descriptor.to_tx_data(avatar))
        .collect()
}

/// Whether `account` may execute `txs` under `role`, by simulation only, against the state
/// at `block`.
#[cfg_attr(feature = "telemetry", instrument(skip_all, err, fields(
    chain = %chain,
    role = role,
    account = %account,
    block = %block,
    txs = txs.len()
)))]
pub async fn check<C: LedgerClient>(
    txs: &[TxData],
    role: u16,
    account: Address,
    roles_mod: Address,
    chain: &ChainId,
    client: C,
    block: BlockId,
) -> Result<bool, OperationsError> {
    let tx = multi_or_one(txs, chain)?;
    let roles = RolesModifier::for_transaction(&tx, role, roles_mod, client)
        .account(account)
        .build()?;
    Ok(roles.simulate(tx.to, &tx.data, block).await?)
}

/// Plans, simulates, signs, submits and waits for `txs` to be mined.
///
/// A rejected simulation yields [`PipelineState::Rejected`] with nothing broadcast.
#[cfg_attr(feature = "telemetry", instrument(skip_all, err, fields(
    chain = %chain,
    role = role,
    account = %signer.address(),
    txs = txs.len()
)))]
pub async fn send<C: LedgerClient>(
    txs: &[TxData],
    role: u16,
    signer: PrivateKeySigner,
    roles_mod: Address,
    chain: &ChainId,
    client: C,
    polling: ReceiptPolling,
) -> Result<PipelineState, OperationsError> {
    let tx = multi_or_one(txs, chain)?;
    let roles = RolesModifier::for_transaction(&tx, role, roles_mod, client)
        .signer(signer)
        .build()?;
    Ok(roles
        .run(tx.to, &tx.data, &FeeOverrides::default(), polling)
        .await?)
}

//! Execution through a Zodiac Roles Modifier.
//!
//! A [`RolesModifier`] wraps one proxy, one role and one credential. Every transaction goes
//! through the same stages:
//!
//! 1. **Simulate** - `eth_call` of `execTransactionWithRole` with `shouldRevert = true`. A
//!    revert means the role is not permitted to perform the transaction.
//! 2. **Price** - priority fee and fee cap, pinned or derived from the ledger.
//! 3. **Sign** - an EIP-1559 transaction to the proxy carrying the same calldata.
//! 4. **Submit** - raw broadcast, never retried.
//! 5. **Confirm** - receipt lookup.
//!
//! [`RolesModifier::execute`] re-runs the simulation before signing, so a transaction the
//! modifier would reject is never broadcast.

mod fees;

pub use fees::*;

use alloy_consensus::TxEnvelope;
use alloy_eips::BlockId;
use alloy_eips::eip2718::Encodable2718;
use alloy_network::{EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{SolCall, sol};
use serde::Serialize;
use std::time::Duration;

#[cfg(feature = "telemetry")]
use tracing::instrument;
#[cfg(feature = "telemetry")]
use tracing_core::Level;

use crate::chain::{CallOutcome, LedgerClient, LedgerError};
use crate::operation::{Operation, TxData};

sol! {
    /// Zodiac Roles Modifier entry point for role members.
    #[allow(missing_docs)]
    #[derive(Debug)]
    interface IRoles {
        function execTransactionWithRole(
            address to,
            uint256 value,
            bytes data,
            uint8 operation,
            uint16 role,
            bool shouldRevert
        ) external returns (bool success);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RolesError {
    #[error("either a signer or an account must be configured")]
    MissingCredential,
    #[error("account {account} does not match signer address {signer}")]
    CredentialMismatch { account: Address, signer: Address },
    #[error("account {0} has no signer; it can only simulate")]
    MissingSigner(Address),
    #[error("transaction would be reverted by the Roles Modifier")]
    WouldRevert,
    #[error("fee cap overflows u128")]
    FeeOverflow,
    #[error("unexpected execTransactionWithRole return data: {0}")]
    Decode(#[from] alloy_sol_types::Error),
    #[error("failed to sign transaction: {0}")]
    Signing(String),
    #[error("transaction submission failed: {0}")]
    SubmissionFailure(#[source] LedgerError),
    #[error("receipt lookup for {tx_hash} failed: {source}")]
    Confirmation {
        tx_hash: TxHash,
        #[source]
        source: LedgerError,
    },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Who sends the transaction.
#[derive(Debug, Clone)]
pub enum Credential {
    /// A local key; the account is derived from it.
    Signer(PrivateKeySigner),
    /// An account that can only simulate.
    Account(Address),
}

impl Credential {
    pub fn address(&self) -> Address {
        match self {
            Credential::Signer(signer) => signer.address(),
            Credential::Account(address) => *address,
        }
    }
}

/// Outcome of a single receipt lookup.
#[derive(Debug)]
pub enum Confirmation {
    Confirmed { success: bool },
    /// Not mined yet.
    Pending,
    TransportError(LedgerError),
}

/// How long [`RolesModifier::run`] waits for a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptPolling {
    pub interval: Duration,
    pub attempts: u32,
}

impl Default for ReceiptPolling {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            attempts: 60,
        }
    }
}

/// Where a transaction is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum PipelineState {
    Built,
    Simulated,
    #[serde(rename_all = "camelCase")]
    Signed { tx_hash: TxHash },
    #[serde(rename_all = "camelCase")]
    Submitted { tx_hash: TxHash },
    #[serde(rename_all = "camelCase")]
    Confirmed { tx_hash: TxHash, success: bool },
    /// The modifier would revert; nothing was signed.
    Rejected,
    /// Submitted, but no receipt within the polling budget.
    #[serde(rename_all = "camelCase")]
    Unresolved { tx_hash: TxHash },
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Confirmed { .. } | PipelineState::Rejected | PipelineState::Unresolved { .. }
        )
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            PipelineState::Signed { tx_hash }
            | PipelineState::Submitted { tx_hash }
            | PipelineState::Confirmed { tx_hash, .. }
            | PipelineState::Unresolved { tx_hash } => Some(*tx_hash),
            PipelineState::Built | PipelineState::Simulated | PipelineState::Rejected => None,
        }
    }

    /// Mined with status 1.
    pub fn succeeded(&self) -> bool {
        matches!(self, PipelineState::Confirmed { success: true, .. })
    }
}

fn advance(state: PipelineState) -> PipelineState {
    #[cfg(feature = "telemetry")]
    tracing::debug!(state = ?state, "roles pipeline transition");
    state
}

/// A signed, not yet broadcast transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub raw: Bytes,
    pub tx_hash: TxHash,
    pub nonce: u64,
    pub fees: FeeParameters,
}

/// A role member's handle on one Roles Modifier.
#[derive(Debug)]
pub struct RolesModifier<C> {
    role: u16,
    roles_mod: Address,
    client: C,
    value: U256,
    operation: Operation,
    credential: Credential,
    nonce: Option<u64>,
}

/// Builder for [`RolesModifier`]; exactly one credential is required.
#[derive(Debug)]
pub struct RolesModifierBuilder<C> {
    role: u16,
    roles_mod: Address,
    client: C,
    value: U256,
    operation: Operation,
    signer: Option<PrivateKeySigner>,
    account: Option<Address>,
    nonce: Option<u64>,
}

impl<C> RolesModifierBuilder<C> {
    pub fn signer(mut self, signer: PrivateKeySigner) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn account(mut self, account: Address) -> Self {
        self.account = Some(account);
        self
    }

    /// Native value forwarded by the proxy to the target.
    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    /// Pins the nonce instead of using the account's transaction count.
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn build(self) -> Result<RolesModifier<C>, RolesError> {
        let credential = match (self.signer, self.account) {
            (Some(signer), Some(account)) if signer.address() != account => {
                return Err(RolesError::CredentialMismatch {
                    account,
                    signer: signer.address(),
                });
            }
            (Some(signer), _) => Credential::Signer(signer),
            (None, Some(account)) => Credential::Account(account),
            (None, None) => return Err(RolesError::MissingCredential),
        };
        Ok(RolesModifier {
            role: self.role,
            roles_mod: self.roles_mod,
            client: self.client,
            value: self.value,
            operation: self.operation,
            credential,
            nonce: self.nonce,
        })
    }
}

impl<C> RolesModifier<C> {
    pub fn builder(role: u16, roles_mod: Address, client: C) -> RolesModifierBuilder<C> {
        RolesModifierBuilder {
            role,
            roles_mod,
            client,
            value: U256::ZERO,
            operation: Operation::Call,
            signer: None,
            account: None,
            nonce: None,
        }
    }

    /// A gateway whose forwarded value and operation come from `tx`.
    pub fn for_transaction(
        tx: &TxData,
        role: u16,
        roles_mod: Address,
        client: C,
    ) -> RolesModifierBuilder<C> {
        Self::builder(role, roles_mod, client)
            .value(tx.value)
            .operation(tx.operation)
    }

    pub fn role(&self) -> u16 {
        self.role
    }

    pub fn roles_mod(&self) -> Address {
        self.roles_mod
    }

    pub fn account(&self) -> Address {
        self.credential.address()
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// `execTransactionWithRole` calldata for `to`/`data`, always with `shouldRevert = true`.
    pub fn exec_calldata(&self, to: Address, data: &Bytes) -> Bytes {
        IRoles::execTransactionWithRoleCall {
            to,
            value: self.value,
            data: data.clone(),
            operation: self.operation.as_u8(),
            role: self.role,
            shouldRevert: true,
        }
        .abi_encode()
        .into()
    }

    fn signer(&self) -> Result<&PrivateKeySigner, RolesError> {
        match &self.credential {
            Credential::Signer(signer) => Ok(signer),
            Credential::Account(account) => Err(RolesError::MissingSigner(*account)),
        }
    }
}

impl<C: LedgerClient> RolesModifier<C> {
    /// Whether the modifier would let the role perform the transaction, judged against the
    /// state at `block`.
    #[cfg_attr(feature = "telemetry", instrument(skip_all, err, fields(
        role = self.role,
        roles_mod = %self.roles_mod,
        to = %to,
        block = %block
    )))]
    pub async fn simulate(&self, to: Address, data: &Bytes, block: BlockId) -> Result<bool, RolesError> {
        let request = TransactionRequest::default()
            .with_from(self.account())
            .with_to(self.roles_mod)
            .with_input(self.exec_calldata(to, data));
        match self.client.call(request, block).await? {
            CallOutcome::Success(output) => {
                let success = IRoles::execTransactionWithRoleCall::abi_decode_returns(&output)?;
                #[cfg(feature = "telemetry")]
                tracing::event!(Level::INFO, status = "ok", success, "simulated execTransactionWithRole");
                Ok(success)
            }
            CallOutcome::Reverted(_reason) => {
                #[cfg(feature = "telemetry")]
                tracing::event!(
                    Level::WARN,
                    status = "reverted",
                    reason = %_reason,
                    "execTransactionWithRole would revert"
                );
                Ok(false)
            }
        }
    }

    /// Resolves fee parameters, querying the ledger only for values not pinned in `overrides`.
    #[cfg_attr(feature = "telemetry", instrument(skip_all, err))]
    pub async fn price(&self, overrides: &FeeOverrides) -> Result<FeeParameters, RolesError> {
        let max_priority_fee_per_gas = match overrides.max_priority_fee_per_gas {
            Some(fee) => fee,
            None => self.client.max_priority_fee_per_gas().await?,
        };
        let max_fee_per_gas = match overrides.max_fee_per_gas {
            Some(fee) => fee,
            None => {
                let block = self.client.latest_block_fees().await?;
                fee_cap(max_priority_fee_per_gas, block).ok_or(RolesError::FeeOverflow)?
            }
        };
        Ok(FeeParameters {
            gas_limit: overrides.gas_limit.unwrap_or(DEFAULT_GAS_LIMIT),
            max_priority_fee_per_gas,
            max_fee_per_gas,
        })
    }

    /// Builds and signs the EIP-1559 transaction to the proxy. Does not simulate.
    #[cfg_attr(feature = "telemetry", instrument(skip_all, err, fields(
        account = %self.account(),
        to = %to
    )))]
    pub async fn sign(
        &self,
        to: Address,
        data: &Bytes,
        fees: FeeParameters,
    ) -> Result<SignedTransaction, RolesError> {
        let signer = self.signer()?;
        let chain_id = self.client.chain_id().await?;
        let nonce = match self.nonce {
            Some(nonce) => nonce,
            None => self.client.transaction_count(signer.address()).await?,
        };
        let request = TransactionRequest::default()
            .with_from(signer.address())
            .with_to(self.roles_mod)
            .with_value(U256::ZERO)
            .with_input(self.exec_calldata(to, data))
            .with_chain_id(chain_id)
            .with_nonce(nonce)
            .with_gas_limit(fees.gas_limit)
            .with_max_priority_fee_per_gas(fees.max_priority_fee_per_gas)
            .with_max_fee_per_gas(fees.max_fee_per_gas);
        let wallet = EthereumWallet::from(signer.clone());
        let envelope: TxEnvelope = request
            .build(&wallet)
            .await
            .map_err(|e| RolesError::Signing(e.to_string()))?;
        Ok(SignedTransaction {
            raw: envelope.encoded_2718().into(),
            tx_hash: *envelope.tx_hash(),
            nonce,
            fees,
        })
    }

    #[cfg_attr(feature = "telemetry", instrument(skip_all, err, fields(tx = %signed.tx_hash)))]
    pub async fn submit(&self, signed: &SignedTransaction) -> Result<TxHash, RolesError> {
        let tx_hash = self
            .client
            .send_raw_transaction(&signed.raw)
            .await
            .map_err(RolesError::SubmissionFailure)?;
        #[cfg(feature = "telemetry")]
        tracing::event!(Level::INFO, status = "ok", tx = %tx_hash, "execTransactionWithRole submitted");
        Ok(tx_hash)
    }

    /// One receipt lookup.
    pub async fn confirm(&self, tx_hash: TxHash) -> Confirmation {
        match self.client.transaction_receipt(tx_hash).await {
            Ok(Some(receipt)) => {
                #[cfg(feature = "telemetry")]
                {
                    if receipt.success {
                        tracing::event!(Level::INFO, status = "ok", tx = %tx_hash, "execTransactionWithRole succeeded");
                    } else {
                        tracing::event!(Level::WARN, status = "failed", tx = %tx_hash, "execTransactionWithRole failed");
                    }
                }
                Confirmation::Confirmed {
                    success: receipt.success,
                }
            }
            Ok(None) => Confirmation::Pending,
            Err(error) => Confirmation::TransportError(error),
        }
    }

    /// Simulates, prices, signs and submits. Fails with [`RolesError::WouldRevert`] without
    /// signing anything if the simulation is rejected.
    pub async fn execute(
        &self,
        to: Address,
        data: &Bytes,
        overrides: &FeeOverrides,
    ) -> Result<TxHash, RolesError> {
        self.signer()?;
        if !self.simulate(to, data, BlockId::latest()).await? {
            return Err(RolesError::WouldRevert);
        }
        let fees = self.price(overrides).await?;
        let signed = self.sign(to, data, fees).await?;
        self.submit(&signed).await
    }

    /// Drives all stages, polling for the receipt, and returns the terminal state.
    ///
    /// A rejected simulation is a terminal state here rather than an error.
    pub async fn run(
        &self,
        to: Address,
        data: &Bytes,
        overrides: &FeeOverrides,
        polling: ReceiptPolling,
    ) -> Result<PipelineState, RolesError> {
        self.signer()?;
        advance(PipelineState::Built);
        if !self.simulate(to, data, BlockId::latest()).await? {
            return Ok(advance(PipelineState::Rejected));
        }
        advance(PipelineState::Simulated);
        let fees = self.price(overrides).await?;
        let signed = self.sign(to, data, fees).await?;
        advance(PipelineState::Signed {
            tx_hash: signed.tx_hash,
        });
        let tx_hash = self.submit(&signed).await?;
        advance(PipelineState::Submitted { tx_hash });

        let attempts = polling.attempts.max(1);
        for attempt in 1..=attempts {
            match self.confirm(tx_hash).await {
                Confirmation::Confirmed { success } => {
                    return Ok(advance(PipelineState::Confirmed { tx_hash, success }));
                }
                Confirmation::Pending if attempt < attempts => tokio::time::sleep(polling.interval).await,
                Confirmation::Pending => {}
                Confirmation::TransportError(source) => {
                    return Err(RolesError::Confirmation { tx_hash, source });
                }
            }
        }
        Ok(advance(PipelineState::Unresolved { tx_hash }))
    }
}

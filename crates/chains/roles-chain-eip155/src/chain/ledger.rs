use alloy_eips::BlockId;
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_transport::TransportError;
use std::sync::Arc;

/// Result of a read-only `eth_call`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// The call completed; carries the raw return data.
    Success(Bytes),
    /// The call reverted; carries whatever reason the node reported.
    Reverted(String),
}

/// Fee-relevant fields of the latest block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockFees {
    pub gas_used: u64,
    /// Zero on chains without EIP-1559.
    pub base_fee_per_gas: u64,
}

/// What the node reports about a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptSummary {
    pub transaction_hash: TxHash,
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("node returned no block for `latest`")]
    MissingBlock,
}

/// The ledger operations the Roles pipeline needs.
///
/// Implemented over an alloy [`Provider`](alloy_provider::Provider) by
/// [`Eip155LedgerClient`](crate::chain::Eip155LedgerClient); tests substitute an in-memory
/// ledger.
#[async_trait::async_trait]
pub trait LedgerClient: Send + Sync {
    /// Simulates `request` against the state at `block`.
    async fn call(&self, request: TransactionRequest, block: BlockId) -> Result<CallOutcome, LedgerError>;

    async fn chain_id(&self) -> Result<u64, LedgerError>;

    async fn max_priority_fee_per_gas(&self) -> Result<u128, LedgerError>;

    async fn latest_block_fees(&self) -> Result<BlockFees, LedgerError>;

    async fn transaction_count(&self, address: Address) -> Result<u64, LedgerError>;

    /// Broadcasts an EIP-2718 encoded signed transaction and returns its hash.
    async fn send_raw_transaction(&self, encoded: &[u8]) -> Result<TxHash, LedgerError>;

    /// `None` while the transaction is not yet mined.
    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<ReceiptSummary>, LedgerError>;
}

#[async_trait::async_trait]
impl<T: LedgerClient + ?Sized> LedgerClient for Arc<T> {
    async fn call(&self, request: TransactionRequest, block: BlockId) -> Result<CallOutcome, LedgerError> {
        (**self).call(request, block).await
    }

    async fn chain_id(&self) -> Result<u64, LedgerError> {
        (**self).chain_id().await
    }

    async fn max_priority_fee_per_gas(&self) -> Result<u128, LedgerError> {
        (**self).max_priority_fee_per_gas().await
    }

    async fn latest_block_fees(&self) -> Result<BlockFees, LedgerError> {
        (**self).latest_block_fees().await
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, LedgerError> {
        (**self).transaction_count(address).await
    }

    async fn send_raw_transaction(&self, encoded: &[u8]) -> Result<TxHash, LedgerError> {
        (**self).send_raw_transaction(encoded).await
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<ReceiptSummary>, LedgerError> {
        (**self).transaction_receipt(hash).await
    }
}

#[async_trait::async_trait]
impl<T: LedgerClient + ?Sized> LedgerClient for &T {
    async fn call(&self, request: TransactionRequest, block: BlockId) -> Result<CallOutcome, LedgerError> {
        (**self).call(request, block).await
    }

    async fn chain_id(&self) -> Result<u64, LedgerError> {
        (**self).chain_id().await
    }

    async fn max_priority_fee_per_gas(&self) -> Result<u128, LedgerError> {
        (**self).max_priority_fee_per_gas().await
    }

    async fn latest_block_fees(&self) -> Result<BlockFees, LedgerError> {
        (**self).latest_block_fees().await
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, LedgerError> {
        (**self).transaction_count(address).await
    }

    async fn send_raw_transaction(&self, encoded: &[u8]) -> Result<TxHash, LedgerError> {
        (**self).send_raw_transaction(encoded).await
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<ReceiptSummary>, LedgerError> {
        (**self).transaction_receipt(hash).await
    }
}

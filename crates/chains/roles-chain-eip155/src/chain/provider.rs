use alloy_eips::BlockId;
use alloy_primitives::{Address, TxHash};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types_eth::{BlockNumberOrTag, TransactionRequest};
use alloy_transport::TransportError;
use roles_types::chain::{ChainId, ChainProviderOps};
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::Instrument;

use crate::chain::{
    BlockFees, CallOutcome, Eip155ChainReference, LedgerClient, LedgerError, ReceiptSummary,
};

/// [`LedgerClient`] over an alloy provider.
#[derive(Debug, Clone)]
pub struct Eip155LedgerClient<P = RootProvider> {
    chain: Eip155ChainReference,
    inner: P,
}

impl Eip155LedgerClient {
    /// Connects to a JSON-RPC endpoint over HTTP.
    pub fn connect_http(chain: Eip155ChainReference, rpc_url: Url) -> Self {
        let client = RpcClient::new_http(rpc_url);
        Self::new(chain, RootProvider::new(client))
    }
}

impl<P> Eip155LedgerClient<P> {
    pub fn new(chain: Eip155ChainReference, inner: P) -> Self {
        Self { chain, inner }
    }

    pub fn chain(&self) -> &Eip155ChainReference {
        &self.chain
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P> ChainProviderOps for Eip155LedgerClient<P> {
    fn chain_id(&self) -> ChainId {
        self.chain.into()
    }
}

/// The node's revert message, if `error` is an execution revert rather than a transport failure.
fn revert_reason(error: &TransportError) -> Option<String> {
    let payload = error.as_error_resp()?;
    let reverted = payload.as_revert_data().is_some()
        || payload.message.to_ascii_lowercase().contains("revert");
    reverted.then(|| payload.message.to_string())
}

#[async_trait::async_trait]
impl<P: Provider + Send + Sync> LedgerClient for Eip155LedgerClient<P> {
    async fn call(&self, request: TransactionRequest, block: BlockId) -> Result<CallOutcome, LedgerError> {
        let call_fut = self.inner.call(request).block(block).into_future();
        #[cfg(feature = "telemetry")]
        let result = call_fut
            .instrument(tracing::info_span!(
                "eth_call",
                chain = %self.chain,
                block = %block,
                otel.kind = "client",
            ))
            .await;
        #[cfg(not(feature = "telemetry"))]
        let result = call_fut.await;
        match result {
            Ok(output) => Ok(CallOutcome::Success(output)),
            Err(error) => match revert_reason(&error) {
                Some(reason) => Ok(CallOutcome::Reverted(reason)),
                None => Err(error.into()),
            },
        }
    }

    async fn chain_id(&self) -> Result<u64, LedgerError> {
        Ok(self.inner.get_chain_id().await?)
    }

    async fn max_priority_fee_per_gas(&self) -> Result<u128, LedgerError> {
        Ok(self.inner.get_max_priority_fee_per_gas().await?)
    }

    async fn latest_block_fees(&self) -> Result<BlockFees, LedgerError> {
        let block = self
            .inner
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await?
            .ok_or(LedgerError::MissingBlock)?;
        Ok(BlockFees {
            gas_used: block.header.gas_used,
            base_fee_per_gas: block.header.base_fee_per_gas.unwrap_or_default(),
        })
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, LedgerError> {
        Ok(self.inner.get_transaction_count(address).await?)
    }

    async fn send_raw_transaction(&self, encoded: &[u8]) -> Result<TxHash, LedgerError> {
        let send_fut = self.inner.send_raw_transaction(encoded);
        #[cfg(feature = "telemetry")]
        let pending = send_fut
            .instrument(tracing::info_span!(
                "eth_sendRawTransaction",
                chain = %self.chain,
                otel.kind = "client",
            ))
            .await?;
        #[cfg(not(feature = "telemetry"))]
        let pending = send_fut.await?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<ReceiptSummary>, LedgerError> {
        let receipt = self.inner.get_transaction_receipt(hash).await?;
        Ok(receipt.map(|receipt| ReceiptSummary {
            transaction_hash: receipt.transaction_hash,
            success: receipt.status(),
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_transport::TransportErrorKind;
    use serde_json::json;

    fn error_response(payload: serde_json::Value) -> TransportError {
        TransportError::err_resp(serde_json::from_value(payload).unwrap())
    }

    #[test]
    fn revert_with_data_is_a_revert() {
        let error = error_response(json!({
            "code": 3,
            "message": "execution reverted: Unauthorized",
            "data": "0x08c379a00000000000000000000000000000000000000000000000000000000000000020000000000000000000000000000000000000000000000000000000000000000c556e617574686f72697a65640000000000000000000000000000000000000000"
        }));
        assert_eq!(
            revert_reason(&error).as_deref(),
            Some("execution reverted: Unauthorized")
        );
    }

    #[test]
    fn revert_message_without_data_is_a_revert() {
        let error = error_response(json!({
            "code": -32000,
            "message": "execution reverted"
        }));
        assert_eq!(revert_reason(&error).as_deref(), Some("execution reverted"));
    }

    #[test]
    fn node_failures_are_not_reverts() {
        let error = error_response(json!({
            "code": -32000,
            "message": "insufficient funds for gas * price + value"
        }));
        assert_eq!(revert_reason(&error), None);
        assert_eq!(revert_reason(&TransportErrorKind::backend_gone()), None);
    }
}

use alloy_eips::BlockId;
use alloy_primitives::{Address, Bytes, TxHash, keccak256};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_transport::TransportErrorKind;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::chain::{BlockFees, CallOutcome, LedgerClient, LedgerError, ReceiptSummary};

/// In-memory ledger recording every request it receives.
#[derive(Debug)]
pub struct MockLedger {
    pub chain_id: u64,
    pub priority_fee: u128,
    pub block: BlockFees,
    pub nonce: u64,
    pub call_outcome: CallOutcome,
    /// Replayed in order by `transaction_receipt`; the last entry repeats.
    pub receipts: Mutex<VecDeque<Option<bool>>>,
    pub calls: Mutex<Vec<(TransactionRequest, BlockId)>>,
    pub submitted: Mutex<Vec<Bytes>>,
    /// `send_raw_transaction` fails with a transport error instead of broadcasting.
    pub reject_submissions: bool,
    /// `transaction_receipt` fails with a transport error.
    pub fail_receipts: bool,
    pub submit_attempts: AtomicUsize,
    pub fee_queries: AtomicUsize,
    pub block_queries: AtomicUsize,
    pub nonce_queries: AtomicUsize,
    pub receipt_queries: AtomicUsize,
}

impl MockLedger {
    pub fn accepting(return_value: bool) -> Self {
        let mut word = [0u8; 32];
        word[31] = return_value as u8;
        Self::with_outcome(CallOutcome::Success(Bytes::copy_from_slice(&word)))
    }

    pub fn with_outcome(call_outcome: CallOutcome) -> Self {
        Self {
            chain_id: 100,
            priority_fee: 1_000_000_000,
            block: BlockFees {
                gas_used: 15_000_000,
                base_fee_per_gas: 7,
            },
            nonce: 42,
            call_outcome,
            receipts: Mutex::new(VecDeque::from([Some(true)])),
            calls: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            reject_submissions: false,
            fail_receipts: false,
            submit_attempts: AtomicUsize::new(0),
            fee_queries: AtomicUsize::new(0),
            block_queries: AtomicUsize::new(0),
            nonce_queries: AtomicUsize::new(0),
            receipt_queries: AtomicUsize::new(0),
        }
    }

    pub fn with_receipts(self, receipts: impl IntoIterator<Item = Option<bool>>) -> Self {
        *self.receipts.lock().unwrap() = receipts.into_iter().collect();
        self
    }

    pub fn rejecting_submissions(mut self) -> Self {
        self.reject_submissions = true;
        self
    }

    pub fn failing_receipts(mut self) -> Self {
        self.fail_receipts = true;
        self
    }

    pub fn submissions(&self) -> Vec<Bytes> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn recorded_calls(&self) -> Vec<TransactionRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(request, _)| request.clone())
            .collect()
    }

    pub fn recorded_blocks(&self) -> Vec<BlockId> {
        self.calls.lock().unwrap().iter().map(|(_, block)| *block).collect()
    }
}

#[async_trait::async_trait]
impl LedgerClient for MockLedger {
    async fn call(&self, request: TransactionRequest, block: BlockId) -> Result<CallOutcome, LedgerError> {
        self.calls.lock().unwrap().push((request, block));
        Ok(self.call_outcome.clone())
    }

    async fn chain_id(&self) -> Result<u64, LedgerError> {
        Ok(self.chain_id)
    }

    async fn max_priority_fee_per_gas(&self) -> Result<u128, LedgerError> {
        self.fee_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.priority_fee)
    }

    async fn latest_block_fees(&self) -> Result<BlockFees, LedgerError> {
        self.block_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.block)
    }

    async fn transaction_count(&self, _address: Address) -> Result<u64, LedgerError> {
        self.nonce_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.nonce)
    }

    async fn send_raw_transaction(&self, encoded: &[u8]) -> Result<TxHash, LedgerError> {
        self.submit_attempts.fetch_add(1, Ordering::SeqCst);
        if self.reject_submissions {
            return Err(TransportErrorKind::custom_str("nonce too low").into());
        }
        self.submitted
            .lock()
            .unwrap()
            .push(Bytes::copy_from_slice(encoded));
        Ok(keccak256(encoded))
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<ReceiptSummary>, LedgerError> {
        self.receipt_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_receipts {
            return Err(TransportErrorKind::custom_str("connection reset").into());
        }
        let mut receipts = self.receipts.lock().unwrap();
        let status = if receipts.len() > 1 {
            receipts.pop_front().flatten()
        } else {
            receipts.front().copied().flatten()
        };
        Ok(status.map(|success| ReceiptSummary {
            transaction_hash: hash,
            success,
            block_number: Some(1),
            gas_used: 21_000,
        }))
    }
}

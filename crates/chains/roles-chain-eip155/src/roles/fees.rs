use crate::chain::BlockFees;

/// Gas limit used when the caller does not pin one.
pub const DEFAULT_GAS_LIMIT: u64 = 500_000;

/// Caller-pinned values; anything left `None` is derived from the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeOverrides {
    pub gas_limit: Option<u64>,
    pub max_priority_fee_per_gas: Option<u128>,
    pub max_fee_per_gas: Option<u128>,
}

/// Fee fields of one signed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeParameters {
    pub gas_limit: u64,
    pub max_priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
}

/// `priority + 2 × gas_used × base_fee`, or `None` on overflow.
///
/// The block's *total* burned fee is doubled on top of the tip; the result is a generous cap,
/// not a per-gas estimate.
pub fn fee_cap(max_priority_fee_per_gas: u128, block: BlockFees) -> Option<u128> {
    u128::from(block.gas_used)
        .checked_mul(u128::from(block.base_fee_per_gas))?
        .checked_mul(2)?
        .checked_add(max_priority_fee_per_gas)
}

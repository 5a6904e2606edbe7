//! EVM chain access.
//!
//! - [`Eip155ChainReference`] - A numeric EVM chain id (e.g., `100` for Gnosis Chain)
//! - [`LedgerClient`] - The ledger operations the Roles pipeline depends on
//! - [`Eip155LedgerClient`] - [`LedgerClient`] over an alloy provider

pub mod types;

#[cfg(feature = "gateway")]
pub mod ledger;
#[cfg(feature = "gateway")]
pub mod provider;

#[cfg(all(test, feature = "gateway"))]
pub(crate) mod mock;

#[cfg(feature = "gateway")]
pub use alloy_eips::BlockId;
#[cfg(feature = "gateway")]
pub use ledger::*;
#[cfg(feature = "gateway")]
pub use provider::*;

pub use types::*;

//! Ready-made operation builders for common protocol actions.
//!
//! Each builder returns an [`OperationDescriptor`](crate::operation::OperationDescriptor) with
//! its target, signature and fixed bindings filled in; only the per-use amounts are parameters.
//! Arguments bound to the avatar are substituted when the descriptor is resolved.

pub mod erc20;
pub mod lido;

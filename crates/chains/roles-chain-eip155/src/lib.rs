//! Role-gated transaction execution on EVM chains.
//!
//! This crate turns a list of high-level contract operations into a single transaction
//! executed *through* a Zodiac Roles Modifier on behalf of an avatar (usually a Safe).
//!
//! The flow has three layers:
//!
//! 1. [`abi`] and [`operation`] encode each operation into calldata. Arguments can be fixed
//!    literals, caller-supplied values, or bound to the avatar address at resolution time.
//! 2. [`multisend`] collapses one or more normalized transactions into a single one, batching
//!    through the network's MultiSend router when there is more than one.
//! 3. [`roles`] runs the result through the Roles Modifier: simulate, price, sign, submit and
//!    confirm. A transaction the modifier would reject is never signed.
//!
//! [`operations`] ties the three together, and [`protocols`] ships ready-made operation
//! builders for common DeFi actions.
//!
//! # Feature Flags
//!
//! - `gateway` (default) - ledger access, signing and the Roles pipeline
//! - `telemetry` - tracing spans and events on every ledger interaction

pub mod abi;
pub mod chain;
pub mod multisend;
pub mod networks;
pub mod operation;
pub mod protocols;

#[cfg(feature = "gateway")]
pub mod operations;
#[cfg(feature = "gateway")]
pub mod roles;

pub use abi::{AbiType, AbiValue, EncodeError, Param, TypedSignature};
pub use networks::*;
pub use operation::{Binding, MethodCall, Operation, OperationDescriptor, Payload, TxData};

//! Solidity ABI encoding for contract calls.
//!
//! Given a method name, a [`TypedSignature`] and one [`AbiValue`] per parameter, [`encode_call`]
//! produces the calldata an EVM contract expects: the 4-byte selector followed by the
//! head/tail encoded arguments.
//!
//! ```
//! use alloy_primitives::{U256, address, hex};
//! use roles_chain_eip155::abi::{AbiValue, TypedSignature, encode_call};
//!
//! let signature = TypedSignature::parse(&[("spender", "address"), ("amount", "uint256")]).unwrap();
//! let spender = address!("0x000000000000000000000000000000000000dEaD");
//! let calldata = encode_call(
//!     "approve",
//!     &signature,
//!     &[AbiValue::from(spender), AbiValue::from(U256::from(1u64))],
//! )
//! .unwrap();
//! assert_eq!(&calldata[..4], hex!("095ea7b3"));
//! assert_eq!(calldata.len(), 4 + 2 * 32);
//! ```

mod encode;
mod types;
mod value;

pub use encode::*;
pub use types::*;
pub use value::*;

/// Errors raised while parsing signatures, resolving arguments or encoding calldata.
///
/// None of these are recoverable by retrying: each one means the operation as described
/// cannot be expressed as valid calldata.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("invalid ABI type `{0}`")]
    InvalidType(String),
    #[error("duplicate parameter name `{0}` in signature")]
    DuplicateParameter(String),
    #[error("no value supplied for parameter `{0}`")]
    MissingArgument(String),
    #[error("parameter `{0}` is bound to the avatar but no avatar address was given")]
    UnresolvedAvatar(String),
    #[error("expected {expected} arguments, got {found}")]
    ArgumentCount { expected: usize, found: usize },
    #[error("type mismatch: `{expected}` cannot hold {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("value {value} is out of range for `{ty}`")]
    IntegerOutOfRange { ty: String, value: String },
    #[error("`{ty}` takes exactly {expected} bytes, got {found}")]
    FixedBytesLength {
        ty: String,
        expected: usize,
        found: usize,
    },
    #[error("`{ty}` takes exactly {expected} elements, got {found}")]
    ArrayLength {
        ty: String,
        expected: usize,
        found: usize,
    },
    #[error("`{0}` is too large to encode")]
    TypeTooLarge(String),
    #[error("invalid `{ty}` literal: {value}")]
    InvalidLiteral { ty: String, value: String },
}

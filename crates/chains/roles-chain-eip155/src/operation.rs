//! Contract operations and their normalized transaction form.
//!
//! An [`OperationDescriptor`] says *what* to call: a target, a native value, an execution kind
//! and either a [`MethodCall`] or pre-encoded calldata. Resolving it against an avatar address
//! produces a [`TxData`], the normalized form consumed by [`multisend`](crate::multisend) and
//! the Roles gateway.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::abi::{AbiValue, EncodeError, TypedSignature, encode_call};

/// How the proxy executes a transaction: a regular call, or a delegatecall from the avatar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum Operation {
    #[default]
    Call = 0,
    DelegateCall = 1,
}

impl Operation {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Operation {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Operation::Call),
            1 => Ok(Operation::DelegateCall),
            other => Err(other),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Call => f.write_str("call"),
            Operation::DelegateCall => f.write_str("delegatecall"),
        }
    }
}

/// Where a fixed argument takes its value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Literal(AbiValue),
    /// Substituted with the avatar address when the operation is resolved.
    Avatar,
}

/// A contract method with its signature and argument bindings.
///
/// Fixed arguments are part of the operation's identity (e.g. Lido's `referral` is always the
/// zero address); call arguments are supplied per use. A fixed binding wins over a call argument
/// of the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    name: String,
    signature: TypedSignature,
    fixed: BTreeMap<String, Binding>,
    args: BTreeMap<String, AbiValue>,
}

impl MethodCall {
    pub fn new<N: Into<String>>(name: N, signature: TypedSignature) -> Self {
        Self {
            name: name.into(),
            signature,
            fixed: BTreeMap::new(),
            args: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &TypedSignature {
        &self.signature
    }

    /// Pins a parameter to a literal value.
    pub fn fixed<N: Into<String>, V: Into<AbiValue>>(mut self, name: N, value: V) -> Self {
        self.fixed.insert(name.into(), Binding::Literal(value.into()));
        self
    }

    /// Pins a parameter to the avatar address.
    pub fn bind_avatar<N: Into<String>>(mut self, name: N) -> Self {
        self.fixed.insert(name.into(), Binding::Avatar);
        self
    }

    /// Supplies a call argument.
    pub fn arg<N: Into<String>, V: Into<AbiValue>>(mut self, name: N, value: V) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    /// Orders the bound and supplied values by the signature.
    pub fn resolve_args(&self, avatar: Option<Address>) -> Result<Vec<AbiValue>, EncodeError> {
        self.signature
            .params()
            .iter()
            .map(|param| match self.fixed.get(&param.name) {
                Some(Binding::Literal(value)) => Ok(value.clone()),
                Some(Binding::Avatar) => avatar
                    .map(AbiValue::Address)
                    .ok_or_else(|| EncodeError::UnresolvedAvatar(param.name.clone())),
                None => self
                    .args
                    .get(&param.name)
                    .cloned()
                    .ok_or_else(|| EncodeError::MissingArgument(param.name.clone())),
            })
            .collect()
    }

    pub fn calldata(&self, avatar: Option<Address>) -> Result<Bytes, EncodeError> {
        let values = self.resolve_args(avatar)?;
        encode_call(&self.name, &self.signature, &values)
    }
}

/// The body of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Method(MethodCall),
    /// Pre-encoded calldata, passed through untouched.
    Calldata(Bytes),
}

/// Everything needed to produce one normalized transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub target: Address,
    pub value: U256,
    pub operation: Operation,
    pub payload: Payload,
}

impl OperationDescriptor {
    /// A plain call with zero value.
    pub fn call(target: Address, method: MethodCall) -> Self {
        Self {
            target,
            value: U256::ZERO,
            operation: Operation::Call,
            payload: Payload::Method(method),
        }
    }

    pub fn raw(target: Address, calldata: Bytes) -> Self {
        Self {
            target,
            value: U256::ZERO,
            operation: Operation::Call,
            payload: Payload::Calldata(calldata),
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    pub fn calldata(&self, avatar: Option<Address>) -> Result<Bytes, EncodeError> {
        match &self.payload {
            Payload::Method(method) => method.calldata(avatar),
            Payload::Calldata(data) => Ok(data.clone()),
        }
    }

    /// Resolves avatar bindings and encodes the calldata.
    pub fn to_tx_data(&self, avatar: Option<Address>) -> Result<TxData, EncodeError> {
        Ok(TxData {
            operation: self.operation,
            to: self.target,
            value: self.value,
            data: self.calldata(avatar)?,
        })
    }
}

/// A transaction in the form the MultiSend router and the Roles Modifier consume.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxData {
    pub operation: Operation,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

impl TxData {
    pub fn call(to: Address, data: Bytes) -> Self {
        Self {
            operation: Operation::Call,
            to,
            value: U256::ZERO,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, hex};

    const AVATAR: Address = address!("0x849D52316331967b6fF1198e5E32A0eB168D039d");
    const TOKEN: Address = address!("0x7f39C581F595B53c5cb19bD0b3f8dA6c935E2Ca0");

    fn transfer() -> MethodCall {
        MethodCall::new(
            "transfer",
            TypedSignature::parse(&[("to", "address"), ("amount", "uint256")]).unwrap(),
        )
    }

    #[test]
    fn avatar_binding_is_substituted() {
        let op = OperationDescriptor::call(TOKEN, transfer().bind_avatar("to").arg("amount", 5u64));
        let tx = op.to_tx_data(Some(AVATAR)).unwrap();
        assert_eq!(tx.to, TOKEN);
        assert_eq!(tx.value, U256::ZERO);
        assert_eq!(tx.operation, Operation::Call);
        assert_eq!(&tx.data[..4], hex!("a9059cbb"));
        assert_eq!(&tx.data[16..36], AVATAR.as_slice());
    }

    #[test]
    fn unresolved_avatar_is_an_error() {
        let op = OperationDescriptor::call(TOKEN, transfer().bind_avatar("to").arg("amount", 5u64));
        assert_eq!(
            op.to_tx_data(None).unwrap_err(),
            EncodeError::UnresolvedAvatar("to".into())
        );
    }

    #[test]
    fn missing_argument_is_an_error() {
        let op = OperationDescriptor::call(TOKEN, transfer().arg("to", AVATAR));
        assert_eq!(
            op.to_tx_data(None).unwrap_err(),
            EncodeError::MissingArgument("amount".into())
        );
    }

    #[test]
    fn fixed_binding_wins_over_argument() {
        let method = transfer()
            .fixed("to", Address::ZERO)
            .arg("to", AVATAR)
            .arg("amount", 1u64);
        let args = method.resolve_args(None).unwrap();
        assert_eq!(args[0], AbiValue::Address(Address::ZERO));
    }

    #[test]
    fn raw_calldata_passes_through() {
        let data = Bytes::from(hex!("deadbeef"));
        let op = OperationDescriptor::raw(TOKEN, data.clone())
            .with_value(U256::from(7))
            .with_operation(Operation::DelegateCall);
        let tx = op.to_tx_data(None).unwrap();
        assert_eq!(tx.data, data);
        assert_eq!(tx.value, U256::from(7));
        assert_eq!(tx.operation, Operation::DelegateCall);
    }

    #[test]
    fn operation_serde() {
        assert_eq!(serde_json::to_string(&Operation::DelegateCall).unwrap(), "\"delegateCall\"");
        assert_eq!(Operation::try_from(1u8), Ok(Operation::DelegateCall));
        assert_eq!(Operation::try_from(2u8), Err(2));
    }
}

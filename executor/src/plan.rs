//! Operation plans: a JSON list of contract calls for one avatar on one chain.
//!
//! ```json
//! {
//!   "chain": "ethereum",
//!   "avatar": "0xC01318baB7ee1f5ba734172bF7718b5DC6Ec90E1",
//!   "operations": [
//!     {
//!       "to": "0x889edC2eDab5f40e902b864aD4d7AdE8E412F9B1",
//!       "function": "requestWithdrawals",
//!       "signature": [
//!         { "name": "amounts", "type": "uint256[]" },
//!         { "name": "owner", "type": "address" }
//!       ],
//!       "args": { "amounts": ["1000"] },
//!       "bindAvatar": ["owner"]
//!     }
//!   ]
//! }
//! ```
//!
//! An operation carries either a `function` with its `signature` and `args`, or raw `data`.
//! Tuple parameters list their `components` the way Solidity JSON ABIs do.

use alloy_primitives::{Address, Bytes, U256};
use roles_chain_eip155::{
    AbiType, AbiValue, EncodeError, MethodCall, Operation, OperationDescriptor, Param, TxData,
    TypedSignature,
};
use roles_types::chain::ChainId;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("failed to read plan {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse plan: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("operation {index}: either `function` or `data` must be given, not both")]
    AmbiguousPayload { index: usize },
    #[error("operation {index}: `{name}` is not a parameter of {function}")]
    UnknownArgument {
        index: usize,
        function: String,
        name: String,
    },
    #[error("operation {index}: {source}")]
    Encode { index: usize, source: EncodeError },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub chain: ChainId,
    /// Substituted into every avatar-bound parameter.
    #[serde(default)]
    pub avatar: Option<Address>,
    pub operations: Vec<PlannedOperation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedOperation {
    pub to: Address,
    #[serde(default)]
    pub value: Option<U256>,
    #[serde(default)]
    pub operation: Operation,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub signature: Vec<ParamSpec>,
    #[serde(default)]
    pub args: Map<String, Value>,
    #[serde(default)]
    pub bind_avatar: Vec<String>,
    #[serde(default)]
    pub data: Option<Bytes>,
}

/// A parameter in Solidity JSON ABI form.
#[derive(Debug, Clone, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub components: Vec<ParamSpec>,
}

impl ParamSpec {
    pub fn to_param(&self) -> Result<Param, EncodeError> {
        if self.components.is_empty() {
            return Param::parse(self.name.clone(), &self.ty);
        }
        let invalid = || EncodeError::InvalidType(self.ty.clone());
        let mut suffix = self.ty.strip_prefix("tuple").ok_or_else(invalid)?;
        let components = self
            .components
            .iter()
            .map(ParamSpec::to_param)
            .collect::<Result<Vec<_>, _>>()?;
        let mut ty = AbiType::Tuple(components);
        while !suffix.is_empty() {
            let (len, rest) = suffix
                .strip_prefix('[')
                .and_then(|s| s.split_once(']'))
                .ok_or_else(invalid)?;
            ty = if len.is_empty() {
                AbiType::Array(Box::new(ty))
            } else {
                let len = len
                    .parse()
                    .ok()
                    .filter(|len: &usize| *len > 0)
                    .ok_or_else(invalid)?;
                AbiType::FixedArray(Box::new(ty), len)
            };
            suffix = rest;
        }
        Ok(Param::new(self.name.clone(), ty))
    }
}

impl PlannedOperation {
    pub fn to_descriptor(&self, index: usize) -> Result<OperationDescriptor, PlanError> {
        let encode = |source| PlanError::Encode { index, source };
        let descriptor = match (&self.function, &self.data) {
            (Some(_), Some(_)) => return Err(PlanError::AmbiguousPayload { index }),
            (None, data) => {
                OperationDescriptor::raw(self.to, data.clone().unwrap_or_default())
            }
            (Some(function), None) => {
                let params = self
                    .signature
                    .iter()
                    .map(ParamSpec::to_param)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(encode)?;
                let signature = TypedSignature::new(params).map_err(encode)?;
                if let Some(name) = self
                    .args
                    .keys()
                    .chain(&self.bind_avatar)
                    .find(|name| !signature.params().iter().any(|p| &p.name == *name))
                {
                    return Err(PlanError::UnknownArgument {
                        index,
                        function: function.clone(),
                        name: name.clone(),
                    });
                }
                let mut method = MethodCall::new(function.clone(), signature.clone());
                for name in &self.bind_avatar {
                    method = method.bind_avatar(name.clone());
                }
                for param in signature.params() {
                    if let Some(json) = self.args.get(&param.name) {
                        let value = AbiValue::from_json(&param.ty, json).map_err(encode)?;
                        method = method.arg(param.name.clone(), value);
                    }
                }
                OperationDescriptor::call(self.to, method)
            }
        };
        Ok(descriptor
            .with_value(self.value.unwrap_or_default())
            .with_operation(self.operation))
    }
}

impl Plan {
    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let raw = std::fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn descriptors(&self) -> Result<Vec<OperationDescriptor>, PlanError> {
        self.operations
            .iter()
            .enumerate()
            .map(|(index, operation)| operation.to_descriptor(index))
            .collect()
    }

    /// Encodes every operation for the plan's avatar.
    pub fn resolve(&self) -> Result<Vec<TxData>, PlanError> {
        self.descriptors()?
            .iter()
            .enumerate()
            .map(|(index, descriptor)| {
                descriptor
                    .to_tx_data(self.avatar)
                    .map_err(|source| PlanError::Encode { index, source })
            })
            .collect()
    }
}

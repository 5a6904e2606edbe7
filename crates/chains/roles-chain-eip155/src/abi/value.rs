use alloy_primitives::{Address, B256, Bytes, I256, U256, hex};
use serde_json::Value;
use std::str::FromStr;

use crate::abi::{AbiType, EncodeError};

/// A runtime value to be ABI-encoded against an [`AbiType`].
///
/// Arrays and tuples are positional. Integer variants are interchangeable at encoding time as
/// long as the value fits the declared type, so `AbiValue::from(1u64)` can fill an `int256`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Address(Address),
    Bool(bool),
    Uint(U256),
    Int(I256),
    FixedBytes(Bytes),
    Bytes(Bytes),
    String(String),
    /// Elements of either a fixed-size or a dynamic array.
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    pub fn tuple<I, T>(components: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<AbiValue>,
    {
        AbiValue::Tuple(components.into_iter().map(Into::into).collect())
    }

    pub fn array<I, T>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<AbiValue>,
    {
        AbiValue::Array(elements.into_iter().map(Into::into).collect())
    }

    /// Short human-readable description used in mismatch errors.
    pub fn kind(&self) -> String {
        match self {
            AbiValue::Address(address) => format!("address {address}"),
            AbiValue::Bool(value) => format!("bool {value}"),
            AbiValue::Uint(value) => format!("unsigned integer {value}"),
            AbiValue::Int(value) => format!("signed integer {value}"),
            AbiValue::FixedBytes(bytes) => format!("{} fixed bytes", bytes.len()),
            AbiValue::Bytes(bytes) => format!("{} bytes", bytes.len()),
            AbiValue::String(_) => "string".to_string(),
            AbiValue::Array(items) => format!("array of {} elements", items.len()),
            AbiValue::Tuple(items) => format!("tuple of {} components", items.len()),
        }
    }

    /// Converts a JSON value into an [`AbiValue`] of the given type.
    ///
    /// Accepted shapes:
    /// - `address`: a `0x`-prefixed hex string
    /// - integers: a JSON number, or a decimal / `0x` hex string for values beyond `u64`
    /// - `bool`: a JSON boolean
    /// - `bytes`, `bytesN`: a `0x`-prefixed hex string
    /// - `string`: a JSON string
    /// - arrays: a JSON array
    /// - tuples: a JSON array (positional) or an object keyed by component name
    pub fn from_json(ty: &AbiType, json: &Value) -> Result<AbiValue, EncodeError> {
        let mismatch = || EncodeError::TypeMismatch {
            expected: ty.to_string(),
            found: json_kind(json).to_string(),
        };
        let invalid = |value: &str| EncodeError::InvalidLiteral {
            ty: ty.to_string(),
            value: value.to_string(),
        };

        match ty {
            AbiType::Address => {
                let s = json.as_str().ok_or_else(mismatch)?;
                Address::from_str(s)
                    .map(AbiValue::Address)
                    .map_err(|_| invalid(s))
            }
            AbiType::Bool => json.as_bool().map(AbiValue::Bool).ok_or_else(mismatch),
            AbiType::Uint(_) => match json {
                Value::Number(n) => n
                    .as_u64()
                    .map(|n| AbiValue::Uint(U256::from(n)))
                    .ok_or_else(|| EncodeError::IntegerOutOfRange {
                        ty: ty.to_string(),
                        value: n.to_string(),
                    }),
                Value::String(s) => U256::from_str(s.trim())
                    .map(AbiValue::Uint)
                    .map_err(|_| invalid(s)),
                _ => Err(mismatch()),
            },
            AbiType::Int(_) => match json {
                Value::Number(n) => n
                    .as_i64()
                    .map(|n| AbiValue::Int(signed_from_i64(n)))
                    .ok_or_else(|| EncodeError::IntegerOutOfRange {
                        ty: ty.to_string(),
                        value: n.to_string(),
                    }),
                Value::String(s) => parse_signed(s.trim())
                    .map(AbiValue::Int)
                    .ok_or_else(|| invalid(s)),
                _ => Err(mismatch()),
            },
            AbiType::FixedBytes(_) | AbiType::Bytes => {
                let s = json.as_str().ok_or_else(mismatch)?;
                let bytes = Bytes::from(hex::decode(s).map_err(|_| invalid(s))?);
                Ok(match ty {
                    AbiType::Bytes => AbiValue::Bytes(bytes),
                    _ => AbiValue::FixedBytes(bytes),
                })
            }
            AbiType::String => json
                .as_str()
                .map(|s| AbiValue::String(s.to_string()))
                .ok_or_else(mismatch),
            AbiType::Array(inner) | AbiType::FixedArray(inner, _) => {
                let items = json.as_array().ok_or_else(mismatch)?;
                items
                    .iter()
                    .map(|item| AbiValue::from_json(inner, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(AbiValue::Array)
            }
            AbiType::Tuple(params) => match json {
                Value::Array(items) => items
                    .iter()
                    .zip(params)
                    .map(|(item, param)| AbiValue::from_json(&param.ty, item))
                    .collect::<Result<Vec<_>, _>>()
                    .and_then(|components| {
                        if items.len() == params.len() {
                            Ok(AbiValue::Tuple(components))
                        } else {
                            Err(EncodeError::ArrayLength {
                                ty: ty.to_string(),
                                expected: params.len(),
                                found: items.len(),
                            })
                        }
                    }),
                Value::Object(fields) => params
                    .iter()
                    .map(|param| {
                        let field = fields
                            .get(&param.name)
                            .ok_or_else(|| EncodeError::MissingArgument(param.name.clone()))?;
                        AbiValue::from_json(&param.ty, field)
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(AbiValue::Tuple),
                _ => Err(mismatch()),
            },
        }
    }
}

fn parse_signed(s: &str) -> Option<I256> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let magnitude = U256::from_str(digits).ok()?;
    let value = I256::checked_from_sign_and_abs(
        if negative {
            alloy_primitives::Sign::Negative
        } else {
            alloy_primitives::Sign::Positive
        },
        magnitude,
    )?;
    Some(value)
}

fn json_kind(json: &Value) -> &'static str {
    match json {
        Value::Null => "null",
        Value::Bool(_) => "a JSON boolean",
        Value::Number(_) => "a JSON number",
        Value::String(_) => "a JSON string",
        Value::Array(_) => "a JSON array",
        Value::Object(_) => "a JSON object",
    }
}

impl From<Address> for AbiValue {
    fn from(value: Address) -> Self {
        AbiValue::Address(value)
    }
}

impl From<bool> for AbiValue {
    fn from(value: bool) -> Self {
        AbiValue::Bool(value)
    }
}

impl From<U256> for AbiValue {
    fn from(value: U256) -> Self {
        AbiValue::Uint(value)
    }
}

impl From<I256> for AbiValue {
    fn from(value: I256) -> Self {
        AbiValue::Int(value)
    }
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for AbiValue {
            fn from(value: $t) -> Self {
                AbiValue::Uint(U256::from(value))
            }
        })*
    };
}

impl_from_unsigned!(u8, u16, u32, u64, u128);

impl From<i64> for AbiValue {
    fn from(value: i64) -> Self {
        AbiValue::Int(signed_from_i64(value))
    }
}

/// Sign and magnitude are carried separately, so every `i64` including `i64::MIN` converts.
fn signed_from_i64(value: i64) -> I256 {
    let magnitude = I256::from_raw(U256::from(value.unsigned_abs()));
    if value < 0 { -magnitude } else { magnitude }
}

impl From<B256> for AbiValue {
    fn from(value: B256) -> Self {
        AbiValue::FixedBytes(Bytes::copy_from_slice(value.as_slice()))
    }
}

impl From<Bytes> for AbiValue {
    fn from(value: Bytes) -> Self {
        AbiValue::Bytes(value)
    }
}

impl From<&str> for AbiValue {
    fn from(value: &str) -> Self {
        AbiValue::String(value.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(value: String) -> Self {
        AbiValue::String(value)
    }
}

impl<T: Into<AbiValue>> From<Vec<T>> for AbiValue {
    fn from(value: Vec<T>) -> Self {
        AbiValue::array(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};
    use serde_json::json;

    fn ty(s: &str) -> AbiType {
        s.parse().unwrap()
    }

    #[test]
    fn json_scalars() {
        assert_eq!(
            AbiValue::from_json(&ty("address"), &json!("0x000000000000000000000000000000000000dEaD"))
                .unwrap(),
            AbiValue::Address(address!("0x000000000000000000000000000000000000dEaD"))
        );
        assert_eq!(
            AbiValue::from_json(&ty("uint256"), &json!(42)).unwrap(),
            AbiValue::Uint(U256::from(42))
        );
        assert_eq!(
            AbiValue::from_json(&ty("uint256"), &json!("1000000000000000000000")).unwrap(),
            AbiValue::Uint(U256::from(10u128.pow(21)))
        );
        assert_eq!(
            AbiValue::from_json(&ty("uint256"), &json!("0xff")).unwrap(),
            AbiValue::Uint(U256::from(255))
        );
        assert_eq!(
            AbiValue::from_json(&ty("int256"), &json!(-7)).unwrap(),
            AbiValue::Int(I256::try_from(-7i64).unwrap())
        );
        assert_eq!(
            AbiValue::from_json(&ty("int128"), &json!("-12")).unwrap(),
            AbiValue::Int(I256::try_from(-12i64).unwrap())
        );
        assert_eq!(
            AbiValue::from_json(&ty("bytes32"), &json!(format!("0x{}", "11".repeat(32)))).unwrap(),
            AbiValue::from(b256!(
                "0x1111111111111111111111111111111111111111111111111111111111111111"
            ))
        );
    }

    #[test]
    fn signed_integers_keep_their_value() {
        let min: I256 = "-9223372036854775808".parse().unwrap();
        assert_eq!(AbiValue::from(i64::MIN), AbiValue::Int(min));
        assert_eq!(AbiValue::from(-1i64), AbiValue::Int(I256::MINUS_ONE));
        assert_eq!(AbiValue::from(42i64), AbiValue::Int(I256::try_from(42).unwrap()));
        assert_eq!(
            AbiValue::from_json(&ty("int64"), &json!(i64::MIN)).unwrap(),
            AbiValue::Int(min)
        );
        assert_eq!(
            AbiValue::from_json(&ty("int256"), &json!(-7)).unwrap(),
            AbiValue::Int(I256::try_from(-7).unwrap())
        );
    }

    #[test]
    fn json_rejects_wrong_shapes() {
        assert!(matches!(
            AbiValue::from_json(&ty("address"), &json!(1)),
            Err(EncodeError::TypeMismatch { .. })
        ));
        assert!(matches!(
            AbiValue::from_json(&ty("address"), &json!("0x1234")),
            Err(EncodeError::InvalidLiteral { .. })
        ));
        assert!(matches!(
            AbiValue::from_json(&ty("uint256"), &json!(-1)),
            Err(EncodeError::IntegerOutOfRange { .. })
        ));
        assert!(matches!(
            AbiValue::from_json(&ty("bytes"), &json!("zz")),
            Err(EncodeError::InvalidLiteral { .. })
        ));
    }

    #[test]
    fn json_tuples_by_position_and_name() {
        let permit = ty("(uint256,uint8)");
        assert_eq!(
            AbiValue::from_json(&permit, &json!([5, 27])).unwrap(),
            AbiValue::tuple([5u64, 27u64])
        );

        let named = AbiType::Tuple(vec![
            crate::abi::Param::parse("value", "uint256").unwrap(),
            crate::abi::Param::parse("v", "uint8").unwrap(),
        ]);
        assert_eq!(
            AbiValue::from_json(&named, &json!({"v": 27, "value": 5})).unwrap(),
            AbiValue::tuple([5u64, 27u64])
        );
        assert_eq!(
            AbiValue::from_json(&named, &json!({"value": 5})).unwrap_err(),
            EncodeError::MissingArgument("v".into())
        );
        assert!(matches!(
            AbiValue::from_json(&permit, &json!([5])),
            Err(EncodeError::ArrayLength { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn json_arrays() {
        assert_eq!(
            AbiValue::from_json(&ty("uint256[]"), &json!([1, 2, 3])).unwrap(),
            AbiValue::from(vec![1u64, 2, 3])
        );
    }
}

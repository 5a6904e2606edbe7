use alloy_primitives::{Bytes, FixedBytes, U256, keccak256};

use crate::abi::{AbiType, AbiValue, EncodeError, TypedSignature};

const WORD: usize = 32;

/// First four bytes of `keccak256` over the canonical method string.
pub fn selector(method: &str, signature: &TypedSignature) -> FixedBytes<4> {
    let hash = keccak256(signature.canonical(method).as_bytes());
    FixedBytes::from_slice(&hash[..4])
}

/// ABI-encodes `values` as a parameter sequence, without a selector.
pub fn encode_params(signature: &TypedSignature, values: &[AbiValue]) -> Result<Vec<u8>, EncodeError> {
    if signature.len() != values.len() {
        return Err(EncodeError::ArgumentCount {
            expected: signature.len(),
            found: values.len(),
        });
    }
    let items: Vec<(&AbiType, &AbiValue)> = signature
        .params()
        .iter()
        .map(|p| &p.ty)
        .zip(values)
        .collect();
    let mut out = Vec::new();
    encode_sequence(&items, &mut out)?;
    Ok(out)
}

/// Selector followed by the encoded arguments.
pub fn encode_call(
    method: &str,
    signature: &TypedSignature,
    values: &[AbiValue],
) -> Result<Bytes, EncodeError> {
    let params = encode_params(signature, values)?;
    let mut calldata = Vec::with_capacity(4 + params.len());
    calldata.extend_from_slice(selector(method, signature).as_slice());
    calldata.extend_from_slice(&params);
    Ok(calldata.into())
}

/// Head/tail encoding of a sequence. Offsets are relative to the start of this sequence.
///
/// Every item is encoded before the head is laid out, so the head is sized from the values
/// actually given rather than from their declared types.
fn encode_sequence(items: &[(&AbiType, &AbiValue)], out: &mut Vec<u8>) -> Result<(), EncodeError> {
    let mut encoded = Vec::with_capacity(items.len());
    for (ty, value) in items {
        let mut buf = Vec::new();
        encode_value(ty, value, &mut buf)?;
        encoded.push((ty.is_dynamic(), buf));
    }
    let head_len: usize = encoded
        .iter()
        .map(|(dynamic, buf)| if *dynamic { WORD } else { buf.len() })
        .sum();
    let mut tail = Vec::new();
    for (dynamic, buf) in &encoded {
        if *dynamic {
            push_word(out, U256::from(head_len + tail.len()));
            tail.extend_from_slice(buf);
        } else {
            out.extend_from_slice(buf);
        }
    }
    out.extend_from_slice(&tail);
    Ok(())
}

fn encode_value(ty: &AbiType, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    let mismatch = || EncodeError::TypeMismatch {
        expected: ty.to_string(),
        found: value.kind(),
    };
    match ty {
        AbiType::Address => match value {
            AbiValue::Address(address) => {
                out.extend_from_slice(&[0u8; 12]);
                out.extend_from_slice(address.as_slice());
                Ok(())
            }
            _ => Err(mismatch()),
        },
        AbiType::Bool => match value {
            AbiValue::Bool(flag) => {
                push_word(out, U256::from(*flag as u8));
                Ok(())
            }
            _ => Err(mismatch()),
        },
        AbiType::Uint(bits) => {
            let word = match value {
                AbiValue::Uint(v) => *v,
                AbiValue::Int(v) if !v.is_negative() => v.into_raw(),
                AbiValue::Int(v) => return Err(out_of_range(ty, v)),
                _ => return Err(mismatch()),
            };
            if *bits < 256 && (word >> *bits) != U256::ZERO {
                return Err(out_of_range(ty, &word));
            }
            push_word(out, word);
            Ok(())
        }
        AbiType::Int(bits) => {
            let raw = match value {
                AbiValue::Int(v) => v.into_raw(),
                AbiValue::Uint(v) => {
                    // Non-negative and must leave the sign bit clear.
                    if v.bit(255) {
                        return Err(out_of_range(ty, v));
                    }
                    *v
                }
                _ => return Err(mismatch()),
            };
            if *bits < 256 {
                // In range iff everything from the sign bit up is a copy of it.
                let upper = raw >> (*bits - 1);
                if upper != U256::ZERO && upper != (U256::MAX >> (*bits - 1)) {
                    return Err(out_of_range(ty, &alloy_primitives::I256::from_raw(raw)));
                }
            }
            push_word(out, raw);
            Ok(())
        }
        AbiType::FixedBytes(len) => match value {
            AbiValue::FixedBytes(bytes) | AbiValue::Bytes(bytes) => {
                if bytes.len() != *len {
                    return Err(EncodeError::FixedBytesLength {
                        ty: ty.to_string(),
                        expected: *len,
                        found: bytes.len(),
                    });
                }
                push_padded(out, bytes);
                Ok(())
            }
            _ => Err(mismatch()),
        },
        AbiType::Bytes => match value {
            AbiValue::Bytes(bytes) | AbiValue::FixedBytes(bytes) => {
                push_word(out, U256::from(bytes.len()));
                push_padded(out, bytes);
                Ok(())
            }
            _ => Err(mismatch()),
        },
        AbiType::String => match value {
            AbiValue::String(s) => {
                push_word(out, U256::from(s.len()));
                push_padded(out, s.as_bytes());
                Ok(())
            }
            _ => Err(mismatch()),
        },
        AbiType::FixedArray(inner, len) => match value {
            AbiValue::Array(items) => {
                if items.len() != *len {
                    return Err(EncodeError::ArrayLength {
                        ty: ty.to_string(),
                        expected: *len,
                        found: items.len(),
                    });
                }
                let items: Vec<_> = items.iter().map(|item| (inner.as_ref(), item)).collect();
                encode_sequence(&items, out)
            }
            _ => Err(mismatch()),
        },
        AbiType::Array(inner) => match value {
            AbiValue::Array(items) => {
                push_word(out, U256::from(items.len()));
                let items: Vec<_> = items.iter().map(|item| (inner.as_ref(), item)).collect();
                encode_sequence(&items, out)
            }
            _ => Err(mismatch()),
        },
        AbiType::Tuple(params) => match value {
            AbiValue::Tuple(items) => {
                if items.len() != params.len() {
                    return Err(EncodeError::ArrayLength {
                        ty: ty.to_string(),
                        expected: params.len(),
                        found: items.len(),
                    });
                }
                let items: Vec<_> = params.iter().map(|p| &p.ty).zip(items).collect();
                encode_sequence(&items, out)
            }
            _ => Err(mismatch()),
        },
    }
}

fn out_of_range(ty: &AbiType, value: &impl std::fmt::Display) -> EncodeError {
    EncodeError::IntegerOutOfRange {
        ty: ty.to_string(),
        value: value.to_string(),
    }
}

fn push_word(out: &mut Vec<u8>, word: U256) {
    out.extend_from_slice(&word.to_be_bytes::<WORD>());
}

/// Appends `bytes` right-padded with zeros to a word boundary.
fn push_padded(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(bytes);
    let rem = bytes.len() % WORD;
    if rem != 0 {
        out.resize(out.len() + WORD - rem, 0);
    }
}

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::abi::EncodeError;

/// A Solidity ABI type.
///
/// Parsed from its textual form (`"uint256"`, `"address[]"`, `"(uint256,bytes32)"`). The
/// shorthands `uint` and `int` are normalized to their 256-bit forms, so [`Display`](fmt::Display)
/// always yields the canonical name used in selector hashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    Address,
    Bool,
    /// Unsigned integer with the given bit width (8..=256, multiple of 8).
    Uint(usize),
    /// Signed integer with the given bit width (8..=256, multiple of 8).
    Int(usize),
    /// `bytesN` with N in 1..=32.
    FixedBytes(usize),
    Bytes,
    String,
    FixedArray(Box<AbiType>, usize),
    Array(Box<AbiType>),
    Tuple(Vec<Param>),
}

impl AbiType {
    /// Whether values of this type are encoded out-of-line, behind an offset word.
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::FixedArray(inner, _) => inner.is_dynamic(),
            AbiType::Tuple(params) => params.iter().any(|p| p.ty.is_dynamic()),
            AbiType::Address
            | AbiType::Bool
            | AbiType::Uint(_)
            | AbiType::Int(_)
            | AbiType::FixedBytes(_) => false,
        }
    }

    /// Number of 32-byte words this type occupies in the head of its enclosing sequence.
    ///
    /// Dynamic types take a single offset word; static composites are inlined. Fails with
    /// [`EncodeError::TypeTooLarge`] when the count does not fit in a `usize`.
    pub fn head_words(&self) -> Result<usize, EncodeError> {
        if self.is_dynamic() {
            return Ok(1);
        }
        let too_large = || EncodeError::TypeTooLarge(self.to_string());
        match self {
            AbiType::FixedArray(inner, len) => {
                inner.head_words()?.checked_mul(*len).ok_or_else(too_large)
            }
            AbiType::Tuple(params) => params.iter().try_fold(0usize, |total, p| {
                total.checked_add(p.ty.head_words()?).ok_or_else(too_large)
            }),
            _ => Ok(1),
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Address => f.write_str("address"),
            AbiType::Bool => f.write_str("bool"),
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::Int(bits) => write!(f, "int{bits}"),
            AbiType::FixedBytes(len) => write!(f, "bytes{len}"),
            AbiType::Bytes => f.write_str("bytes"),
            AbiType::String => f.write_str("string"),
            AbiType::FixedArray(inner, len) => write!(f, "{inner}[{len}]"),
            AbiType::Array(inner) => write!(f, "{inner}[]"),
            AbiType::Tuple(params) => {
                f.write_str("(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", param.ty)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl FromStr for AbiType {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || EncodeError::InvalidType(s.to_string());

        if let Some(stripped) = s.strip_suffix(']') {
            let open = stripped.rfind('[').ok_or_else(invalid)?;
            let inner: AbiType = stripped[..open].parse()?;
            let dimension = &stripped[open + 1..];
            if dimension.is_empty() {
                return Ok(AbiType::Array(Box::new(inner)));
            }
            let len: usize = dimension.parse().map_err(|_| invalid())?;
            if len == 0 {
                return Err(invalid());
            }
            return Ok(AbiType::FixedArray(Box::new(inner), len));
        }

        let tuple_body = s
            .strip_prefix("tuple")
            .unwrap_or(s)
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'));
        if let Some(body) = tuple_body {
            let params = split_top_level(body)
                .ok_or_else(invalid)?
                .into_iter()
                .map(|component| component.parse().map(|ty| Param::new("", ty)))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(AbiType::Tuple(params));
        }

        match s {
            "address" => return Ok(AbiType::Address),
            "bool" => return Ok(AbiType::Bool),
            "bytes" => return Ok(AbiType::Bytes),
            "string" => return Ok(AbiType::String),
            "uint" => return Ok(AbiType::Uint(256)),
            "int" => return Ok(AbiType::Int(256)),
            _ => {}
        }

        if let Some(bits) = s.strip_prefix("uint") {
            return parse_bits(bits).map(AbiType::Uint).ok_or_else(invalid);
        }
        if let Some(bits) = s.strip_prefix("int") {
            return parse_bits(bits).map(AbiType::Int).ok_or_else(invalid);
        }
        if let Some(len) = s.strip_prefix("bytes") {
            if len.starts_with('0') || len.starts_with('+') {
                return Err(invalid());
            }
            return match len.parse::<usize>() {
                Ok(len) if (1..=32).contains(&len) => Ok(AbiType::FixedBytes(len)),
                _ => Err(invalid()),
            };
        }
        Err(invalid())
    }
}

fn parse_bits(bits: &str) -> Option<usize> {
    // Reject leading zeros and signs so `uint08` does not alias `uint8`.
    if bits.starts_with('0') || bits.starts_with('+') {
        return None;
    }
    let bits: usize = bits.parse().ok()?;
    (bits % 8 == 0 && (8..=256).contains(&bits)).then_some(bits)
}

/// Splits a tuple body on commas that are not nested inside parentheses or brackets.
///
/// Returns `None` on unbalanced input. An empty body yields no components.
fn split_top_level(body: &str) -> Option<Vec<&str>> {
    if body.trim().is_empty() {
        return Some(Vec::new());
    }
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&body[start..]);
    Some(parts)
}

/// A named, typed parameter. Tuple components are params too, possibly with empty names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: String,
    pub ty: AbiType,
}

impl Param {
    pub fn new<N: Into<String>>(name: N, ty: AbiType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Parses the type from its textual form.
    pub fn parse<N: Into<String>>(name: N, ty: &str) -> Result<Self, EncodeError> {
        Ok(Self::new(name, ty.parse()?))
    }

    /// A tuple parameter with named components.
    pub fn tuple<N: Into<String>>(name: N, components: Vec<Param>) -> Self {
        Self::new(name, AbiType::Tuple(components))
    }
}

/// Ordered parameter list of a contract method.
///
/// Names are unique within each level: the top-level list and every tuple's components.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypedSignature {
    params: Vec<Param>,
}

impl TypedSignature {
    pub fn new(params: Vec<Param>) -> Result<Self, EncodeError> {
        check_unique(&params)?;
        Ok(Self { params })
    }

    /// Builds a signature from `(name, type)` pairs.
    pub fn parse(pairs: &[(&str, &str)]) -> Result<Self, EncodeError> {
        let params = pairs
            .iter()
            .map(|(name, ty)| Param::parse(*name, ty))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(params)
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The canonical `name(type1,type2,...)` string hashed into the selector.
    pub fn canonical(&self, method: &str) -> String {
        let types = self
            .params
            .iter()
            .map(|p| p.ty.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!("{method}({types})")
    }
}

fn check_unique(params: &[Param]) -> Result<(), EncodeError> {
    let mut seen = HashSet::new();
    for param in params {
        if !param.name.is_empty() && !seen.insert(param.name.as_str()) {
            return Err(EncodeError::DuplicateParameter(param.name.clone()));
        }
        check_nested(&param.ty)?;
    }
    Ok(())
}

fn check_nested(ty: &AbiType) -> Result<(), EncodeError> {
    match ty {
        AbiType::Tuple(components) => check_unique(components),
        AbiType::Array(inner) | AbiType::FixedArray(inner, _) => check_nested(inner),
        _ => Ok(()),
    }
}

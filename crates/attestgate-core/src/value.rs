//! Typed field values for schema encoding.
//!
//! Schema shape is data, not a compile-time type, so values are carried in a
//! runtime enum and checked against the declared field type before encoding.

use alloy_primitives::{Address, B256, U256};
use serde::ser::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;

/// A field mapping, ordered by name for canonical JSON output.
pub type FieldMap = BTreeMap<String, Value>;

/// Declared type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Unsigned integer of the given bit width (8..=256, multiples of 8).
    Uint(usize),
    Bool,
    Address,
    Bytes32,
    String,
    Bytes,
}

impl FieldType {
    /// Whether this type needs tail-encoded (variable-length) data.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, FieldType::String | FieldType::Bytes)
    }
}

impl FromStr for FieldType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bool" => return Ok(FieldType::Bool),
            "address" => return Ok(FieldType::Address),
            "bytes32" => return Ok(FieldType::Bytes32),
            "string" => return Ok(FieldType::String),
            "bytes" => return Ok(FieldType::Bytes),
            _ => {}
        }
        if let Some(width) = s.strip_prefix("uint") {
            let bits: usize = width
                .parse()
                .map_err(|_| CodecError::UnknownFieldType(s.to_string()))?;
            if bits == 0 || bits > 256 || bits % 8 != 0 {
                return Err(CodecError::UnknownFieldType(s.to_string()));
            }
            return Ok(FieldType::Uint(bits));
        }
        Err(CodecError::UnknownFieldType(s.to_string()))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Uint(bits) => write!(f, "uint{}", bits),
            FieldType::Bool => write!(f, "bool"),
            FieldType::Address => write!(f, "address"),
            FieldType::Bytes32 => write!(f, "bytes32"),
            FieldType::String => write!(f, "string"),
            FieldType::Bytes => write!(f, "bytes"),
        }
    }
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Uint(U256),
    Bool(bool),
    Address(Address),
    Bytes32(B256),
    String(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Whether this value can be encoded as the given field type.
    pub fn matches(&self, ty: &FieldType) -> bool {
        match (self, ty) {
            (Value::Uint(v), FieldType::Uint(bits)) => uint_fits(v, *bits),
            (Value::Bool(_), FieldType::Bool) => true,
            (Value::Address(_), FieldType::Address) => true,
            (Value::Bytes32(_), FieldType::Bytes32) => true,
            (Value::String(_), FieldType::String) => true,
            (Value::Bytes(_), FieldType::Bytes) => true,
            _ => false,
        }
    }

    /// The name of this value's own type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Uint(_) => "uint",
            Value::Bool(_) => "bool",
            Value::Address(_) => "address",
            Value::Bytes32(_) => "bytes32",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
        }
    }

    /// Coerce a JSON value into a typed value, guided by the declared type.
    ///
    /// Uints accept decimal strings (256-bit values do not survive JSON
    /// numbers) as well as plain numbers.
    pub fn from_json(ty: FieldType, json: &serde_json::Value) -> Result<Self, CodecError> {
        let mismatch = |got: &str| CodecError::Decoding(format!("expected {ty}, got {got}"));
        match ty {
            FieldType::Uint(bits) => {
                let value = match json {
                    serde_json::Value::String(s) => U256::from_str(s)
                        .map_err(|_| CodecError::Decoding(format!("invalid uint: {s:?}")))?,
                    serde_json::Value::Number(n) => {
                        let v = n
                            .as_u64()
                            .ok_or_else(|| mismatch("non-integer number"))?;
                        U256::from(v)
                    }
                    other => return Err(mismatch(json_kind(other))),
                };
                if !uint_fits(&value, bits) {
                    return Err(CodecError::Decoding(format!(
                        "value {value} out of range for uint{bits}"
                    )));
                }
                Ok(Value::Uint(value))
            }
            FieldType::Bool => match json {
                serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
                serde_json::Value::String(s) if s == "true" => Ok(Value::Bool(true)),
                serde_json::Value::String(s) if s == "false" => Ok(Value::Bool(false)),
                other => Err(mismatch(json_kind(other))),
            },
            FieldType::Address => {
                let s = json.as_str().ok_or_else(|| mismatch(json_kind(json)))?;
                Address::from_str(s)
                    .map(Value::Address)
                    .map_err(|_| CodecError::Decoding(format!("invalid address: {s:?}")))
            }
            FieldType::Bytes32 => {
                let s = json.as_str().ok_or_else(|| mismatch(json_kind(json)))?;
                B256::from_str(s)
                    .map(Value::Bytes32)
                    .map_err(|_| CodecError::Decoding(format!("invalid bytes32: {s:?}")))
            }
            FieldType::String => json
                .as_str()
                .map(|s| Value::String(s.to_string()))
                .ok_or_else(|| mismatch(json_kind(json))),
            FieldType::Bytes => {
                let s = json.as_str().ok_or_else(|| mismatch(json_kind(json)))?;
                let stripped = s.strip_prefix("0x").unwrap_or(s);
                hex::decode(stripped)
                    .map(Value::Bytes)
                    .map_err(|_| CodecError::Decoding(format!("invalid bytes: {s:?}")))
            }
        }
    }

    /// Parse a value from prompt text, guided by the declared type.
    pub fn from_text(ty: FieldType, text: &str) -> Result<Self, CodecError> {
        Self::from_json(ty, &serde_json::Value::String(text.trim().to_string()))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Uint(v) => serializer.serialize_str(&v.to_string()),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Address(a) => serializer.serialize_str(&a.to_checksum(None)),
            Value::Bytes32(b) => serializer.serialize_str(&format!("0x{}", hex::encode(b))),
            Value::String(s) => serializer.serialize_str(s),
            Value::Bytes(b) => serializer.serialize_str(&format!("0x{}", hex::encode(b))),
        }
    }
}

fn uint_fits(value: &U256, bits: usize) -> bool {
    if bits >= 256 {
        return true;
    }
    *value < (U256::from(1u8) << bits)
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

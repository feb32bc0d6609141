//! Schema descriptors and the field codec built on them.
//!
//! A descriptor body is a comma-separated list of `"type name"` pairs. Field
//! order in the body defines field order for both encoding and decoding;
//! names must be unique within one schema.

use std::str::FromStr;

use crate::abi;
use crate::error::{CodecError, Result};
use crate::types::SchemaUid;
use crate::value::{FieldMap, FieldType, Value};

/// A registered schema: its uid plus the field list body.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SchemaDescriptor {
    pub uid: SchemaUid,
    pub schema: String,
}

/// One parsed `"type name"` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub ty: FieldType,
    pub name: String,
}

impl SchemaDescriptor {
    pub fn new(uid: SchemaUid, schema: impl Into<String>) -> Self {
        Self {
            uid,
            schema: schema.into(),
        }
    }

    /// Parse the body into the ordered field list.
    pub fn fields(&self) -> Result<Vec<SchemaField>> {
        parse_fields(&self.schema)
    }
}

/// Parse a descriptor body into its ordered field list.
pub fn parse_fields(schema: &str) -> Result<Vec<SchemaField>> {
    let mut fields = Vec::new();
    for entry in schema.split(',') {
        let entry = entry.trim();
        let mut parts = entry.split_whitespace();
        let (ty, name) = match (parts.next(), parts.next(), parts.next()) {
            (Some(ty), Some(name), None) => (ty, name),
            _ => return Err(CodecError::MalformedField(entry.to_string())),
        };
        let ty = FieldType::from_str(ty)?;
        if fields.iter().any(|f: &SchemaField| f.name == name) {
            return Err(CodecError::DuplicateField(name.to_string()));
        }
        fields.push(SchemaField {
            ty,
            name: name.to_string(),
        });
    }
    if fields.is_empty() {
        return Err(CodecError::MalformedField(schema.to_string()));
    }
    Ok(fields)
}

/// Encode a field mapping against a descriptor.
///
/// Every declared field must be present; absent fields are all reported at
/// once and nothing is encoded. The encoded bytes are decoded back and
/// compared before being returned, so garbage is never handed to the caller
/// for submission.
pub fn encode(descriptor: &SchemaDescriptor, data: &FieldMap) -> Result<Vec<u8>> {
    let fields = descriptor.fields()?;

    let missing: Vec<String> = fields
        .iter()
        .filter(|f| !data.contains_key(&f.name))
        .map(|f| f.name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(CodecError::MissingFields(missing));
    }

    let mut ordered = Vec::with_capacity(fields.len());
    for field in &fields {
        let value = &data[&field.name];
        if !value.matches(&field.ty) {
            return Err(CodecError::TypeMismatch {
                field: field.name.clone(),
                expected: field.ty.to_string(),
                got: value.type_name().to_string(),
            });
        }
        ordered.push((field.ty, value.clone()));
    }

    let encoded = abi::encode(&ordered)?;

    // Round-trip validation: the bytes must decode back to the same values.
    let types: Vec<FieldType> = fields.iter().map(|f| f.ty).collect();
    let decoded = abi::decode(&types, &encoded)
        .map_err(|e| CodecError::Encoding(format!("invalid data: {e}")))?;
    let values: Vec<Value> = ordered.into_iter().map(|(_, v)| v).collect();
    if decoded != values {
        return Err(CodecError::Encoding("invalid data".to_string()));
    }

    Ok(encoded)
}

/// Decode bytes against a descriptor, returning the field mapping.
///
/// The bytes must be the canonical encoding of the recovered values; any
/// surplus or non-canonical layout is a decoding error.
pub fn decode(descriptor: &SchemaDescriptor, data: &[u8]) -> Result<FieldMap> {
    let fields = descriptor.fields()?;
    let types: Vec<FieldType> = fields.iter().map(|f| f.ty).collect();
    let values = abi::decode(&types, data)?;

    let ordered: Vec<(FieldType, Value)> = types.iter().copied().zip(values.clone()).collect();
    let canonical = abi::encode(&ordered)
        .map_err(|e| CodecError::Decoding(format!("re-encoding failed: {e}")))?;
    if canonical != data {
        return Err(CodecError::Decoding(
            "data is not a canonical encoding for this schema".to_string(),
        ));
    }

    Ok(fields
        .into_iter()
        .map(|f| f.name)
        .zip(values)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    fn descriptor(body: &str) -> SchemaDescriptor {
        SchemaDescriptor::new(SchemaUid::ZERO, body)
    }

    #[test]
    fn test_parse_fields_ordered() {
        let fields = parse_fields("uint256 age,string name").unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "age");
        assert_eq!(fields[0].ty, FieldType::Uint(256));
        assert_eq!(fields[1].name, "name");
        assert_eq!(fields[1].ty, FieldType::String);
    }

    #[test]
    fn test_parse_fields_tolerates_spacing() {
        let fields = parse_fields(" uint256 age , string name ").unwrap();
        assert_eq!(fields[1].name, "name");
    }

    #[test]
    fn test_parse_rejects_duplicates() {
        let err = parse_fields("uint256 x,string x").unwrap_err();
        assert!(matches!(err, CodecError::DuplicateField(_)));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_fields("uint256").is_err());
        assert!(parse_fields("").is_err());
        assert!(parse_fields("uint256 a b").is_err());
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let desc = descriptor("uint256 age,string name");
        let mut data = FieldMap::new();
        data.insert("age".into(), Value::Uint(U256::from(30u64)));
        data.insert("name".into(), Value::String("Alice".into()));

        let encoded = encode(&desc, &data).unwrap();
        let decoded = decode(&desc, &encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_missing_fields_all_reported() {
        let desc = descriptor("uint256 age,string name,bool active");
        let mut data = FieldMap::new();
        data.insert("name".into(), Value::String("Alice".into()));

        match encode(&desc, &data).unwrap_err() {
            CodecError::MissingFields(names) => {
                assert_eq!(names, vec!["age".to_string(), "active".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_type_mismatch_reports_field() {
        let desc = descriptor("uint256 age");
        let mut data = FieldMap::new();
        data.insert("age".into(), Value::String("thirty".into()));

        match encode(&desc, &data).unwrap_err() {
            CodecError::TypeMismatch { field, .. } => assert_eq!(field, "age"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extra_fields_ignored() {
        let desc = descriptor("string name");
        let mut data = FieldMap::new();
        data.insert("name".into(), Value::String("Alice".into()));
        data.insert("extra".into(), Value::Bool(true));

        let encoded = encode(&desc, &data).unwrap();
        let decoded = decode(&desc, &encoded).unwrap();
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn test_decode_rejects_surplus_bytes() {
        let desc = descriptor("uint256 age");
        let mut data = FieldMap::new();
        data.insert("age".into(), Value::Uint(U256::from(1u64)));

        let mut encoded = encode(&desc, &data).unwrap();
        encoded.extend_from_slice(&[0u8; 32]);
        assert!(decode(&desc, &encoded).is_err());
    }

    #[test]
    fn test_decode_rejects_wrong_schema() {
        let desc = descriptor("string name");
        let mut data = FieldMap::new();
        data.insert("name".into(), Value::String("Alice".into()));
        let encoded = encode(&desc, &data).unwrap();

        let other = descriptor("bool a,bool b,bool c");
        assert!(decode(&other, &encoded).is_err());
    }
}

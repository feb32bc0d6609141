//! The encryption envelope: how a gated payload is stored on-chain.
//!
//! A gated attestation is not encoded against its caller-chosen schema.
//! Instead it is encoded against a well-known meta-schema that carries the
//! ciphertext, the plaintext digest, the serialized access conditions, and
//! the uid of the schema the plaintext was really meant for.

use serde::{Deserialize, Serialize};

use crate::conditions::{self, ConditionNode};
use crate::error::{CodecError, ConditionError, Result};
use crate::types::SchemaUid;
use crate::value::{FieldMap, Value};

/// Body of the well-known encryption meta-schema.
pub const ENCRYPTION_SCHEMA: &str =
    "string encryptedData,string hash,string conditions,string schema";

/// A gated payload as stored in an attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedEnvelope {
    /// Opaque ciphertext from the threshold-encryption network.
    pub encrypted_data: String,

    /// Integrity digest of the plaintext, as issued at encryption time.
    pub hash: String,

    /// The serialized flat access-condition list.
    pub conditions: String,

    /// Hex uid of the schema the plaintext was encoded for.
    pub schema: String,
}

impl EncryptedEnvelope {
    /// Field mapping for encoding against [`ENCRYPTION_SCHEMA`].
    pub fn to_field_map(&self) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert(
            "encryptedData".to_string(),
            Value::String(self.encrypted_data.clone()),
        );
        map.insert("hash".to_string(), Value::String(self.hash.clone()));
        map.insert(
            "conditions".to_string(),
            Value::String(self.conditions.clone()),
        );
        map.insert("schema".to_string(), Value::String(self.schema.clone()));
        map
    }

    /// Reinterpret decoded fields as an envelope.
    ///
    /// A payload that was never gated will not have this shape; that is a
    /// decoding error, never a silent pass-through of corrupted data.
    pub fn from_field_map(map: &FieldMap) -> Result<Self> {
        let field = |name: &str| -> Result<String> {
            match map.get(name) {
                Some(Value::String(s)) => Ok(s.clone()),
                Some(other) => Err(CodecError::Decoding(format!(
                    "envelope field {name} has type {}, expected string",
                    other.type_name()
                ))),
                None => Err(CodecError::Decoding(format!(
                    "not an encryption envelope: missing field {name}"
                ))),
            }
        };
        Ok(Self {
            encrypted_data: field("encryptedData")?,
            hash: field("hash")?,
            conditions: field("conditions")?,
            schema: field("schema")?,
        })
    }

    /// Parse the serialized condition list.
    pub fn condition_nodes(&self) -> std::result::Result<Vec<ConditionNode>, ConditionError> {
        conditions::parse_nodes(&self.conditions)
    }

    /// Parse the original schema uid, if one was recorded.
    pub fn original_schema(&self) -> Option<SchemaUid> {
        if self.schema.is_empty() {
            return None;
        }
        SchemaUid::from_hex(&self.schema).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::balance_gate;
    use crate::schema::{self, SchemaDescriptor};

    fn sample() -> EncryptedEnvelope {
        let nodes = vec![ConditionNode::condition(balance_gate())];
        EncryptedEnvelope {
            encrypted_data: "b64ciphertext".to_string(),
            hash: "deadbeef".to_string(),
            conditions: conditions::serialize_nodes(&nodes).unwrap(),
            schema: SchemaUid::from_bytes([7u8; 32]).to_hex(),
        }
    }

    #[test]
    fn test_field_map_roundtrip() {
        let envelope = sample();
        let map = envelope.to_field_map();
        let recovered = EncryptedEnvelope::from_field_map(&map).unwrap();
        assert_eq!(recovered, envelope);
    }

    #[test]
    fn test_encodes_against_meta_schema() {
        let envelope = sample();
        let descriptor = SchemaDescriptor::new(SchemaUid::ZERO, ENCRYPTION_SCHEMA);
        let encoded = schema::encode(&descriptor, &envelope.to_field_map()).unwrap();
        let decoded = schema::decode(&descriptor, &encoded).unwrap();
        assert_eq!(EncryptedEnvelope::from_field_map(&decoded).unwrap(), envelope);
    }

    #[test]
    fn test_non_envelope_fields_rejected() {
        let mut map = FieldMap::new();
        map.insert("age".to_string(), Value::String("30".to_string()));
        map.insert("name".to_string(), Value::String("Alice".to_string()));
        assert!(EncryptedEnvelope::from_field_map(&map).is_err());
    }

    #[test]
    fn test_original_schema_recovered() {
        let envelope = sample();
        assert_eq!(
            envelope.original_schema(),
            Some(SchemaUid::from_bytes([7u8; 32]))
        );
    }

    #[test]
    fn test_condition_nodes_parse() {
        let envelope = sample();
        let nodes = envelope.condition_nodes().unwrap();
        assert_eq!(nodes.len(), 1);
    }
}

//! Strong type definitions for attestgate.
//!
//! Registry identifiers are newtypes to prevent misuse at compile time.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Expiration sentinel: the attestation never expires.
pub const NO_EXPIRATION: u64 = 0;

/// A 32-byte schema identifier assigned by the schema registry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaUid(pub B256);

impl SchemaUid {
    /// Create a new SchemaUid from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(B256::new(bytes))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0 .0
    }

    /// Convert to a 0x-prefixed hex string.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from a hex string, with or without a 0x prefix.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        parse_b256(s).map(Self)
    }

    /// The zero uid (used as a sentinel).
    pub const ZERO: Self = Self(B256::ZERO);
}

impl fmt::Debug for SchemaUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaUid(0x{})", &hex::encode(self.0)[..16])
    }
}

impl fmt::Display for SchemaUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for SchemaUid {
    fn from(bytes: [u8; 32]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<B256> for SchemaUid {
    fn from(b: B256) -> Self {
        Self(b)
    }
}

/// A 32-byte attestation identifier assigned on submission.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttestationUid(pub B256);

impl AttestationUid {
    /// Create a new AttestationUid from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(B256::new(bytes))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0 .0
    }

    /// Convert to a 0x-prefixed hex string.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from a hex string, with or without a 0x prefix.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        parse_b256(s).map(Self)
    }

    /// The zero uid (used as a sentinel for "no reference").
    pub const ZERO: Self = Self(B256::ZERO);
}

impl fmt::Debug for AttestationUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttestationUid(0x{})", &hex::encode(self.0)[..16])
    }
}

impl fmt::Display for AttestationUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for AttestationUid {
    fn from(bytes: [u8; 32]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<B256> for AttestationUid {
    fn from(b: B256) -> Self {
        Self(b)
    }
}

fn parse_b256(s: &str) -> Result<B256, hex::FromHexError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(stripped)?;
    if bytes.len() != 32 {
        return Err(hex::FromHexError::InvalidStringLength);
    }
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&bytes);
    Ok(B256::new(arr))
}

/// An on-chain attestation record.
///
/// Immutable once created. Revocation is a registry concern and is not
/// modeled as mutable state here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    /// The attestation's identifier.
    pub uid: AttestationUid,

    /// The schema the payload bytes are encoded against.
    pub schema: SchemaUid,

    /// Encoded payload bytes.
    pub data: Vec<u8>,

    /// Who created the attestation.
    pub attester: Address,

    /// Who the attestation is about.
    pub recipient: Address,

    /// Unix seconds after which the attestation is expired, or
    /// [`NO_EXPIRATION`].
    pub expiration_time: u64,

    /// Whether the attestation can be revoked later.
    pub revocable: bool,

    /// Optional reference to another attestation.
    pub ref_uid: Option<AttestationUid>,

    /// When the attestation was recorded (Unix milliseconds).
    pub time: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_uid_hex_roundtrip() {
        let uid = SchemaUid::from_bytes([0x42; 32]);
        let hex = uid.to_hex();
        assert!(hex.starts_with("0x"));
        let recovered = SchemaUid::from_hex(&hex).unwrap();
        assert_eq!(uid, recovered);
    }

    #[test]
    fn test_uid_parse_without_prefix() {
        let uid = AttestationUid::from_bytes([0xab; 32]);
        let bare = hex::encode(uid.0);
        let recovered = AttestationUid::from_hex(&bare).unwrap();
        assert_eq!(uid, recovered);
    }

    #[test]
    fn test_uid_parse_wrong_length() {
        assert!(SchemaUid::from_hex("0xdeadbeef").is_err());
    }

    #[test]
    fn test_uid_debug_truncated() {
        let uid = SchemaUid::from_bytes([0xcd; 32]);
        let debug = format!("{:?}", uid);
        assert!(debug.starts_with("SchemaUid(0x"));
        assert!(debug.len() < 32);
    }
}

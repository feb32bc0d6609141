//! # Attestgate Core
//!
//! Pure primitives for the attestgate pipeline: schema field codec, access
//! conditions, and the encryption envelope.
//!
//! This crate contains no I/O and no networking. It is pure computation over
//! schema-typed data.
//!
//! ## Key Types
//!
//! - [`SchemaDescriptor`] - An ordered list of typed, named fields
//! - [`Value`] / [`FieldMap`] - Runtime-typed field values
//! - [`ConditionExpr`] - Access conditions parsed into an expression tree
//! - [`EncryptedEnvelope`] - The on-chain form of a gated payload
//!
//! ## Encoding
//!
//! Field encoding follows the standard ABI head/tail word layout; encoded
//! bytes are round-trip validated before they can be submitted. See the
//! [`schema`] and [`abi`] modules.

pub mod abi;
pub mod conditions;
pub mod envelope;
pub mod error;
pub mod schema;
pub mod types;
pub mod value;

pub use conditions::{
    balance_gate, AccessCondition, Comparator, ConditionExpr, ConditionNode, Operator,
    ReturnValueTest,
};
pub use envelope::{EncryptedEnvelope, ENCRYPTION_SCHEMA};
pub use error::{CodecError, ConditionError};
pub use schema::{SchemaDescriptor, SchemaField};
pub use types::{Attestation, AttestationUid, SchemaUid, NO_EXPIRATION};
pub use value::{FieldMap, FieldType, Value};

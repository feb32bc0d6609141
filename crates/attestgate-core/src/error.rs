//! Error types for attestgate-core.

use thiserror::Error;

/// Errors from schema parsing and field encoding/decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("decoding error: {0}")]
    Decoding(String),

    /// Every absent field is reported, not just the first.
    #[error("missing fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("field {field}: expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: String,
        got: String,
    },

    #[error("duplicate field name: {0}")]
    DuplicateField(String),

    #[error("malformed schema field: {0:?}")]
    MalformedField(String),

    #[error("unknown field type: {0}")]
    UnknownFieldType(String),
}

/// Errors from building a condition expression out of a flat list.
#[derive(Debug, Error)]
pub enum ConditionError {
    #[error("condition list is empty")]
    Empty,

    #[error("operator node at position {0} is not preceded by a condition")]
    LeadingOperator(usize),

    #[error("condition list ends with an operator")]
    TrailingOperator,

    #[error("conditions at positions {0} and {1} are not joined by an operator")]
    MissingOperator(usize, usize),

    #[error("condition serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for core operations.
pub type Result<T, E = CodecError> = std::result::Result<T, E>;

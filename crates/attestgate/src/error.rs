//! Error types for the client.

use attestgate_core::{CodecError, ConditionError};
use attestgate_registry::RegistryError;
use attestgate_seal::SealError;
use thiserror::Error;

/// Errors that can occur during client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Unknown chain name at construction. Fatal, no retry.
    #[error("chain not supported: {0}")]
    UnsupportedNetwork(String),

    /// A malformed request, surfaced before any network call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The configured network has no deployed encryption schema.
    #[error("gated attestations are not available on {0}")]
    GatingUnavailable(String),

    /// Deliberately unimplemented operation.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// Schema encoding/decoding failure.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Structurally invalid condition list.
    #[error("condition error: {0}")]
    Condition(#[from] ConditionError),

    /// Access-gate failure (denial, authentication, network).
    #[error(transparent)]
    Seal(#[from] SealError),

    /// Registry failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Payload serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

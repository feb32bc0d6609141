//! Error types for the registry seam.

use attestgate_core::{AttestationUid, SchemaUid};
use thiserror::Error;

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("schema not found: {0}")]
    SchemaNotFound(SchemaUid),

    #[error("attestation not found: {0}")]
    AttestationNotFound(AttestationUid),

    /// The registry refused the submission.
    #[error("submission rejected: {0}")]
    Rejected(String),

    /// Transport failure reaching the registry. Retryable by the caller.
    #[error("network error: {0}")]
    Network(String),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

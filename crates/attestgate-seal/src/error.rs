//! Error types for the access-gate codec.
//!
//! The taxonomy separates denial (conditions unsatisfied), authentication
//! failure (the signing callback could not produce a valid credential),
//! service rejection, and transport failure so callers can react to each.

use attestgate_core::ConditionError;
use thiserror::Error;

/// Errors from the gate codec and the threshold-network seam.
#[derive(Debug, Error)]
pub enum SealError {
    /// The access conditions are not satisfied by the caller's on-chain
    /// state. Signaled by the network, never checked locally.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The credential provider could not produce a valid signature.
    #[error("authentication failed: {0}")]
    AuthFailure(String),

    /// The service rejected the request (malformed conditions, unknown
    /// ciphertext, integrity mismatch).
    #[error("rejected by encryption service: {0}")]
    Rejected(String),

    /// Transport failure reaching the network. Retryable by the caller.
    #[error("network error: {0}")]
    Network(String),

    /// The condition list is structurally invalid.
    #[error(transparent)]
    Condition(#[from] ConditionError),
}

/// Result type for gate operations.
pub type Result<T> = std::result::Result<T, SealError>;

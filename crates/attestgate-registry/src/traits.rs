//! Registry trait: the abstract interface to the attestation registry and
//! its schema registry contract pair.
//!
//! Implementations are expected to be remote (on-chain) clients; the
//! in-memory implementation exists for tests and the local sandbox.

use alloy_primitives::Address;
use async_trait::async_trait;
use tokio::sync::oneshot;

use attestgate_core::{Attestation, AttestationUid, SchemaDescriptor, SchemaUid, NO_EXPIRATION};

use crate::error::{RegistryError, Result};

/// A submission request for a new attestation.
#[derive(Debug, Clone)]
pub struct AttestRequest {
    /// The schema the payload bytes are encoded against.
    pub schema: SchemaUid,
    /// Who the attestation is about.
    pub recipient: Address,
    /// Unix seconds, or [`NO_EXPIRATION`].
    pub expiration_time: u64,
    /// Whether the attestation can be revoked later.
    pub revocable: bool,
    /// Encoded payload bytes.
    pub data: Vec<u8>,
    /// Optional reference to another attestation.
    pub ref_uid: Option<AttestationUid>,
}

impl AttestRequest {
    pub fn new(schema: SchemaUid, recipient: Address, data: Vec<u8>) -> Self {
        Self {
            schema,
            recipient,
            expiration_time: NO_EXPIRATION,
            revocable: false,
            data,
            ref_uid: None,
        }
    }
}

/// A submitted attestation awaiting on-chain confirmation.
///
/// Submission is two-phase: [`Registry::attest`] returns once the
/// transaction is accepted, [`PendingAttestation::wait`] resolves once it is
/// confirmed and the uid is final.
pub struct PendingAttestation {
    receiver: oneshot::Receiver<Result<AttestationUid>>,
}

impl PendingAttestation {
    /// Create a pending handle and the sender used to resolve it.
    pub fn channel() -> (oneshot::Sender<Result<AttestationUid>>, Self) {
        let (sender, receiver) = oneshot::channel();
        (sender, Self { receiver })
    }

    /// Wait for on-chain confirmation.
    pub async fn wait(self) -> Result<AttestationUid> {
        self.receiver
            .await
            .map_err(|_| RegistryError::Network("confirmation channel closed".to_string()))?
    }
}

/// The attestation registry.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Register a schema body, returning its uid.
    async fn register_schema(&self, schema: &str) -> Result<SchemaUid>;

    /// Fetch a schema descriptor by uid.
    async fn get_schema(&self, uid: &SchemaUid) -> Result<SchemaDescriptor>;

    /// Submit an attestation. The returned handle resolves to the new
    /// attestation's uid at confirmation.
    async fn attest(&self, request: AttestRequest) -> Result<PendingAttestation>;

    /// Fetch an attestation by uid.
    async fn get_attestation(&self, uid: &AttestationUid) -> Result<Attestation>;
}

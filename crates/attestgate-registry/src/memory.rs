//! In-memory implementation of the Registry trait.
//!
//! For tests and the local sandbox. Uids are content-derived with keccak256
//! so registering the same schema twice resolves to the same uid.

use std::collections::HashMap;
use std::sync::RwLock;

use alloy_primitives::{keccak256, Address};
use async_trait::async_trait;

use attestgate_core::{Attestation, AttestationUid, SchemaDescriptor, SchemaUid};

use crate::error::{RegistryError, Result};
use crate::traits::{AttestRequest, PendingAttestation, Registry};

struct Inner {
    schemas: HashMap<SchemaUid, String>,
    attestations: HashMap<AttestationUid, Attestation>,
    /// The connected signer recorded as attester on submissions.
    attester: Address,
    /// Monotonic salt so identical submissions still get distinct uids.
    nonce: u64,
}

/// In-memory registry implementation.
///
/// All data is lost when the registry is dropped. Thread-safe via RwLock.
pub struct MemoryRegistry {
    inner: RwLock<Inner>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                schemas: HashMap::new(),
                attestations: HashMap::new(),
                attester: Address::ZERO,
                nonce: 0,
            }),
        }
    }

    /// Connect a signer; submissions record it as the attester.
    pub fn connect(&self, attester: Address) {
        self.inner.write().unwrap().attester = attester;
    }

    /// Install a well-known schema at a fixed uid.
    ///
    /// Deployed chains carry pre-registered schemas (the encryption
    /// meta-schema among them); this is the sandbox equivalent.
    pub fn seed_schema(&self, uid: SchemaUid, schema: &str) {
        let mut inner = self.inner.write().unwrap();
        inner.schemas.insert(uid, schema.to_string());
    }

    /// Number of stored attestations.
    pub fn attestation_count(&self) -> usize {
        self.inner.read().unwrap().attestations.len()
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Registry for MemoryRegistry {
    async fn register_schema(&self, schema: &str) -> Result<SchemaUid> {
        let uid = SchemaUid(keccak256(schema.as_bytes()));
        let mut inner = self.inner.write().unwrap();
        if inner.schemas.contains_key(&uid) {
            tracing::debug!(%uid, "schema already registered, returning existing uid");
            return Ok(uid);
        }
        inner.schemas.insert(uid, schema.to_string());
        Ok(uid)
    }

    async fn get_schema(&self, uid: &SchemaUid) -> Result<SchemaDescriptor> {
        let inner = self.inner.read().unwrap();
        inner
            .schemas
            .get(uid)
            .map(|schema| SchemaDescriptor::new(*uid, schema.clone()))
            .ok_or(RegistryError::SchemaNotFound(*uid))
    }

    async fn attest(&self, request: AttestRequest) -> Result<PendingAttestation> {
        let mut inner = self.inner.write().unwrap();
        if !inner.schemas.contains_key(&request.schema) {
            return Err(RegistryError::Rejected(format!(
                "unknown schema {}",
                request.schema
            )));
        }

        inner.nonce += 1;
        let mut preimage = Vec::new();
        preimage.extend_from_slice(request.schema.as_bytes());
        preimage.extend_from_slice(request.recipient.as_slice());
        preimage.extend_from_slice(&request.data);
        preimage.extend_from_slice(&inner.nonce.to_be_bytes());
        let uid = AttestationUid(keccak256(&preimage));

        let attestation = Attestation {
            uid,
            schema: request.schema,
            data: request.data,
            attester: inner.attester,
            recipient: request.recipient,
            expiration_time: request.expiration_time,
            revocable: request.revocable,
            ref_uid: request.ref_uid,
            time: now_millis(),
        };
        inner.attestations.insert(uid, attestation);

        // No real chain to wait on: confirm immediately.
        let (sender, pending) = PendingAttestation::channel();
        let _ = sender.send(Ok(uid));
        Ok(pending)
    }

    async fn get_attestation(&self, uid: &AttestationUid) -> Result<Attestation> {
        let inner = self.inner.read().unwrap();
        inner
            .attestations
            .get(uid)
            .cloned()
            .ok_or(RegistryError::AttestationNotFound(*uid))
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}

//! The client: the attestation envelope builder.
//!
//! Decides, per request, whether a payload is encoded directly against its
//! target schema or wrapped in the encryption envelope, and drives the
//! registry and gate codec accordingly.

use std::sync::Arc;

use alloy_primitives::Address;

use attestgate_core::conditions::{self, ConditionExpr, ConditionNode};
use attestgate_core::{
    schema, Attestation, AttestationUid, CodecError, EncryptedEnvelope, FieldMap, SchemaDescriptor,
    SchemaUid, Value, NO_EXPIRATION,
};
use attestgate_registry::{AttestRequest, Registry};
use attestgate_seal::{CredentialProvider, GateCodec, ThresholdNetwork};

use crate::config::NetworkConfig;
use crate::error::{ClientError, Result};

/// Options for creating an attestation.
#[derive(Debug, Clone)]
pub struct AttestOptions {
    /// Who the attestation is about. Defaults to the signer's own address.
    pub recipient: Option<Address>,
    /// Optional reference to another attestation.
    pub linked_attestation_id: Option<AttestationUid>,
    /// Unix seconds, or [`NO_EXPIRATION`].
    pub expiration_time: u64,
    /// Whether the attestation can be revoked later.
    pub revocable: bool,
    /// Encrypt the payload under access conditions.
    pub gated: bool,
    /// The flat condition list for gated requests.
    pub access_control_conditions: Option<Vec<ConditionNode>>,
}

impl Default for AttestOptions {
    fn default() -> Self {
        Self {
            recipient: None,
            linked_attestation_id: None,
            expiration_time: NO_EXPIRATION,
            revocable: false,
            gated: false,
            access_control_conditions: None,
        }
    }
}

impl AttestOptions {
    /// Gate the payload under the given conditions.
    pub fn gated(conditions: Vec<ConditionNode>) -> Self {
        Self {
            gated: true,
            access_control_conditions: Some(conditions),
            ..Self::default()
        }
    }

    pub fn with_recipient(mut self, recipient: Address) -> Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn with_expiration(mut self, expiration_time: u64) -> Self {
        self.expiration_time = expiration_time;
        self
    }

    pub fn revocable(mut self, revocable: bool) -> Self {
        self.revocable = revocable;
        self
    }

    pub fn linked_to(mut self, attestation: AttestationUid) -> Self {
        self.linked_attestation_id = Some(attestation);
        self
    }
}

/// Options for resolving an attestation.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Interpret the payload as an encryption envelope and decrypt it.
    pub gated: bool,
    /// Resource paths forwarded to the decryption session.
    pub resources: Vec<String>,
}

impl ResolveOptions {
    pub fn gated() -> Self {
        Self {
            gated: true,
            resources: Vec::new(),
        }
    }
}

/// A resolved attestation: the recovered field mapping plus the raw record.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub decoded_data: FieldMap,
    pub attestation: Attestation,
}

/// The main client.
///
/// Owns the network configuration and the seam handles. Retains no state
/// across calls: schema descriptors are re-fetched per call and every
/// decrypt negotiates fresh session credentials.
pub struct Client {
    config: NetworkConfig,
    registry: Arc<dyn Registry>,
    gate: GateCodec,
}

impl Client {
    /// Create a client for one configured network.
    pub fn new(
        config: NetworkConfig,
        registry: Arc<dyn Registry>,
        network: Arc<dyn ThresholdNetwork>,
        provider: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            config,
            registry,
            gate: GateCodec::new(network, provider),
        }
    }

    /// The configured network.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// The signer's address, used as the default recipient.
    pub fn address(&self) -> Address {
        self.gate.address()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Schema Operations
    // ─────────────────────────────────────────────────────────────────────

    /// Register a schema body, returning its uid.
    pub async fn register_schema(&self, schema: &str) -> Result<SchemaUid> {
        // Reject bodies the registry would accept but nothing could encode.
        schema::parse_fields(schema)?;
        Ok(self.registry.register_schema(schema).await?)
    }

    /// Fetch a schema descriptor by uid.
    pub async fn get_schema(&self, uid: &SchemaUid) -> Result<SchemaDescriptor> {
        Ok(self.registry.get_schema(uid).await?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Attestation Operations
    // ─────────────────────────────────────────────────────────────────────

    /// Create an attestation, optionally gated behind access conditions.
    ///
    /// Gated payloads are serialized, sealed by the gate codec, and encoded
    /// as an [`EncryptedEnvelope`] against the network's encryption
    /// meta-schema; the attestation is submitted under the meta-schema's
    /// uid, and the caller's schema uid survives only inside the envelope.
    pub async fn create_attestation(
        &self,
        data: &FieldMap,
        schema_id: SchemaUid,
        options: AttestOptions,
    ) -> Result<AttestationUid> {
        let (encoded, schema_used) = if options.gated {
            let nodes = options
                .access_control_conditions
                .as_deref()
                .unwrap_or_default();
            if nodes.is_empty() {
                return Err(ClientError::InvalidArgument(
                    "provide at least one access condition for gated attestations".to_string(),
                ));
            }
            self.encode_gated(data, schema_id, nodes).await?
        } else {
            let descriptor = self.registry.get_schema(&schema_id).await?;
            (schema::encode(&descriptor, data)?, schema_id)
        };

        let request = AttestRequest {
            schema: schema_used,
            recipient: options.recipient.unwrap_or_else(|| self.gate.address()),
            expiration_time: options.expiration_time,
            revocable: options.revocable,
            data: encoded,
            ref_uid: options.linked_attestation_id,
        };
        let pending = self.registry.attest(request).await?;
        let uid = pending.wait().await?;
        tracing::info!(%uid, schema = %schema_used, "attestation confirmed");
        Ok(uid)
    }

    async fn encode_gated(
        &self,
        data: &FieldMap,
        schema_id: SchemaUid,
        nodes: &[ConditionNode],
    ) -> Result<(Vec<u8>, SchemaUid)> {
        let encryption_schema_id = self
            .config
            .encryption_schema_id
            .ok_or_else(|| ClientError::GatingUnavailable(self.config.network.clone()))?;

        let plaintext = serde_json::to_string(data)?;
        let sealed = self.gate.encrypt(plaintext.as_bytes(), nodes).await?;

        let envelope = EncryptedEnvelope {
            encrypted_data: sealed.ciphertext,
            hash: sealed.hash,
            conditions: conditions::serialize_nodes(nodes)?,
            schema: schema_id.to_hex(),
        };

        let descriptor = self.registry.get_schema(&encryption_schema_id).await?;
        let encoded = schema::encode(&descriptor, &envelope.to_field_map())?;
        Ok((encoded, encryption_schema_id))
    }

    /// Fetch and decode an attestation.
    ///
    /// With `gated`, the decoded fields are reinterpreted as an encryption
    /// envelope and decrypted; the recovered payload is typed against the
    /// schema recorded inside the envelope. Authentication and decryption
    /// use the first condition's chain.
    pub async fn get_attestation(
        &self,
        uid: AttestationUid,
        options: ResolveOptions,
    ) -> Result<Resolved> {
        let attestation = self.registry.get_attestation(&uid).await?;
        let descriptor = self.registry.get_schema(&attestation.schema).await?;
        let decoded = schema::decode(&descriptor, &attestation.data)?;

        if !options.gated {
            return Ok(Resolved {
                decoded_data: decoded,
                attestation,
            });
        }

        let envelope = EncryptedEnvelope::from_field_map(&decoded)?;
        let nodes = envelope.condition_nodes()?;
        let chain = ConditionExpr::from_flat(&nodes)?.first_chain().to_string();

        let plaintext = self
            .gate
            .decrypt(
                &envelope.encrypted_data,
                &envelope.hash,
                &nodes,
                &chain,
                &options.resources,
            )
            .await?;

        let original_schema = envelope.original_schema().ok_or_else(|| {
            CodecError::Decoding("envelope does not record the original schema".to_string())
        })?;
        let original_descriptor = self.registry.get_schema(&original_schema).await?;
        let decoded_data = typed_payload(&original_descriptor, &plaintext)?;

        Ok(Resolved {
            decoded_data,
            attestation,
        })
    }

    /// Revoke an attestation.
    ///
    /// Not implemented; always fails.
    pub async fn revoke_attestation(
        &self,
        _uid: AttestationUid,
        _reason: Option<&str>,
    ) -> Result<AttestationUid> {
        Err(ClientError::NotImplemented("attestation revocation"))
    }
}

/// Type a recovered JSON payload against its schema descriptor.
fn typed_payload(descriptor: &SchemaDescriptor, plaintext: &[u8]) -> Result<FieldMap> {
    let json: serde_json::Value = serde_json::from_slice(plaintext)?;
    let object = json.as_object().ok_or_else(|| {
        ClientError::Codec(CodecError::Decoding(
            "recovered payload is not a JSON object".to_string(),
        ))
    })?;

    let fields = descriptor.fields()?;
    let missing: Vec<String> = fields
        .iter()
        .filter(|f| !object.contains_key(&f.name))
        .map(|f| f.name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(ClientError::Codec(CodecError::MissingFields(missing)));
    }

    let mut map = FieldMap::new();
    for field in fields {
        let value = Value::from_json(field.ty, &object[&field.name])?;
        map.insert(field.name, value);
    }
    Ok(map)
}

//! The access-gate codec: sealing and unsealing payloads through the
//! threshold-encryption network.
//!
//! The codec's responsibility is assembling requests correctly and
//! completing the challenge-response authentication step. Condition
//! evaluation and the decryption itself happen inside the network.

use std::sync::Arc;

use attestgate_core::conditions::{balance_gate, ConditionNode};

use crate::error::Result;
use crate::network::{DecryptRequest, EncryptRequest, SealedSecret, ThresholdNetwork};
use crate::provider::CredentialProvider;
use crate::session::{now_millis, ResourceAbility, SessionParams, SESSION_TTL_MS};

/// Seals and unseals payloads under access conditions.
///
/// Holds no state across calls beyond the network and provider handles
/// supplied at construction; every decrypt negotiates fresh session
/// credentials.
pub struct GateCodec {
    network: Arc<dyn ThresholdNetwork>,
    provider: Arc<dyn CredentialProvider>,
}

impl GateCodec {
    pub fn new(network: Arc<dyn ThresholdNetwork>, provider: Arc<dyn CredentialProvider>) -> Self {
        Self { network, provider }
    }

    /// The address sessions are bound to.
    pub fn address(&self) -> alloy_primitives::Address {
        self.provider.address()
    }

    /// Seal a plaintext under the given conditions.
    ///
    /// An empty list is substituted with the permissive balance fallback
    /// (`eth_getBalance >= 0`), which any address satisfies. The list that
    /// reaches the network is therefore never empty.
    pub async fn encrypt(
        &self,
        plaintext: &[u8],
        conditions: &[ConditionNode],
    ) -> Result<SealedSecret> {
        self.network.connect().await?;

        let conditions = if conditions.is_empty() {
            tracing::warn!("no access conditions supplied, falling back to an open balance gate");
            vec![ConditionNode::condition(balance_gate())]
        } else {
            conditions.to_vec()
        };

        self.network
            .encrypt(EncryptRequest {
                plaintext: plaintext.to_vec(),
                conditions,
            })
            .await
    }

    /// Recover a plaintext sealed under `conditions`.
    ///
    /// Issues fresh ten-minute session credentials through the injected
    /// provider, then asks the network to decrypt. The session's decryption
    /// capability is requested over any resource, not scoped to a specific
    /// path; `resources` is carried through to the network as supplied.
    pub async fn decrypt(
        &self,
        ciphertext: &str,
        hash: &str,
        conditions: &[ConditionNode],
        chain: &str,
        resources: &[String],
    ) -> Result<Vec<u8>> {
        self.network.connect().await?;

        let params = SessionParams {
            expiration_at: now_millis() + SESSION_TTL_MS,
            resources: vec![ResourceAbility::decryption_any()],
        };
        let session = self
            .network
            .issue_session(params, self.provider.as_ref())
            .await?;

        self.network
            .decrypt(DecryptRequest {
                chain: chain.to_string(),
                ciphertext: ciphertext.to_string(),
                hash: hash.to_string(),
                conditions: conditions.to_vec(),
                resources: resources.to_vec(),
                session,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use async_trait::async_trait;

    use attestgate_core::conditions::{
        AccessCondition, Comparator, Operator, ReturnValueTest, USER_ADDRESS,
    };

    use crate::error::SealError;
    use crate::network::memory::MemoryGateNetwork;
    use crate::provider::{LocalSigner, SignedCredential};
    use crate::session::Challenge;

    fn balance_threshold(chain: &str, wei: &str) -> AccessCondition {
        AccessCondition::EvmBasic {
            contract_address: String::new(),
            standard_contract_type: String::new(),
            chain: chain.to_string(),
            method: "eth_getBalance".to_string(),
            parameters: vec![USER_ADDRESS.to_string()],
            return_value_test: ReturnValueTest::new(Comparator::Ge, wei),
        }
    }

    fn codec_with(network: Arc<MemoryGateNetwork>, signer: LocalSigner) -> GateCodec {
        GateCodec::new(network, Arc::new(signer))
    }

    #[tokio::test]
    async fn test_gated_roundtrip_when_satisfied() {
        let network = Arc::new(MemoryGateNetwork::new());
        let signer = LocalSigner::generate();
        network.fund("sepolia", signer.address(), U256::from(1_000u64));
        let codec = codec_with(Arc::clone(&network), signer);

        let conditions = vec![ConditionNode::condition(balance_threshold("sepolia", "500"))];
        let sealed = codec.encrypt(b"top secret", &conditions).await.unwrap();
        let plaintext = codec
            .decrypt(&sealed.ciphertext, &sealed.hash, &conditions, "sepolia", &[])
            .await
            .unwrap();
        assert_eq!(plaintext, b"top secret");
    }

    #[tokio::test]
    async fn test_access_denied_when_unsatisfied() {
        let network = Arc::new(MemoryGateNetwork::new());
        let signer = LocalSigner::generate();
        network.fund("sepolia", signer.address(), U256::from(100u64));
        let codec = codec_with(Arc::clone(&network), signer);

        let conditions = vec![ConditionNode::condition(balance_threshold("sepolia", "500"))];
        let sealed = codec.encrypt(b"top secret", &conditions).await.unwrap();
        let err = codec
            .decrypt(&sealed.ciphertext, &sealed.hash, &conditions, "sepolia", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, SealError::AccessDenied(_)));
    }

    #[tokio::test]
    async fn test_or_combination_admits_either_branch() {
        let network = Arc::new(MemoryGateNetwork::new());
        let signer = LocalSigner::generate();
        // No balance, but registered as human.
        network.register_human("sepolia", "0xC5E9", signer.address());
        let codec = codec_with(Arc::clone(&network), signer);

        let humanity = AccessCondition::EvmBasic {
            contract_address: "0xC5E9".to_string(),
            standard_contract_type: "ProofOfHumanity".to_string(),
            chain: "sepolia".to_string(),
            method: "isRegistered".to_string(),
            parameters: vec![USER_ADDRESS.to_string()],
            return_value_test: ReturnValueTest::new(Comparator::Eq, "true"),
        };
        let conditions = vec![
            ConditionNode::condition(balance_threshold("sepolia", "1000000")),
            ConditionNode::operator(Operator::Or),
            ConditionNode::condition(humanity),
        ];

        let sealed = codec.encrypt(b"either works", &conditions).await.unwrap();
        let plaintext = codec
            .decrypt(&sealed.ciphertext, &sealed.hash, &conditions, "sepolia", &[])
            .await
            .unwrap();
        assert_eq!(plaintext, b"either works");
    }

    #[tokio::test]
    async fn test_default_gate_reaches_network_non_empty() {
        let network = Arc::new(MemoryGateNetwork::new());
        let signer = LocalSigner::generate();
        let codec = codec_with(Arc::clone(&network), signer);

        let sealed = codec.encrypt(b"open secret", &[]).await.unwrap();
        let bound = network.bound_conditions(&sealed.ciphertext).unwrap();
        assert_eq!(bound.len(), 1);

        // The fallback gate admits anyone, including a fresh unfunded key.
        let plaintext = codec
            .decrypt(&sealed.ciphertext, &sealed.hash, &bound, "amoy", &[])
            .await
            .unwrap();
        assert_eq!(plaintext, b"open secret");
    }

    #[tokio::test]
    async fn test_mismatched_conditions_rejected() {
        let network = Arc::new(MemoryGateNetwork::new());
        let signer = LocalSigner::generate();
        network.fund("sepolia", signer.address(), U256::from(1_000u64));
        let codec = codec_with(Arc::clone(&network), signer);

        let conditions = vec![ConditionNode::condition(balance_threshold("sepolia", "500"))];
        let sealed = codec.encrypt(b"bound", &conditions).await.unwrap();

        let relaxed = vec![ConditionNode::condition(balance_threshold("sepolia", "0"))];
        let err = codec
            .decrypt(&sealed.ciphertext, &sealed.hash, &relaxed, "sepolia", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, SealError::Rejected(_)));
    }

    /// A provider that signs something other than the challenge it was given.
    struct BrokenSigner(LocalSigner);

    #[async_trait]
    impl CredentialProvider for BrokenSigner {
        fn address(&self) -> alloy_primitives::Address {
            self.0.address()
        }

        async fn sign_challenge(&self, challenge: &Challenge) -> Result<SignedCredential> {
            let mut credential = self.0.sign_challenge(challenge).await?;
            credential.signature[0] ^= 0xFF;
            Ok(credential)
        }
    }

    #[tokio::test]
    async fn test_auth_failure_with_broken_signer() {
        let network = Arc::new(MemoryGateNetwork::new());
        let signer = LocalSigner::generate();
        network.fund("sepolia", signer.address(), U256::from(1_000u64));

        let honest = codec_with(Arc::clone(&network), signer.clone());
        let conditions = vec![ConditionNode::condition(balance_threshold("sepolia", "500"))];
        let sealed = honest.encrypt(b"guarded", &conditions).await.unwrap();

        let broken = GateCodec::new(
            Arc::clone(&network) as Arc<dyn ThresholdNetwork>,
            Arc::new(BrokenSigner(signer)),
        );
        let err = broken
            .decrypt(&sealed.ciphertext, &sealed.hash, &conditions, "sepolia", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, SealError::AuthFailure(_)));
    }
}

//! Threshold-encryption network seam.
//!
//! Condition evaluation and threshold decryption happen inside the external
//! network; no single party, this client included, can decrypt alone. The
//! trait below is the interface the codec assembles requests against.

use async_trait::async_trait;

use attestgate_core::ConditionNode;

use crate::error::Result;
use crate::provider::CredentialProvider;
use crate::session::{SessionCredentials, SessionParams};

/// Request to seal a plaintext under access conditions.
#[derive(Debug, Clone)]
pub struct EncryptRequest {
    pub plaintext: Vec<u8>,
    /// Flat condition list, passed verbatim to the network.
    pub conditions: Vec<ConditionNode>,
}

/// A sealed payload: opaque ciphertext plus the plaintext's integrity digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedSecret {
    pub ciphertext: String,
    pub hash: String,
}

/// Request to recover a plaintext.
#[derive(Debug, Clone)]
pub struct DecryptRequest {
    /// The chain conditions are evaluated on.
    pub chain: String,
    pub ciphertext: String,
    pub hash: String,
    pub conditions: Vec<ConditionNode>,
    /// Caller-supplied resource paths, carried through to the network.
    pub resources: Vec<String>,
    pub session: SessionCredentials,
}

/// The threshold-encryption network.
#[async_trait]
pub trait ThresholdNetwork: Send + Sync {
    /// Establish a connection. Idempotent.
    async fn connect(&self) -> Result<()>;

    /// Seal a plaintext under the given conditions.
    async fn encrypt(&self, request: EncryptRequest) -> Result<SealedSecret>;

    /// Issue session credentials through a challenge signed by the provider.
    async fn issue_session(
        &self,
        params: SessionParams,
        provider: &dyn CredentialProvider,
    ) -> Result<SessionCredentials>;

    /// Recover a plaintext. The network verifies the session, evaluates the
    /// conditions against on-chain state, and only then releases the secret.
    async fn decrypt(&self, request: DecryptRequest) -> Result<Vec<u8>>;

    /// A fresh nonce for sign-in messages.
    async fn latest_blockhash(&self) -> Result<String>;
}

/// A simple in-memory network for testing and the local sandbox.
///
/// Simulates threshold key custody: each sealed payload gets its own content
/// key which the "network" holds and only releases when the presented
/// conditions match the ones bound at encryption time and evaluate true
/// against the configured chain state.
pub mod memory {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::str::FromStr;
    use std::sync::RwLock;

    use alloy_primitives::{keccak256, Address, B256, U256};
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use chacha20poly1305::aead::{Aead, KeyInit};
    use chacha20poly1305::{ChaCha20Poly1305, Nonce};
    use rand::RngCore;

    use attestgate_core::conditions::{
        serialize_nodes, AccessCondition, Comparator, ConditionExpr, USER_ADDRESS,
    };

    use crate::error::SealError;
    use crate::session::{now_millis, Challenge};

    const NONCE_SIZE: usize = 12;

    /// On-chain state the memory network evaluates conditions against.
    #[derive(Debug, Default)]
    pub struct ChainState {
        /// (chain, address) -> balance in wei.
        balances: HashMap<(String, Address), U256>,
        /// (chain, contract, token id) -> owner.
        nft_owners: HashMap<(String, String, String), Address>,
        /// (chain, contract) -> registered addresses.
        humans: HashMap<(String, String), HashSet<Address>>,
        /// chain -> latest block timestamp (Unix seconds).
        timestamps: HashMap<String, u64>,
        /// (chain, contract, method) -> returned value.
        call_results: HashMap<(String, String, String), String>,
    }

    impl ChainState {
        fn observe(&self, condition: &AccessCondition, caller: Address) -> Option<String> {
            match condition {
                AccessCondition::EvmBasic {
                    contract_address,
                    standard_contract_type,
                    chain,
                    method,
                    parameters,
                    ..
                } => {
                    let contract = contract_address.to_lowercase();
                    if standard_contract_type == "timestamp"
                        || method == "eth_getBlockByNumber"
                    {
                        return Some(
                            self.timestamps.get(chain).copied().unwrap_or(0).to_string(),
                        );
                    }
                    match method.as_str() {
                        "eth_getBalance" => {
                            let target = resolve(parameters.first()?, caller);
                            let address = Address::from_str(&target).ok()?;
                            let balance = self
                                .balances
                                .get(&(chain.clone(), address))
                                .copied()
                                .unwrap_or_default();
                            Some(balance.to_string())
                        }
                        "ownerOf" => {
                            let token = parameters.first()?.clone();
                            self.nft_owners
                                .get(&(chain.clone(), contract, token))
                                .map(|owner| owner.to_checksum(None))
                        }
                        "isRegistered" => {
                            let registered = self
                                .humans
                                .get(&(chain.clone(), contract))
                                .is_some_and(|set| set.contains(&caller));
                            Some(registered.to_string())
                        }
                        other => {
                            let result = self
                                .call_results
                                .get(&(chain.clone(), contract, other.to_string()))
                                .cloned();
                            if result.is_none() {
                                tracing::debug!(method = other, "no result configured for method");
                            }
                            result
                        }
                    }
                }
                AccessCondition::EvmContract {
                    contract_address,
                    function_name,
                    chain,
                    ..
                } => self
                    .call_results
                    .get(&(
                        chain.clone(),
                        contract_address.to_lowercase(),
                        function_name.clone(),
                    ))
                    .cloned(),
            }
        }

        fn evaluate(&self, expr: &ConditionExpr, caller: Address) -> bool {
            match expr {
                ConditionExpr::Leaf(condition) => {
                    let test = condition.return_value_test();
                    match self.observe(condition, caller) {
                        Some(observed) => {
                            compare(test.comparator, &observed, &resolve(&test.value, caller))
                        }
                        None => false,
                    }
                }
                ConditionExpr::And(left, right) => {
                    self.evaluate(left, caller) && self.evaluate(right, caller)
                }
                ConditionExpr::Or(left, right) => {
                    self.evaluate(left, caller) || self.evaluate(right, caller)
                }
            }
        }
    }

    fn resolve(value: &str, caller: Address) -> String {
        if value == USER_ADDRESS {
            caller.to_checksum(None)
        } else {
            value.to_string()
        }
    }

    fn compare(comparator: Comparator, observed: &str, expected: &str) -> bool {
        if comparator == Comparator::Contains {
            return observed.contains(expected);
        }
        if let (Ok(a), Ok(b)) = (Address::from_str(observed), Address::from_str(expected)) {
            return match comparator {
                Comparator::Eq => a == b,
                Comparator::Ne => a != b,
                _ => false,
            };
        }
        if let (Ok(a), Ok(b)) = (
            U256::from_str_radix(observed, 10),
            U256::from_str_radix(expected, 10),
        ) {
            return match comparator {
                Comparator::Eq => a == b,
                Comparator::Ne => a != b,
                Comparator::Gt => a > b,
                Comparator::Ge => a >= b,
                Comparator::Lt => a < b,
                Comparator::Le => a <= b,
                Comparator::Contains => unreachable!(),
            };
        }
        match comparator {
            Comparator::Eq => observed == expected,
            Comparator::Ne => observed != expected,
            Comparator::Gt => observed > expected,
            Comparator::Ge => observed >= expected,
            Comparator::Lt => observed < expected,
            Comparator::Le => observed <= expected,
            Comparator::Contains => unreachable!(),
        }
    }

    struct CustodyEntry {
        key: [u8; 32],
        conditions_json: String,
        conditions_digest: B256,
        plaintext_hash: String,
    }

    struct Inner {
        connected: bool,
        custody: HashMap<String, CustodyEntry>,
        chain: ChainState,
        block_counter: u64,
        session_counter: u64,
    }

    /// In-memory threshold network implementation.
    pub struct MemoryGateNetwork {
        inner: RwLock<Inner>,
    }

    impl MemoryGateNetwork {
        pub fn new() -> Self {
            Self {
                inner: RwLock::new(Inner {
                    connected: false,
                    custody: HashMap::new(),
                    chain: ChainState::default(),
                    block_counter: 0,
                    session_counter: 0,
                }),
            }
        }

        // ─────────────────────────────────────────────────────────────────
        // Chain-state configuration
        // ─────────────────────────────────────────────────────────────────

        pub fn fund(&self, chain: &str, address: Address, balance: U256) {
            let mut inner = self.inner.write().unwrap();
            inner
                .chain
                .balances
                .insert((chain.to_string(), address), balance);
        }

        pub fn mint_nft(&self, chain: &str, contract: &str, token: &str, owner: Address) {
            let mut inner = self.inner.write().unwrap();
            inner.chain.nft_owners.insert(
                (chain.to_string(), contract.to_lowercase(), token.to_string()),
                owner,
            );
        }

        pub fn register_human(&self, chain: &str, contract: &str, address: Address) {
            let mut inner = self.inner.write().unwrap();
            inner
                .chain
                .humans
                .entry((chain.to_string(), contract.to_lowercase()))
                .or_default()
                .insert(address);
        }

        pub fn set_timestamp(&self, chain: &str, timestamp: u64) {
            let mut inner = self.inner.write().unwrap();
            inner.chain.timestamps.insert(chain.to_string(), timestamp);
        }

        pub fn set_call_result(&self, chain: &str, contract: &str, method: &str, result: &str) {
            let mut inner = self.inner.write().unwrap();
            inner.chain.call_results.insert(
                (
                    chain.to_string(),
                    contract.to_lowercase(),
                    method.to_string(),
                ),
                result.to_string(),
            );
        }

        /// The conditions bound to a ciphertext at encryption time.
        pub fn bound_conditions(&self, ciphertext: &str) -> Option<Vec<ConditionNode>> {
            let inner = self.inner.read().unwrap();
            let entry = inner.custody.get(ciphertext)?;
            serde_json::from_str(&entry.conditions_json).ok()
        }
    }

    impl Default for MemoryGateNetwork {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ThresholdNetwork for MemoryGateNetwork {
        async fn connect(&self) -> Result<()> {
            self.inner.write().unwrap().connected = true;
            Ok(())
        }

        async fn encrypt(&self, request: EncryptRequest) -> Result<SealedSecret> {
            if !self.inner.read().unwrap().connected {
                return Err(SealError::Network("client is not connected".to_string()));
            }

            // The service rejects structurally invalid condition lists.
            ConditionExpr::from_flat(&request.conditions)
                .map_err(|e| SealError::Rejected(format!("malformed access conditions: {e}")))?;
            let conditions_json = serialize_nodes(&request.conditions)
                .map_err(|e| SealError::Rejected(format!("unserializable conditions: {e}")))?;

            let mut key = [0u8; 32];
            let mut nonce = [0u8; NONCE_SIZE];
            rand::thread_rng().fill_bytes(&mut key);
            rand::thread_rng().fill_bytes(&mut nonce);

            let cipher = ChaCha20Poly1305::new_from_slice(&key)
                .map_err(|_| SealError::Rejected("cipher init failed".to_string()))?;
            let sealed = cipher
                .encrypt(Nonce::from_slice(&nonce), request.plaintext.as_slice())
                .map_err(|_| SealError::Rejected("encryption failed".to_string()))?;

            let mut blob = Vec::with_capacity(NONCE_SIZE + sealed.len());
            blob.extend_from_slice(&nonce);
            blob.extend_from_slice(&sealed);
            let ciphertext = BASE64.encode(blob);
            let hash = hex::encode(keccak256(&request.plaintext));

            let mut inner = self.inner.write().unwrap();
            inner.custody.insert(
                ciphertext.clone(),
                CustodyEntry {
                    key,
                    conditions_digest: keccak256(conditions_json.as_bytes()),
                    conditions_json,
                    plaintext_hash: hash.clone(),
                },
            );
            Ok(SealedSecret { ciphertext, hash })
        }

        async fn issue_session(
            &self,
            params: SessionParams,
            provider: &dyn CredentialProvider,
        ) -> Result<SessionCredentials> {
            let (uri, nonce) = {
                let mut inner = self.inner.write().unwrap();
                if !inner.connected {
                    return Err(SealError::Network("client is not connected".to_string()));
                }
                inner.session_counter += 1;
                inner.block_counter += 1;
                let uri = format!("attestgate:session:{}", inner.session_counter);
                let nonce = format!(
                    "0x{}",
                    hex::encode(keccak256(inner.block_counter.to_be_bytes()))
                );
                (uri, nonce)
            };

            let challenge = Challenge {
                uri,
                expiration_at: params.expiration_at,
                resources: params.resources.clone(),
                nonce,
                address: provider.address(),
            };
            let credential = provider.sign_challenge(&challenge).await?;

            // The signer must sign exactly the message it was challenged with.
            if credential.signed_message != challenge.message() {
                return Err(SealError::AuthFailure(
                    "signed message does not match the challenge".to_string(),
                ));
            }
            credential.verify(challenge.address)?;

            Ok(SessionCredentials {
                address: challenge.address,
                public_key: credential.public_key,
                signature: credential.signature,
                signed_message: credential.signed_message,
                resources: params.resources,
                issued_at: now_millis(),
                expires_at: params.expiration_at,
            })
        }

        async fn decrypt(&self, request: DecryptRequest) -> Result<Vec<u8>> {
            let session = &request.session;
            if session.is_expired(now_millis()) {
                return Err(SealError::AuthFailure("session has expired".to_string()));
            }
            let credential = crate::provider::SignedCredential {
                signature: session.signature.clone(),
                public_key: session.public_key,
                signed_message: session.signed_message.clone(),
            };
            credential.verify(session.address)?;
            if !session.can_decrypt() {
                return Err(SealError::AccessDenied(
                    "session does not grant condition decryption".to_string(),
                ));
            }

            let conditions_json = serialize_nodes(&request.conditions)
                .map_err(|e| SealError::Rejected(format!("unserializable conditions: {e}")))?;
            let expr = ConditionExpr::from_flat(&request.conditions)
                .map_err(|e| SealError::Rejected(format!("malformed access conditions: {e}")))?;

            let inner = self.inner.read().unwrap();
            if !inner.connected {
                return Err(SealError::Network("client is not connected".to_string()));
            }
            let entry = inner
                .custody
                .get(&request.ciphertext)
                .ok_or_else(|| SealError::Rejected("unknown ciphertext".to_string()))?;

            if keccak256(conditions_json.as_bytes()) != entry.conditions_digest {
                return Err(SealError::Rejected(
                    "conditions do not match those bound at encryption".to_string(),
                ));
            }
            if request.hash != entry.plaintext_hash {
                return Err(SealError::Rejected(
                    "integrity digest does not match the sealed payload".to_string(),
                ));
            }

            if !inner.chain.evaluate(&expr, session.address) {
                return Err(SealError::AccessDenied(format!(
                    "access conditions not satisfied for {}",
                    session.address
                )));
            }

            let blob = BASE64
                .decode(&request.ciphertext)
                .map_err(|_| SealError::Rejected("malformed ciphertext".to_string()))?;
            if blob.len() < NONCE_SIZE {
                return Err(SealError::Rejected("malformed ciphertext".to_string()));
            }
            let (nonce, sealed) = blob.split_at(NONCE_SIZE);
            let cipher = ChaCha20Poly1305::new_from_slice(&entry.key)
                .map_err(|_| SealError::Rejected("cipher init failed".to_string()))?;
            cipher
                .decrypt(Nonce::from_slice(nonce), sealed)
                .map_err(|_| SealError::Rejected("decryption failed".to_string()))
        }

        async fn latest_blockhash(&self) -> Result<String> {
            let mut inner = self.inner.write().unwrap();
            inner.block_counter += 1;
            Ok(format!(
                "0x{}",
                hex::encode(keccak256(inner.block_counter.to_be_bytes()))
            ))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use attestgate_core::conditions::{balance_gate, ConditionNode};

        #[test]
        fn test_compare_numeric() {
            assert!(compare(Comparator::Ge, "100", "100"));
            assert!(compare(Comparator::Gt, "101", "100"));
            assert!(!compare(Comparator::Lt, "101", "100"));
        }

        #[test]
        fn test_compare_addresses_case_insensitive() {
            assert!(compare(
                Comparator::Eq,
                "0xc2679fbd37d54388ce493f1db75320d236e1815e",
                "0xC2679fBD37d54388Ce493F1DB75320D236e1815e",
            ));
        }

        #[test]
        fn test_compare_contains() {
            assert!(compare(Comparator::Contains, "Burning Man 2021 POAP", "Burning Man 2021"));
        }

        #[test]
        fn test_balance_gate_default_true() {
            let state = ChainState::default();
            let expr = ConditionExpr::from_flat(&[ConditionNode::condition(balance_gate())])
                .unwrap();
            // A zero balance still satisfies ">= 0".
            assert!(state.evaluate(&expr, Address::repeat_byte(9)));
        }
    }
}

//! Credential providers: who signs session challenges.
//!
//! Session authentication is an explicit seam rather than a closure over
//! wallet state, so tests can substitute a fake signer and real deployments
//! can plug in hardware or remote wallets.

use alloy_primitives::{keccak256, Address};
use async_trait::async_trait;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SealError};
use crate::session::Challenge;

/// A signed session challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCredential {
    /// Signature over `signed_message`.
    pub signature: Vec<u8>,
    /// The signer's verifying key.
    pub public_key: [u8; 32],
    /// The exact message that was signed.
    pub signed_message: String,
}

impl SignedCredential {
    /// Verify the signature and the binding to `address`.
    pub fn verify(&self, address: Address) -> Result<()> {
        if derive_address(&self.public_key) != address {
            return Err(SealError::AuthFailure(
                "credential public key does not match session address".to_string(),
            ));
        }
        let verifying_key = VerifyingKey::from_bytes(&self.public_key)
            .map_err(|_| SealError::AuthFailure("invalid credential public key".to_string()))?;
        let signature = Signature::from_slice(&self.signature)
            .map_err(|_| SealError::AuthFailure("malformed credential signature".to_string()))?;
        verifying_key
            .verify(self.signed_message.as_bytes(), &signature)
            .map_err(|_| SealError::AuthFailure("credential signature does not verify".to_string()))
    }
}

/// Signs session challenges on behalf of the calling identity.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// The address sessions are bound to.
    fn address(&self) -> Address;

    /// Sign the canonical sign-in message for a challenge.
    async fn sign_challenge(&self, challenge: &Challenge) -> Result<SignedCredential>;
}

/// Derive an EVM-style address from a verifying key.
pub fn derive_address(public_key: &[u8; 32]) -> Address {
    let digest = keccak256(public_key);
    Address::from_slice(&digest[12..])
}

/// A local development signer backed by an in-memory keypair.
#[derive(Clone)]
pub struct LocalSigner {
    signing_key: SigningKey,
}

impl LocalSigner {
    /// Generate a new random signer.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The signer's verifying key bytes.
    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }
}

#[async_trait]
impl CredentialProvider for LocalSigner {
    fn address(&self) -> Address {
        derive_address(&self.public_key())
    }

    async fn sign_challenge(&self, challenge: &Challenge) -> Result<SignedCredential> {
        let message = challenge.message();
        let signature = self.signing_key.sign(message.as_bytes());
        Ok(SignedCredential {
            signature: signature.to_bytes().to_vec(),
            public_key: self.public_key(),
            signed_message: message,
        })
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalSigner({})", self.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ResourceAbility;

    fn challenge(address: Address) -> Challenge {
        Challenge {
            uri: "attestgate:session:7".to_string(),
            expiration_at: 60_000,
            resources: vec![ResourceAbility::decryption_any()],
            nonce: "0x01".to_string(),
            address,
        }
    }

    #[tokio::test]
    async fn test_local_signer_produces_valid_credential() {
        let signer = LocalSigner::generate();
        let credential = signer
            .sign_challenge(&challenge(signer.address()))
            .await
            .unwrap();
        credential.verify(signer.address()).unwrap();
    }

    #[tokio::test]
    async fn test_credential_rejected_for_wrong_address() {
        let signer = LocalSigner::generate();
        let other = LocalSigner::generate();
        let credential = signer
            .sign_challenge(&challenge(signer.address()))
            .await
            .unwrap();
        assert!(matches!(
            credential.verify(other.address()),
            Err(SealError::AuthFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_tampered_message_fails_verification() {
        let signer = LocalSigner::generate();
        let mut credential = signer
            .sign_challenge(&challenge(signer.address()))
            .await
            .unwrap();
        credential.signed_message.push('x');
        assert!(credential.verify(signer.address()).is_err());
    }

    #[test]
    fn test_deterministic_address_from_seed() {
        let a = LocalSigner::from_seed(&[0x42; 32]);
        let b = LocalSigner::from_seed(&[0x42; 32]);
        assert_eq!(a.address(), b.address());
    }
}

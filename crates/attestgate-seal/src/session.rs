//! Session credentials for threshold decryption.
//!
//! A decrypt operation is authorized by a short-lived session credential:
//! the network hands the caller a challenge, the caller's credential
//! provider signs the canonical sign-in message, and the resulting
//! credential accompanies the decrypt request. Sessions expire ten minutes
//! after issuance.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How long an issued session stays valid (Unix milliseconds).
pub const SESSION_TTL_MS: i64 = 10 * 60 * 1000;

/// A capability requested for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ability {
    /// Decrypt data gated by access-control conditions.
    ConditionDecryption,
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ability::ConditionDecryption => f.write_str("condition-decryption"),
        }
    }
}

/// A capability over a resource, as requested for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAbility {
    pub resource: String,
    pub ability: Ability,
}

impl ResourceAbility {
    /// Condition decryption over any resource.
    ///
    /// Decrypt sessions are not scoped to a specific resource path; the
    /// wildcard request is what the deployed protocol issues.
    pub fn decryption_any() -> Self {
        Self {
            resource: "*".to_string(),
            ability: Ability::ConditionDecryption,
        }
    }
}

/// Parameters for session issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    /// When the session expires (Unix milliseconds).
    pub expiration_at: i64,
    /// Capabilities requested for the session.
    pub resources: Vec<ResourceAbility>,
}

/// The challenge a credential provider is asked to sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Session URI assigned by the network.
    pub uri: String,
    /// When the session will expire (Unix milliseconds).
    pub expiration_at: i64,
    /// Capabilities being requested.
    pub resources: Vec<ResourceAbility>,
    /// Fresh nonce from the network (latest blockhash).
    pub nonce: String,
    /// The address the session will be bound to.
    pub address: Address,
}

impl Challenge {
    /// The canonical sign-in message. Signer and verifier must agree on
    /// this rendering byte for byte.
    pub fn message(&self) -> String {
        let mut out = String::new();
        out.push_str("attestgate wants you to sign in with your account:\n");
        out.push_str(&self.address.to_checksum(None));
        out.push_str("\n\n");
        out.push_str(&format!("URI: {}\n", self.uri));
        out.push_str(&format!("Expiration: {}\n", self.expiration_at));
        out.push_str(&format!("Nonce: {}\n", self.nonce));
        out.push_str("Resources:\n");
        for r in &self.resources {
            out.push_str(&format!("- {} on {}\n", r.ability, r.resource));
        }
        out
    }
}

/// An issued session credential, attached to decrypt requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredentials {
    /// The address the session is bound to.
    pub address: Address,
    /// The signer's verifying key.
    pub public_key: [u8; 32],
    /// Signature over the signed sign-in message.
    pub signature: Vec<u8>,
    /// The exact message that was signed.
    pub signed_message: String,
    /// Capabilities granted to the session.
    pub resources: Vec<ResourceAbility>,
    /// When the session was issued (Unix milliseconds).
    pub issued_at: i64,
    /// When the session expires (Unix milliseconds).
    pub expires_at: i64,
}

impl SessionCredentials {
    /// Whether the session grants condition decryption.
    pub fn can_decrypt(&self) -> bool {
        self.resources
            .iter()
            .any(|r| r.ability == Ability::ConditionDecryption)
    }

    /// Whether the session has expired at `now` (Unix milliseconds).
    pub fn is_expired(&self, now: i64) -> bool {
        now > self.expires_at
    }
}

/// Get current time in milliseconds.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}

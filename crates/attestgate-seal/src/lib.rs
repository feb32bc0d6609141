//! # Attestgate Seal
//!
//! The access-gate codec: sealing payloads so they can only be recovered by
//! parties satisfying a set of on-chain access conditions.
//!
//! ## Overview
//!
//! Encryption and condition evaluation are delegated to an external
//! threshold-encryption network behind the [`ThresholdNetwork`] trait; no
//! single party, this client included, can decrypt without the network's
//! cooperation. Session authentication goes through the
//! [`CredentialProvider`] seam so wallet integrations and test fakes plug in
//! the same way.
//!
//! ## Key Types
//!
//! - [`GateCodec`] - assembles encrypt/decrypt requests and completes the
//!   challenge-response authentication step
//! - [`ThresholdNetwork`] - the network seam, with an in-memory
//!   implementation in [`network::memory`]
//! - [`CredentialProvider`] / [`LocalSigner`] - who signs session challenges
//! - [`SessionCredentials`] - ten-minute authorization artifacts for decrypt

pub mod codec;
pub mod error;
pub mod network;
pub mod provider;
pub mod session;

pub use codec::GateCodec;
pub use error::SealError;
pub use network::{DecryptRequest, EncryptRequest, SealedSecret, ThresholdNetwork};
pub use provider::{derive_address, CredentialProvider, LocalSigner, SignedCredential};
pub use session::{
    Ability, Challenge, ResourceAbility, SessionCredentials, SessionParams, SESSION_TTL_MS,
};

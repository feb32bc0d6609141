//! # Attestgate
//!
//! Create and resolve gated attestations: signed, schema-typed claims on an
//! EVM chain whose payloads can be encrypted so only parties satisfying a
//! set of on-chain access conditions can read them.
//!
//! ## Overview
//!
//! Two components compose the pipeline:
//!
//! - **Gate codec** ([`attestgate_seal`]): turns an access-condition list
//!   plus a plaintext into an opaque ciphertext + integrity digest, and
//!   reverses it given satisfied conditions and valid session credentials.
//! - **Envelope builder** ([`Client`]): decides per request whether to
//!   encode a payload directly against its target schema or to wrap it in
//!   the encryption envelope, and submits/reads it through the registry.
//!
//! A create request flows builder → (if gated) codec encrypt → schema
//! encoder → registry submit. A read request flows registry fetch → schema
//! decoder → (if gated) codec decrypt.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use attestgate::{AttestOptions, Client, NetworkConfig};
//! use attestgate::core::{FieldMap, Value};
//! use attestgate::registry::MemoryRegistry;
//! use attestgate::seal::network::memory::MemoryGateNetwork;
//! use attestgate::seal::LocalSigner;
//!
//! async fn example() {
//!     let config = NetworkConfig::for_network("sepolia").unwrap();
//!     let client = Client::new(
//!         config,
//!         Arc::new(MemoryRegistry::new()),
//!         Arc::new(MemoryGateNetwork::new()),
//!         Arc::new(LocalSigner::generate()),
//!     );
//!
//!     let schema = client.register_schema("uint256 age,string name").await.unwrap();
//!
//!     let mut data = FieldMap::new();
//!     data.insert("age".into(), Value::Uint(30u64.try_into().unwrap()));
//!     data.insert("name".into(), Value::String("Alice".into()));
//!
//!     let uid = client
//!         .create_attestation(&data, schema, AttestOptions::default())
//!         .await
//!         .unwrap();
//!     println!("attested: {uid}");
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::{AttestOptions, Client, ResolveOptions, Resolved};
pub use config::NetworkConfig;
pub use error::{ClientError, Result};

// Re-export the component crates under stable names.
pub use attestgate_core as core;
pub use attestgate_registry as registry;
pub use attestgate_seal as seal;

//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a deterministic signer, a
//! registry seeded with the encryption meta-schema, a memory gate network,
//! and a client wired over all three.

use std::sync::Arc;

use alloy_primitives::{Address, U256};

use attestgate::{Client, NetworkConfig};
use attestgate_core::{ENCRYPTION_SCHEMA, SchemaUid};
use attestgate_registry::MemoryRegistry;
use attestgate_seal::network::memory::MemoryGateNetwork;
use attestgate_seal::{CredentialProvider, LocalSigner};

/// A test fixture with a signer, seeded registry, gate network, and client.
pub struct TestFixture {
    pub signer: LocalSigner,
    pub registry: Arc<MemoryRegistry>,
    pub network: Arc<MemoryGateNetwork>,
    pub client: Client,
}

impl TestFixture {
    /// Create a fixture on sepolia with a random signer.
    pub fn new() -> Self {
        Self::with_signer(LocalSigner::generate())
    }

    /// Create with a deterministic signer from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::with_signer(LocalSigner::from_seed(&seed))
    }

    fn with_signer(signer: LocalSigner) -> Self {
        let config = NetworkConfig::for_network("sepolia").expect("sepolia is configured");

        let registry = Arc::new(MemoryRegistry::new());
        registry.connect(signer.address());
        if let Some(uid) = config.encryption_schema_id {
            registry.seed_schema(uid, ENCRYPTION_SCHEMA);
        }

        let network = Arc::new(MemoryGateNetwork::new());

        let client = Client::new(
            config,
            Arc::clone(&registry) as Arc<dyn attestgate_registry::Registry>,
            Arc::clone(&network) as Arc<dyn attestgate_seal::network::ThresholdNetwork>,
            Arc::new(signer.clone()),
        );

        Self {
            signer,
            registry,
            network,
            client,
        }
    }

    /// The signer's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// The configured chain name.
    pub fn chain(&self) -> &str {
        &self.client.config().network
    }

    /// Uid of the seeded encryption meta-schema.
    pub fn encryption_schema_id(&self) -> SchemaUid {
        self.client
            .config()
            .encryption_schema_id
            .expect("fixture network carries the encryption schema")
    }

    /// Fund an address on the fixture chain.
    pub fn fund(&self, address: Address, wei: u64) {
        self.network.fund(self.chain(), address, U256::from(wei));
    }

    /// Fund the fixture's own signer.
    pub fn fund_self(&self, wei: u64) {
        self.fund(self.address(), wei);
    }

    /// Mint an NFT on the fixture chain.
    pub fn mint_nft(&self, contract: &str, token: &str, owner: Address) {
        self.network.mint_nft(self.chain(), contract, token, owner);
    }

    /// Register an address in a humanity registry on the fixture chain.
    pub fn register_human(&self, contract: &str, address: Address) {
        self.network.register_human(self.chain(), contract, address);
    }

    /// Set the fixture chain's latest block timestamp.
    pub fn set_timestamp(&self, timestamp: u64) {
        self.network.set_timestamp(self.chain(), timestamp);
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

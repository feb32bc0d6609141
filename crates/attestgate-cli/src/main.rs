//! Interactive terminal client for gated attestations.
//!
//! Runs against in-process sandbox backends: an in-memory registry seeded
//! with the encryption meta-schema and an in-memory threshold network with
//! the signer funded, so the full create/resolve pipeline can be exercised
//! locally.

mod actions;
mod presets;
mod proof;

use std::sync::Arc;

use alloy_primitives::U256;
use anyhow::{bail, Context, Result};
use clap::Parser;

use attestgate::core::ENCRYPTION_SCHEMA;
use attestgate::registry::MemoryRegistry;
use attestgate::seal::network::memory::MemoryGateNetwork;
use attestgate::seal::{CredentialProvider, LocalSigner};
use attestgate::{Client, NetworkConfig};

#[derive(Parser)]
#[command(name = "attestgate", about = "Create and resolve gated attestations", version)]
struct Cli {
    /// Chain to operate on.
    #[arg(long, default_value = "sepolia")]
    network: String,

    /// 32-byte hex seed for the signing key. A fresh key is generated if
    /// omitted.
    #[arg(long)]
    seed: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run(Cli::parse()).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Graceful exit on Ctrl+C.
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\nGracefully shutting down. Goodbye!");
            std::process::exit(0);
        }
    });

    let signer = match &cli.seed {
        Some(seed) => LocalSigner::from_seed(&parse_seed(seed)?),
        None => LocalSigner::generate(),
    };

    let config = NetworkConfig::for_network(&cli.network)
        .with_context(|| format!("known networks: {:?}", NetworkConfig::known_networks()))?;

    println!("Creating attestation client on {}", config.network);

    let registry = Arc::new(MemoryRegistry::new());
    registry.connect(signer.address());
    if let Some(uid) = config.encryption_schema_id {
        registry.seed_schema(uid, ENCRYPTION_SCHEMA);
    }

    let network = Arc::new(MemoryGateNetwork::new());
    // One sandbox ether, so balance-based gates can be satisfied.
    network.fund(
        &config.network,
        signer.address(),
        U256::from(10u64).pow(U256::from(18u64)),
    );

    let client = Client::new(config, registry, network, Arc::new(signer));
    println!("Connected as {}", client.address());

    actions::menu_loop(&client).await
}

fn parse_seed(seed: &str) -> Result<[u8; 32]> {
    let stripped = seed.strip_prefix("0x").unwrap_or(seed);
    let bytes = hex::decode(stripped).context("seed must be hex")?;
    if bytes.len() != 32 {
        bail!("seed must be exactly 32 bytes, got {}", bytes.len());
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

//! Per-network configuration.
//!
//! Configuration is an explicit value passed at construction, not a global
//! table, so clients for different chains can coexist in one process.

use alloy_primitives::{address, b256, Address};

use attestgate_core::SchemaUid;

use crate::error::ClientError;

/// Static configuration for one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Chain name as used by condition evaluation.
    pub network: String,

    /// The attestation contract.
    pub attestation_contract: Address,

    /// The schema registry contract.
    pub schema_registry_contract: Address,

    /// Uid of the pre-registered encryption meta-schema, where deployed.
    /// Gated attestations are unavailable on chains without one.
    pub encryption_schema_id: Option<SchemaUid>,
}

/// Uid of the encryption meta-schema shared by the chains that carry it.
const ENCRYPTION_SCHEMA_ID: SchemaUid = SchemaUid(b256!(
    "ad7f1c5035b3200210b1ef59eaa6681368866406facfe757065de4f85632a018"
));

impl NetworkConfig {
    /// Look up a known chain by name.
    ///
    /// An unknown name is a fatal configuration error; there is nothing to
    /// retry.
    pub fn for_network(name: &str) -> Result<Self, ClientError> {
        let config = match name {
            "matic-amoy" => Self {
                network: name.to_string(),
                attestation_contract: address!("b101275a60d8bfb14529C421899aD7CA1Ae5B5Fc"),
                schema_registry_contract: address!("23c5701A1BDa89C61d181BD79E5203c730708AE7"),
                encryption_schema_id: Some(ENCRYPTION_SCHEMA_ID),
            },
            "sepolia" => Self {
                network: name.to_string(),
                attestation_contract: address!("C2679fBD37d54388Ce493F1DB75320D236e1815e"),
                schema_registry_contract: address!("0a7E2Ff54e76B8E6659aedc9103FB21c038050D0"),
                encryption_schema_id: Some(ENCRYPTION_SCHEMA_ID),
            },
            "scroll-sepolia" => Self {
                network: name.to_string(),
                attestation_contract: address!("aEF4103A04090071165F78D45D83A0C0782c2B2a"),
                schema_registry_contract: address!("55D26f9ae0203EF95494AE4C170eD35f4Cf77797"),
                encryption_schema_id: None,
            },
            "base-sepolia" => Self {
                network: name.to_string(),
                attestation_contract: address!("4200000000000000000000000000000000000021"),
                schema_registry_contract: address!("4200000000000000000000000000000000000020"),
                encryption_schema_id: None,
            },
            other => return Err(ClientError::UnsupportedNetwork(other.to_string())),
        };
        Ok(config)
    }

    /// Names accepted by [`for_network`].
    ///
    /// [`for_network`]: NetworkConfig::for_network
    pub fn known_networks() -> &'static [&'static str] {
        &["matic-amoy", "sepolia", "scroll-sepolia", "base-sepolia"]
    }

    /// Configuration for a chain not in the built-in catalogue.
    pub fn custom(
        network: impl Into<String>,
        attestation_contract: Address,
        schema_registry_contract: Address,
        encryption_schema_id: Option<SchemaUid>,
    ) -> Self {
        Self {
            network: network.into(),
            attestation_contract,
            schema_registry_contract,
            encryption_schema_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_networks_resolve() {
        for name in NetworkConfig::known_networks() {
            let config = NetworkConfig::for_network(name).unwrap();
            assert_eq!(config.network, *name);
        }
    }

    #[test]
    fn test_unknown_network_is_fatal() {
        assert!(matches!(
            NetworkConfig::for_network("mainnet"),
            Err(ClientError::UnsupportedNetwork(_))
        ));
    }

    #[test]
    fn test_gating_deployment_per_network() {
        assert!(NetworkConfig::for_network("sepolia")
            .unwrap()
            .encryption_schema_id
            .is_some());
        assert!(NetworkConfig::for_network("base-sepolia")
            .unwrap()
            .encryption_schema_id
            .is_none());
    }
}

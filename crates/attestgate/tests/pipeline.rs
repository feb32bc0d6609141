//! End-to-end pipeline tests over the in-memory seams.
//!
//! Covers the gated create/resolve round trip, envelope preservation, the
//! argument checks that must fire before any network call, and the decode
//! failures that must never surface corrupted plaintext.

use std::sync::Arc;

use alloy_primitives::U256;

use attestgate::core::conditions::{
    AccessCondition, Comparator, ConditionNode, Operator, ReturnValueTest, USER_ADDRESS,
};
use attestgate::core::{CodecError, FieldMap, Value};
use attestgate::registry::MemoryRegistry;
use attestgate::seal::network::memory::MemoryGateNetwork;
use attestgate::seal::{CredentialProvider, LocalSigner, SealError};
use attestgate::{AttestOptions, Client, ClientError, NetworkConfig, ResolveOptions};
use attestgate_testkit::TestFixture;

fn person_data() -> FieldMap {
    let mut data = FieldMap::new();
    data.insert("age".into(), Value::Uint(U256::from(30u64)));
    data.insert("name".into(), Value::String("Alice".into()));
    data
}

fn balance_threshold(chain: &str, wei: &str) -> ConditionNode {
    ConditionNode::Condition(AccessCondition::EvmBasic {
        contract_address: String::new(),
        standard_contract_type: String::new(),
        chain: chain.to_string(),
        method: "eth_getBalance".to_string(),
        parameters: vec![USER_ADDRESS.to_string()],
        return_value_test: ReturnValueTest::new(Comparator::Ge, wei),
    })
}

#[tokio::test]
async fn plain_attestation_roundtrip() {
    let fixture = TestFixture::new();
    let schema = fixture
        .client
        .register_schema("uint256 age,string name")
        .await
        .unwrap();

    let data = person_data();
    let uid = fixture
        .client
        .create_attestation(&data, schema, AttestOptions::default())
        .await
        .unwrap();

    let resolved = fixture
        .client
        .get_attestation(uid, ResolveOptions::default())
        .await
        .unwrap();
    assert_eq!(resolved.decoded_data, data);
    assert_eq!(resolved.attestation.schema, schema);
    assert_eq!(resolved.attestation.recipient, fixture.address());
    assert_eq!(resolved.attestation.attester, fixture.address());
}

#[tokio::test]
async fn gated_roundtrip_preserves_envelope() {
    let fixture = TestFixture::new();
    fixture.fund_self(1_000);

    let schema = fixture
        .client
        .register_schema("uint256 age,string name")
        .await
        .unwrap();
    let data = person_data();
    let conditions = vec![balance_threshold(fixture.chain(), "500")];

    let uid = fixture
        .client
        .create_attestation(&data, schema, AttestOptions::gated(conditions))
        .await
        .unwrap();

    // The attestation is submitted under the encryption meta-schema.
    let raw = fixture
        .client
        .get_attestation(uid, ResolveOptions::default())
        .await
        .unwrap();
    assert_eq!(raw.attestation.schema, fixture.encryption_schema_id());

    // The original schema uid survives inside the envelope.
    match raw.decoded_data.get("schema") {
        Some(Value::String(recorded)) => assert_eq!(recorded, &schema.to_hex()),
        other => panic!("unexpected envelope schema field: {other:?}"),
    }
    assert!(raw.decoded_data.contains_key("encryptedData"));
    assert!(raw.decoded_data.contains_key("conditions"));

    // Gated resolution recovers the original payload, fully typed.
    let resolved = fixture
        .client
        .get_attestation(uid, ResolveOptions::gated())
        .await
        .unwrap();
    assert_eq!(resolved.decoded_data, data);
}

#[tokio::test]
async fn gated_with_empty_conditions_fails_before_any_network_call() {
    let fixture = TestFixture::new();
    let schema = fixture
        .client
        .register_schema("uint256 age,string name")
        .await
        .unwrap();

    let options = AttestOptions {
        gated: true,
        access_control_conditions: Some(Vec::new()),
        ..AttestOptions::default()
    };
    let err = fixture
        .client
        .create_attestation(&person_data(), schema, options)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));

    // Nothing was submitted.
    assert_eq!(fixture.registry.attestation_count(), 0);
}

#[tokio::test]
async fn gated_without_conditions_field_fails_too() {
    let fixture = TestFixture::new();
    let schema = fixture
        .client
        .register_schema("string note")
        .await
        .unwrap();

    let options = AttestOptions {
        gated: true,
        ..AttestOptions::default()
    };
    let mut data = FieldMap::new();
    data.insert("note".into(), Value::String("hi".into()));
    let err = fixture
        .client
        .create_attestation(&data, schema, options)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));
}

#[tokio::test]
async fn access_denied_surfaces_through_resolution() {
    let fixture = TestFixture::new();
    fixture.fund_self(1_000);

    let schema = fixture
        .client
        .register_schema("string secret")
        .await
        .unwrap();
    let mut data = FieldMap::new();
    data.insert("secret".into(), Value::String("hunter2".into()));

    // Sealed while funded, resolved after the threshold moves out of reach.
    let conditions = vec![balance_threshold(fixture.chain(), "1000000")];
    let err = match fixture
        .client
        .create_attestation(&data, schema, AttestOptions::gated(conditions))
        .await
    {
        Ok(uid) => fixture
            .client
            .get_attestation(uid, ResolveOptions::gated())
            .await
            .unwrap_err(),
        Err(err) => err,
    };
    assert!(matches!(err, ClientError::Seal(SealError::AccessDenied(_))));
}

#[tokio::test]
async fn and_gate_requires_both_conditions() {
    let fixture = TestFixture::new();
    fixture.fund_self(1_000);
    let humanity_contract = "0xC5E9dDebb09Cd64DfaCab4011A0D5cEDaf7c9BDb";

    let schema = fixture
        .client
        .register_schema("string secret")
        .await
        .unwrap();
    let mut data = FieldMap::new();
    data.insert("secret".into(), Value::String("both or nothing".into()));

    let humanity = ConditionNode::Condition(AccessCondition::EvmBasic {
        contract_address: humanity_contract.to_string(),
        standard_contract_type: "ProofOfHumanity".to_string(),
        chain: fixture.chain().to_string(),
        method: "isRegistered".to_string(),
        parameters: vec![USER_ADDRESS.to_string()],
        return_value_test: ReturnValueTest::new(Comparator::Eq, "true"),
    });
    let conditions = vec![
        balance_threshold(fixture.chain(), "500"),
        ConditionNode::operator(Operator::And),
        humanity,
    ];

    let uid = fixture
        .client
        .create_attestation(&data, schema, AttestOptions::gated(conditions))
        .await
        .unwrap();

    // Funded but not registered: denied.
    let err = fixture
        .client
        .get_attestation(uid, ResolveOptions::gated())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Seal(SealError::AccessDenied(_))));

    // Registering satisfies the second branch.
    fixture.register_human(humanity_contract, fixture.address());
    let resolved = fixture
        .client
        .get_attestation(uid, ResolveOptions::gated())
        .await
        .unwrap();
    assert_eq!(resolved.decoded_data, data);
}

#[tokio::test]
async fn resolving_plain_attestation_as_gated_is_a_decode_error() {
    let fixture = TestFixture::new();
    let schema = fixture
        .client
        .register_schema("uint256 age,string name")
        .await
        .unwrap();

    let uid = fixture
        .client
        .create_attestation(&person_data(), schema, AttestOptions::default())
        .await
        .unwrap();

    let err = fixture
        .client
        .get_attestation(uid, ResolveOptions::gated())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Codec(CodecError::Decoding(_))
    ));
}

#[tokio::test]
async fn missing_fields_block_submission() {
    let fixture = TestFixture::new();
    let schema = fixture
        .client
        .register_schema("uint256 age,string name,bool active")
        .await
        .unwrap();

    let mut data = FieldMap::new();
    data.insert("name".into(), Value::String("Alice".into()));

    let err = fixture
        .client
        .create_attestation(&data, schema, AttestOptions::default())
        .await
        .unwrap_err();
    match err {
        ClientError::Codec(CodecError::MissingFields(names)) => {
            assert_eq!(names, vec!["age".to_string(), "active".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fixture.registry.attestation_count(), 0);
}

#[tokio::test]
async fn expiration_and_links_are_recorded() {
    let fixture = TestFixture::new();
    let schema = fixture
        .client
        .register_schema("string note")
        .await
        .unwrap();
    let mut data = FieldMap::new();
    data.insert("note".into(), Value::String("first".into()));

    let first = fixture
        .client
        .create_attestation(&data, schema, AttestOptions::default())
        .await
        .unwrap();

    let options = AttestOptions::default()
        .with_expiration(1_700_000_000)
        .revocable(true)
        .linked_to(first);
    let second = fixture
        .client
        .create_attestation(&data, schema, options)
        .await
        .unwrap();

    let resolved = fixture
        .client
        .get_attestation(second, ResolveOptions::default())
        .await
        .unwrap();
    assert_eq!(resolved.attestation.expiration_time, 1_700_000_000);
    assert!(resolved.attestation.revocable);
    assert_eq!(resolved.attestation.ref_uid, Some(first));
}

#[tokio::test]
async fn revocation_is_not_implemented() {
    let fixture = TestFixture::new();
    let err = fixture
        .client
        .revoke_attestation(attestgate::core::AttestationUid::ZERO, Some("test"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotImplemented(_)));
}

#[tokio::test]
async fn gating_unavailable_without_deployed_meta_schema() {
    let signer = LocalSigner::generate();
    let registry = Arc::new(MemoryRegistry::new());
    registry.connect(signer.address());
    let network = Arc::new(MemoryGateNetwork::new());

    let config = NetworkConfig::for_network("base-sepolia").unwrap();
    let client = Client::new(config, registry.clone(), network, Arc::new(signer));

    let schema = client.register_schema("string note").await.unwrap();
    let mut data = FieldMap::new();
    data.insert("note".into(), Value::String("hi".into()));

    let conditions = vec![balance_threshold("base-sepolia", "0")];
    let err = client
        .create_attestation(&data, schema, AttestOptions::gated(conditions))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::GatingUnavailable(_)));
}

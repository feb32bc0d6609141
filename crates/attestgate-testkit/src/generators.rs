//! Proptest generators for property-based testing.

use proptest::collection::vec;
use proptest::prelude::*;

use alloy_primitives::{Address, B256, U256};

use attestgate_core::{FieldMap, FieldType, Value};

/// Generate a supported field type.
pub fn field_type() -> impl Strategy<Value = FieldType> {
    prop_oneof![
        (1usize..=32).prop_map(|n| FieldType::Uint(n * 8)),
        Just(FieldType::Bool),
        Just(FieldType::Address),
        Just(FieldType::Bytes32),
        Just(FieldType::String),
        Just(FieldType::Bytes),
    ]
}

/// Generate a plausible field name.
pub fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9]{0,11}"
}

/// Generate a value matching the given field type.
pub fn value_for(ty: FieldType) -> BoxedStrategy<Value> {
    match ty {
        FieldType::Uint(bits) => any::<[u8; 32]>()
            .prop_map(move |bytes| {
                let mut masked = bytes;
                for b in masked.iter_mut().take(32 - bits / 8) {
                    *b = 0;
                }
                Value::Uint(U256::from_be_bytes(masked))
            })
            .boxed(),
        FieldType::Bool => any::<bool>().prop_map(Value::Bool).boxed(),
        FieldType::Address => any::<[u8; 20]>()
            .prop_map(|bytes| Value::Address(Address::from(bytes)))
            .boxed(),
        FieldType::Bytes32 => any::<[u8; 32]>()
            .prop_map(|bytes| Value::Bytes32(B256::from(bytes)))
            .boxed(),
        FieldType::String => ".{0,64}".prop_map(Value::String).boxed(),
        FieldType::Bytes => vec(any::<u8>(), 0..96).prop_map(Value::Bytes).boxed(),
    }
}

/// Generate a schema body plus a matching field mapping.
///
/// Field names are unique; the mapping covers every declared field.
pub fn schema_with_data() -> impl Strategy<Value = (String, FieldMap)> {
    vec((field_name(), field_type()), 1..6)
        .prop_filter("field names must be unique", |fields| {
            let mut names: Vec<&String> = fields.iter().map(|(name, _)| name).collect();
            names.sort();
            names.dedup();
            names.len() == fields.len()
        })
        .prop_flat_map(|fields| {
            let body = fields
                .iter()
                .map(|(name, ty)| format!("{ty} {name}"))
                .collect::<Vec<_>>()
                .join(",");
            let values: Vec<BoxedStrategy<(String, Value)>> = fields
                .into_iter()
                .map(|(name, ty)| {
                    value_for(ty)
                        .prop_map(move |v| (name.clone(), v))
                        .boxed()
                })
                .collect();
            (Just(body), values).prop_map(|(body, entries)| {
                (body, entries.into_iter().collect::<FieldMap>())
            })
        })
}

//! Property tests for the schema field codec.

use proptest::prelude::*;

use attestgate_core::schema::{self, SchemaDescriptor};
use attestgate_core::SchemaUid;
use attestgate_testkit::generators::schema_with_data;

proptest! {
    /// decode(encode(M, D), D) == M for any descriptor D and matching map M.
    #[test]
    fn encode_decode_roundtrip((body, data) in schema_with_data()) {
        let descriptor = SchemaDescriptor::new(SchemaUid::ZERO, body);
        let encoded = schema::encode(&descriptor, &data).unwrap();
        let decoded = schema::decode(&descriptor, &encoded).unwrap();
        prop_assert_eq!(decoded, data);
    }

    /// Dropping any field from the map blocks encoding with a full report.
    #[test]
    fn missing_field_always_reported((body, data) in schema_with_data()) {
        for name in data.keys() {
            let mut partial = data.clone();
            partial.remove(name);
            let descriptor = SchemaDescriptor::new(SchemaUid::ZERO, body.clone());
            let err = schema::encode(&descriptor, &partial).unwrap_err();
            match err {
                attestgate_core::CodecError::MissingFields(names) => {
                    prop_assert!(names.contains(name));
                }
                other => prop_assert!(false, "unexpected error: {}", other),
            }
        }
    }
}

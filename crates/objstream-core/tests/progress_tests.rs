//! Progress estimator tests

use objstream_core::progress::{estimate, STREAMING_CEILING};
use objstream_core::SchemaDescriptor;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

#[test]
fn test_schema_from_json_schema_document() {
    let schema = SchemaDescriptor::from_json_schema(&json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "summary": { "type": "string" },
            "tags": { "type": "array", "items": { "type": "string" } },
            "author": {
                "type": "object",
                "properties": { "name": { "type": "string" } }
            }
        }
    }));

    // Nested completeness does not count: author is present even though empty.
    let snapshot = json!({ "title": "T", "author": {} });
    assert_eq!(estimate(Some(&snapshot), Some(&schema)), 50);
}

#[test]
fn test_undeclared_keys_still_count() {
    let schema = SchemaDescriptor::object_with(["a", "b", "c", "d"]);
    let snapshot = json!({ "a": 1, "z": 2 });
    assert_eq!(estimate(Some(&snapshot), Some(&schema)), 50);
}

#[test]
fn test_malformed_schema_degrades_to_single_denominator() {
    let schema = SchemaDescriptor::from_json_schema(&json!("not a schema"));
    assert_eq!(estimate(Some(&json!({})), Some(&schema)), 0);
    assert_eq!(estimate(Some(&json!({ "a": 1 })), Some(&schema)), 99);
}

#[test]
fn test_absent_snapshot_is_zero() {
    let schema = SchemaDescriptor::object_with(["a"]);
    assert_eq!(estimate(None, Some(&schema)), 0);
    assert_eq!(estimate(None, None), 0);
}

fn object_with_keys(count: usize) -> Value {
    let members: Map<String, Value> = (0..count)
        .map(|i| (format!("k{}", i), Value::from(i)))
        .collect();
    Value::Object(members)
}

proptest! {
    #[test]
    fn prop_estimate_never_reaches_complete(
        declared in 0usize..12,
        present in 0usize..20,
    ) {
        let schema = SchemaDescriptor::object_with((0..declared).map(|i| format!("k{}", i)));
        let snapshot = object_with_keys(present);
        let value = estimate(Some(&snapshot), Some(&schema));
        prop_assert!(value <= STREAMING_CEILING);
    }

    #[test]
    fn prop_estimate_grows_with_keys(declared in 1usize..12, present in 0usize..11) {
        let schema = SchemaDescriptor::object_with((0..declared).map(|i| format!("k{}", i)));
        let fewer = estimate(Some(&object_with_keys(present)), Some(&schema));
        let more = estimate(Some(&object_with_keys(present + 1)), Some(&schema));
        prop_assert!(fewer <= more);
    }
}

//! Completion estimate for a partially streamed object.
//!
//! The estimate counts top-level keys present in the snapshot against the
//! top-level properties declared by the schema. Nested completeness is not
//! reflected. The estimator never reports 100: only a completed stream does.

use serde_json::Value;

use crate::model::SchemaDescriptor;

/// Highest value the estimator itself may report
pub const STREAMING_CEILING: u8 = 99;

/// Progress reported once the stream has completed
pub const COMPLETE: u8 = 100;

/// Estimate completion in `[0, 99]`.
///
/// Denominator is the number of top-level properties declared by `schema`,
/// or 1 when the schema is absent or does not describe an object. Numerator
/// is the number of top-level keys present in `snapshot` (a `null` member is
/// present). Non-object snapshots count as zero keys.
pub fn estimate(snapshot: Option<&Value>, schema: Option<&SchemaDescriptor>) -> u8 {
    let declared = schema.map_or(0, SchemaDescriptor::top_level_count);
    let denominator = declared.max(1) as u64;
    let present = snapshot
        .and_then(Value::as_object)
        .map_or(0, |members| members.len()) as u64;

    // round-half-up of 100 * present / denominator, in integers
    let rounded = (200 * present + denominator) / (2 * denominator);
    rounded.min(STREAMING_CEILING as u64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_three_property_scenario() {
        let schema = SchemaDescriptor::object_with(["a", "b", "c"]);
        assert_eq!(estimate(Some(&json!({})), Some(&schema)), 0);
        assert_eq!(estimate(Some(&json!({ "a": 1 })), Some(&schema)), 33);
        assert_eq!(estimate(Some(&json!({ "a": 1, "b": 2 })), Some(&schema)), 67);
        assert_eq!(
            estimate(Some(&json!({ "a": 1, "b": 2, "c": 3 })), Some(&schema)),
            99
        );
    }

    #[test]
    fn test_rounds_half_up() {
        let schema = SchemaDescriptor::object_with(["a", "b"]);
        assert_eq!(estimate(Some(&json!({ "a": 1 })), Some(&schema)), 50);
        let schema = SchemaDescriptor::object_with(["a", "b", "c", "d", "e", "f", "g", "h"]);
        // 100 * 1 / 8 = 12.5
        assert_eq!(estimate(Some(&json!({ "a": 1 })), Some(&schema)), 13);
    }

    #[test]
    fn test_absent_schema_uses_unit_denominator() {
        assert_eq!(estimate(Some(&json!({})), None), 0);
        assert_eq!(estimate(Some(&json!({ "x": 1 })), None), 99);
        assert_eq!(estimate(None, None), 0);
    }

    #[test]
    fn test_malformed_schema_and_snapshot() {
        let schema = SchemaDescriptor::from_json_schema(&json!(["nonsense"]));
        assert_eq!(estimate(Some(&json!({ "a": 1 })), Some(&schema)), 99);
        let schema = SchemaDescriptor::object_with(["a"]);
        assert_eq!(estimate(Some(&json!("partial text")), Some(&schema)), 0);
    }

    #[test]
    fn test_null_member_counts_as_present() {
        let schema = SchemaDescriptor::object_with(["a", "b"]);
        assert_eq!(estimate(Some(&json!({ "a": null })), Some(&schema)), 50);
    }
}

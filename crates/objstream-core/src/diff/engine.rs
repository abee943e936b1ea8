//! Snapshot diff computation.

use serde_json::Value;

use crate::model::{ChangeSet, FieldPath};

/// Compute the change set for the transition `previous -> next`.
///
/// With no previous snapshot every reachable path of `next` is reported.
/// Otherwise object members are compared key by key; a member whose value
/// differs is reported, and if it is an object the comparison recurses so
/// both the parent and the changed descendants appear. Arrays and primitives
/// are compared by value at their own path. A non-object root that differs is
/// reported under the root path.
pub fn compute_changes(previous: Option<&Value>, next: &Value) -> ChangeSet {
    let mut changes = ChangeSet::new();
    diff_into(previous, next, &FieldPath::root(), &mut changes);
    changes
}

/// Every reachable path of `value`, as produced for a first snapshot.
pub fn collect_all_paths(value: &Value) -> ChangeSet {
    let mut changes = ChangeSet::new();
    collect_into(value, &FieldPath::root(), &mut changes);
    changes
}

fn diff_into(previous: Option<&Value>, next: &Value, at: &FieldPath, out: &mut ChangeSet) {
    let Some(previous) = previous else {
        collect_into(next, at, out);
        return;
    };

    let Value::Object(members) = next else {
        // Only reachable for the root; members are handled below.
        if previous != next {
            out.insert(at.clone());
        }
        return;
    };

    let previous_members = previous.as_object();
    for (key, value) in members {
        let before = previous_members.and_then(|m| m.get(key));
        if before == Some(value) {
            continue;
        }
        let path = at.child_key(key);
        if value.is_object() {
            out.insert(path.clone());
            diff_into(before, value, &path, out);
        } else if before.is_none() {
            collect_into(value, &path, out);
        } else {
            out.insert(path);
        }
    }
}

fn collect_into(value: &Value, at: &FieldPath, out: &mut ChangeSet) {
    match value {
        Value::Object(members) => {
            for (key, member) in members {
                let path = at.child_key(key);
                out.insert(path.clone());
                collect_into(member, &path, out);
            }
        }
        Value::Array(items) => {
            out.insert(at.clone());
            for (index, item) in items.iter().enumerate() {
                let path = at.child_index(index);
                out.insert(path.clone());
                collect_into(item, &path, out);
            }
        }
        _ => {
            out.insert(at.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths(changes: &ChangeSet) -> Vec<&str> {
        changes.iter().map(|p| p.as_str()).collect()
    }

    #[test]
    fn test_nested_change_marks_parent_and_leaf() {
        let prev = json!({ "user": { "name": "A" } });
        let next = json!({ "user": { "name": "B" } });
        let changes = compute_changes(Some(&prev), &next);
        assert_eq!(paths(&changes), vec!["user", "user.name"]);
    }

    #[test]
    fn test_identical_snapshots_yield_empty_set() {
        let snap = json!({ "a": 1, "b": { "c": [1, 2] } });
        assert!(compute_changes(Some(&snap), &snap.clone()).is_empty());
    }

    #[test]
    fn test_first_snapshot_reports_everything() {
        let next = json!({ "title": "x", "tags": ["a", "b"], "meta": { "n": 1 } });
        let changes = compute_changes(None, &next);
        assert_eq!(
            paths(&changes),
            vec!["meta", "meta.n", "tags", "tags[0]", "tags[1]", "title"]
        );
    }

    #[test]
    fn test_removed_keys_are_not_reported() {
        let prev = json!({ "a": 1, "b": 2 });
        let next = json!({ "a": 1 });
        assert!(compute_changes(Some(&prev), &next).is_empty());
    }

    #[test]
    fn test_array_is_compared_atomically() {
        let prev = json!({ "tags": ["a"] });
        let next = json!({ "tags": ["a", "b"] });
        assert_eq!(paths(&compute_changes(Some(&prev), &next)), vec!["tags"]);
    }

    #[test]
    fn test_new_member_subtree_is_fully_reported() {
        let prev = json!({ "a": 1 });
        let next = json!({ "a": 1, "items": [{ "id": 7 }] });
        assert_eq!(
            paths(&compute_changes(Some(&prev), &next)),
            vec!["items", "items[0]", "items[0].id"]
        );
    }

    #[test]
    fn test_object_replacing_primitive_reports_subtree() {
        let prev = json!({ "a": "pending" });
        let next = json!({ "a": { "b": 1 } });
        assert_eq!(paths(&compute_changes(Some(&prev), &next)), vec!["a", "a.b"]);
    }

    #[test]
    fn test_non_object_root_uses_root_path() {
        let changes = compute_changes(Some(&json!("par")), &json!("partial"));
        assert_eq!(changes.len(), 1);
        assert!(changes.contains(&FieldPath::root()));
    }

    #[test]
    fn test_first_snapshot_root_array() {
        let changes = compute_changes(None, &json!([1, { "k": true }]));
        assert_eq!(paths(&changes), vec!["", "[0]", "[1]", "[1].k"]);
    }

    #[test]
    fn test_null_member_counts_as_value() {
        let prev = json!({ "a": null });
        let next = json!({ "a": 0 });
        assert_eq!(paths(&compute_changes(Some(&prev), &next)), vec!["a"]);
    }
}

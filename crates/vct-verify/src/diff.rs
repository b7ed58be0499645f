//! # Tamper Diff
//!
//! Top-level field comparison between the original (signed) subject and
//! the uploaded subject:
//!
//! - `added`: keys only in the uploaded subject, with the uploaded value.
//! - `removed`: keys only in the original subject, with the original value.
//! - `changed`: keys in both whose serialized values differ, as
//!   `{from: original, to: uploaded}`.
//!
//! Nested objects are compared wholesale. Values are equal iff their
//! serialized forms under the configured [`KeyOrder`] match, so with
//! insertion order a nested key reordering shows up as a change. A side
//! that is not a JSON object contributes no keys.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use vct_core::{CanonicalBytes, KeyOrder};

/// A changed field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    /// Value in the original subject.
    pub from: Value,
    /// Value in the uploaded subject.
    pub to: Value,
}

/// Field-level differences between two subjects. Key sets of the three
/// maps are disjoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TamperDiff {
    /// Fields present only in the uploaded subject.
    pub added: BTreeMap<String, Value>,
    /// Fields present only in the original subject.
    pub removed: BTreeMap<String, Value>,
    /// Fields present in both with different values.
    pub changed: BTreeMap<String, FieldChange>,
}

impl TamperDiff {
    /// True when no field was added, removed or changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Compare `original` against `uploaded`.
pub fn diff(original: &Value, uploaded: &Value, order: KeyOrder) -> TamperDiff {
    let empty = Map::new();
    let original = original.as_object().unwrap_or(&empty);
    let uploaded = uploaded.as_object().unwrap_or(&empty);

    let mut result = TamperDiff::default();
    for (key, to) in uploaded {
        match original.get(key) {
            None => {
                result.added.insert(key.clone(), to.clone());
            }
            Some(from) if !same_serialization(from, to, order) => {
                result.changed.insert(
                    key.clone(),
                    FieldChange {
                        from: from.clone(),
                        to: to.clone(),
                    },
                );
            }
            Some(_) => {}
        }
    }
    for (key, from) in original {
        if !uploaded.contains_key(key) {
            result.removed.insert(key.clone(), from.clone());
        }
    }
    result
}

fn same_serialization(a: &Value, b: &Value, order: KeyOrder) -> bool {
    match (CanonicalBytes::new(a, order), CanonicalBytes::new(b, order)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(s: &str) -> Value {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn identical_subjects_have_empty_diff() {
        let v = json!({"name": "Alice", "degree": {"type": "BSc"}});
        assert!(diff(&v, &v, KeyOrder::Insertion).is_empty());
    }

    #[test]
    fn three_way_classification() {
        let original = json!({"name": "Alice", "gpa": 3.9, "id": "did:example:1"});
        let uploaded = json!({"name": "Mallory", "id": "did:example:1", "honors": true});
        let d = diff(&original, &uploaded, KeyOrder::Insertion);

        assert_eq!(d.added, BTreeMap::from([("honors".to_string(), json!(true))]));
        assert_eq!(d.removed, BTreeMap::from([("gpa".to_string(), json!(3.9))]));
        assert_eq!(
            d.changed,
            BTreeMap::from([(
                "name".to_string(),
                FieldChange {
                    from: json!("Alice"),
                    to: json!("Mallory")
                }
            )])
        );
    }

    #[test]
    fn nested_changes_are_reported_wholesale() {
        let original = json!({"degree": {"type": "BSc", "year": 2020}});
        let uploaded = json!({"degree": {"type": "MSc", "year": 2020}});
        let d = diff(&original, &uploaded, KeyOrder::Insertion);
        assert_eq!(d.changed["degree"].from, original["degree"]);
        assert_eq!(d.changed["degree"].to, uploaded["degree"]);
    }

    #[test]
    fn nested_key_order_matters_only_in_insertion_mode() {
        let original = parse(r#"{"degree": {"type": "BSc", "year": 2020}}"#);
        let uploaded = parse(r#"{"degree": {"year": 2020, "type": "BSc"}}"#);
        assert_eq!(diff(&original, &uploaded, KeyOrder::Insertion).changed.len(), 1);
        assert!(diff(&original, &uploaded, KeyOrder::Sorted).is_empty());
    }

    #[test]
    fn non_object_sides_contribute_no_keys() {
        let uploaded = json!({"a": 1});
        let d = diff(&Value::Null, &uploaded, KeyOrder::Insertion);
        assert_eq!(d.added.len(), 1);
        assert!(d.removed.is_empty());

        let d = diff(&uploaded, &json!([1, 2]), KeyOrder::Insertion);
        assert_eq!(d.removed.len(), 1);
        assert!(d.added.is_empty());
    }

    #[test]
    fn serializes_as_three_maps() {
        let d = diff(&json!({"a": 1}), &json!({"a": 2}), KeyOrder::Insertion);
        assert_eq!(
            serde_json::to_value(&d).unwrap(),
            json!({"added": {}, "removed": {}, "changed": {"a": {"from": 1, "to": 2}}})
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::BTreeSet;

        fn subject() -> impl Strategy<Value = Value> {
            proptest::collection::btree_map(
                "[a-e]",
                prop_oneof![
                    any::<i64>().prop_map(Value::from),
                    "[a-z]{0,4}".prop_map(Value::from),
                    any::<bool>().prop_map(Value::from),
                ],
                0..6,
            )
            .prop_map(|m| Value::Object(m.into_iter().collect()))
        }

        fn keys(v: &Value) -> BTreeSet<String> {
            v.as_object()
                .map(|m| m.keys().cloned().collect())
                .unwrap_or_default()
        }

        proptest! {
            #[test]
            fn self_diff_is_empty(v in subject()) {
                prop_assert!(diff(&v, &v, KeyOrder::Insertion).is_empty());
            }

            #[test]
            fn key_sets_follow_set_algebra(a in subject(), b in subject()) {
                let d = diff(&a, &b, KeyOrder::Insertion);
                let (ka, kb) = (keys(&a), keys(&b));

                let added: BTreeSet<String> = d.added.keys().cloned().collect();
                let removed: BTreeSet<String> = d.removed.keys().cloned().collect();
                let changed: BTreeSet<String> = d.changed.keys().cloned().collect();

                let expected_added: BTreeSet<String> = kb.difference(&ka).cloned().collect();
                let expected_removed: BTreeSet<String> = ka.difference(&kb).cloned().collect();
                prop_assert_eq!(&added, &expected_added);
                prop_assert_eq!(&removed, &expected_removed);
                let expected_changed: BTreeSet<String> = ka
                    .intersection(&kb)
                    .filter(|k| a[k.as_str()] != b[k.as_str()])
                    .cloned()
                    .collect();
                prop_assert_eq!(&changed, &expected_changed);
                prop_assert!(added.is_disjoint(&removed));
                prop_assert!(added.is_disjoint(&changed));
                prop_assert!(removed.is_disjoint(&changed));
            }

            #[test]
            fn diff_is_deterministic(a in subject(), b in subject()) {
                prop_assert_eq!(
                    diff(&a, &b, KeyOrder::Sorted),
                    diff(&a.clone(), &b.clone(), KeyOrder::Sorted)
                );
            }
        }
    }
}

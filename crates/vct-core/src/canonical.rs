//! # Subject Serialization: Byte Production for Hashing
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! fed into a credential hash.
//!
//! ## Invariant
//!
//! `CanonicalBytes` has a private inner field. The only constructor is
//! `CanonicalBytes::new()`, which applies number coercion and then serializes
//! compactly under an explicit [`KeyOrder`]. Any function computing a
//! credential hash accepts `&CanonicalBytes`, so bytes from some other
//! serialization path cannot reach the digest.
//!
//! ## Key Order
//!
//! Producers compute `credentialHash` over their own serialization of the
//! subject. Two layouts are supported:
//!
//! - [`KeyOrder::Insertion`] keeps object keys in document order with compact
//!   separators. This is the byte layout of a plain JavaScript
//!   `JSON.stringify` and the interoperable default.
//! - [`KeyOrder::Sorted`] emits RFC 8785 (JCS) output via `serde_jcs`:
//!   lexicographically sorted keys, ES6 number formatting.
//!
//! ## Number Coercion
//!
//! Floats with an integral value inside the IEEE-754 safe integer range are
//! rewritten as integers (`1.0` becomes `1`), matching how ECMAScript prints
//! them. Other floats pass through unchanged.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Largest integer exactly representable in an IEEE-754 double.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Object key ordering used when serializing a value for hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyOrder {
    /// Keys in the order they appear in the source document.
    #[default]
    Insertion,
    /// Keys sorted per RFC 8785.
    Sorted,
}

impl KeyOrder {
    /// Returns the configuration identifier for this ordering.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insertion => "insertion",
            Self::Sorted => "sorted",
        }
    }
}

impl std::fmt::Display for KeyOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KeyOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "insertion" | "document" => Ok(Self::Insertion),
            "sorted" | "jcs" => Ok(Self::Sorted),
            other => Err(format!(
                "unknown key order {other:?}; expected \"insertion\" or \"sorted\""
            )),
        }
    }
}

/// Bytes produced exclusively by the hashing serialization pipeline.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - Separators are compact (no whitespace).
/// - Integral floats in the safe range are printed as integers.
/// - Key order is exactly the [`KeyOrder`] requested at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Serialize any value for hashing under the given key order.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the value
    /// cannot be represented as JSON.
    pub fn new(obj: &impl Serialize, order: KeyOrder) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let coerced = coerce_json_value(value);
        let bytes = match order {
            KeyOrder::Insertion => serde_json::to_vec(&coerced)?,
            KeyOrder::Sorted => serde_jcs::to_string(&coerced)?.into_bytes(),
        };
        Ok(Self(bytes))
    }

    /// Access the serialized bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// View the bytes as UTF-8 text. Serialization always yields valid UTF-8.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Returns the length of the serialized byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively rewrite integral floats as integers.
fn coerce_json_value(value: Value) -> Value {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => value,
        Value::Number(ref n) => {
            if n.is_f64() {
                if let Some(f) = n.as_f64() {
                    if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
                        return Value::from(f as i64);
                    }
                }
            }
            value
        }
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, coerce_json_value(v)))
                .collect(),
        ),
        Value::Array(arr) => Value::Array(arr.into_iter().map(coerce_json_value).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn insertion(v: &Value) -> String {
        CanonicalBytes::new(v, KeyOrder::Insertion)
            .unwrap()
            .as_str()
            .to_string()
    }

    fn sorted(v: &Value) -> String {
        CanonicalBytes::new(v, KeyOrder::Sorted)
            .unwrap()
            .as_str()
            .to_string()
    }

    #[test]
    fn insertion_order_keeps_document_order() {
        let v: Value = serde_json::from_str(r#"{"z": 1, "m": 2, "a": 3}"#).unwrap();
        assert_eq!(insertion(&v), r#"{"z":1,"m":2,"a":3}"#);
    }

    #[test]
    fn sorted_order_sorts_keys() {
        let v: Value = serde_json::from_str(r#"{"z": 1, "m": 2, "a": 3}"#).unwrap();
        assert_eq!(sorted(&v), r#"{"a":3,"m":2,"z":1}"#);
    }

    #[test]
    fn nested_objects_follow_the_requested_order() {
        let v: Value =
            serde_json::from_str(r#"{"outer": {"b": 2, "a": 1}, "list": [3, 2, 1]}"#).unwrap();
        assert_eq!(insertion(&v), r#"{"outer":{"b":2,"a":1},"list":[3,2,1]}"#);
        assert_eq!(sorted(&v), r#"{"list":[3,2,1],"outer":{"a":1,"b":2}}"#);
    }

    #[test]
    fn integral_floats_print_as_integers() {
        let v: Value = serde_json::from_str(r#"{"n": 1.0, "m": -0.0, "k": 2.5}"#).unwrap();
        assert_eq!(insertion(&v), r#"{"n":1,"m":0,"k":2.5}"#);
    }

    #[test]
    fn strings_are_escaped_compactly() {
        let v = json!({"s": "line\nbreak \"quoted\" / slash"});
        assert_eq!(insertion(&v), r#"{"s":"line\nbreak \"quoted\" / slash"}"#);
    }

    #[test]
    fn null_serializes_as_literal() {
        assert_eq!(insertion(&Value::Null), "null");
        assert_eq!(sorted(&Value::Null), "null");
    }

    #[test]
    fn key_order_parses_from_config_strings() {
        assert_eq!("insertion".parse::<KeyOrder>(), Ok(KeyOrder::Insertion));
        assert_eq!("SORTED".parse::<KeyOrder>(), Ok(KeyOrder::Sorted));
        assert_eq!("jcs".parse::<KeyOrder>(), Ok(KeyOrder::Sorted));
        assert!("random".parse::<KeyOrder>().is_err());
        assert_eq!(KeyOrder::default(), KeyOrder::Insertion);
    }

    #[test]
    fn empty_object_has_nonempty_bytes() {
        let cb = CanonicalBytes::new(&json!({}), KeyOrder::Insertion).unwrap();
        assert_eq!(cb.as_bytes(), b"{}");
        assert_eq!(cb.len(), 2);
        assert!(!cb.is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn orders_agree_on_single_key_objects(key in "[a-z]{1,8}", n in any::<i64>()) {
                let mut map = serde_json::Map::new();
                map.insert(key, json!(n));
                let v = Value::Object(map);
                prop_assert_eq!(insertion(&v), sorted(&v));
            }

            #[test]
            fn serialization_is_deterministic(s in ".{0,32}", n in any::<u32>()) {
                let v = json!({"s": s, "n": n});
                prop_assert_eq!(insertion(&v), insertion(&v.clone()));
            }
        }
    }
}

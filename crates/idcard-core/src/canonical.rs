//! # Canonical Serialization: JCS Byte Production
//!
//! This module defines `CanonicalBytes`, the sole construction path for the
//! bytes that card signatures bind to.
//!
//! ## Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through [`CanonicalBytes::new()`] or
//! [`CanonicalBytes::from_value()`], both of which serialize with
//! `serde_jcs` (RFC 8785): sorted keys, compact separators, deterministic
//! number formatting. Same logical value, same bytes, on every platform.
//!
//! JCS writes a whole-valued float such as `1.0` or `-0.0` as an integer,
//! so reparsing the bytes would yield a different JSON number. Such floats
//! are rejected before serialization.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - Object keys are sorted; separators are compact.
/// - The bytes are valid UTF-8 JSON.
/// - The inner `Vec<u8>` is private, so downstream code cannot forge it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the value
    /// cannot be represented as JSON (e.g. a map with non-string keys).
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_value(value)
    }

    /// Construct canonical bytes from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::IntegralFloat` if the value holds a
    /// float whose JCS form would reparse as an integer.
    pub fn from_value(value: Value) -> Result<Self, CanonicalizationError> {
        reject_integral_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the owned byte vector.
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Largest magnitude JCS still prints without an exponent.
const PLAIN_NOTATION_LIMIT: f64 = 1e21;

fn reject_integral_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < PLAIN_NOTATION_LIMIT => {
                Err(CanonicalizationError::IntegralFloat(f))
            }
            _ => Ok(()),
        },
        Value::Array(items) => items.iter().try_for_each(reject_integral_floats),
        Value::Object(map) => map.values().try_for_each(reject_integral_floats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_bytes_sorted_keys() {
        let data = serde_json::json!({"z": 1, "m": 2, "a": 3});
        let cb = CanonicalBytes::new(&data).expect("should canonicalize");
        assert_eq!(cb.as_bytes(), br#"{"a":3,"m":2,"z":1}"#);
    }

    #[test]
    fn test_canonical_bytes_nested() {
        let data = serde_json::json!({
            "outer": {"b": 2, "a": 1},
            "list": [3, 2, 1]
        });
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"list":[3,2,1],"outer":{"a":1,"b":2}}"#);
    }

    #[test]
    fn test_null_and_bool_passthrough() {
        let data = serde_json::json!({"flag": true, "key": null});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"flag":true,"key":null}"#);
    }

    #[test]
    fn test_empty_object() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(cb.as_bytes(), b"{}");
        assert!(!cb.is_empty());
    }

    #[test]
    fn test_whitespace_is_normalized() {
        let a: Value = serde_json::from_str("{ \"b\" : 1 ,\n \"a\" : [ 1 , 2 ] }").unwrap();
        let b: Value = serde_json::from_str(r#"{"a":[1,2],"b":1}"#).unwrap();
        assert_eq!(
            CanonicalBytes::from_value(a).unwrap(),
            CanonicalBytes::from_value(b).unwrap()
        );
    }

    #[test]
    fn test_unicode_passthrough() {
        let data = serde_json::json!({"name": "\u{00e9}l\u{00e8}ve"});
        let cb = CanonicalBytes::new(&data).unwrap();
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert!(s.contains('\u{00e9}'));
    }

    #[test]
    fn test_integral_floats_rejected() {
        for data in [
            serde_json::json!({"amount": 1.0}),
            serde_json::json!([[-0.0]]),
            serde_json::json!({"n": {"big": 1e20}}),
        ] {
            assert!(matches!(
                CanonicalBytes::from_value(data),
                Err(CanonicalizationError::IntegralFloat(_))
            ));
        }
    }

    #[test]
    fn test_fractional_and_exponent_floats_accepted() {
        let cb = CanonicalBytes::new(&serde_json::json!({"a": 1.5, "b": 1e21})).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"a":1.5,"b":1e+21}"#);
    }

    #[test]
    fn test_large_integers_accepted() {
        let cb = CanonicalBytes::new(&serde_json::json!({"max": u64::MAX})).unwrap();
        assert!(!cb.is_empty());
    }

    #[test]
    fn test_into_vec_matches_as_bytes() {
        let cb = CanonicalBytes::new(&serde_json::json!({"a": 1})).unwrap();
        let bytes = cb.as_bytes().to_vec();
        assert_eq!(cb.into_vec(), bytes);
    }
}

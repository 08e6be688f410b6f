//! # Transport Encodings
//!
//! Standard (padded) base64 is the transport form for every byte field in
//! the stack: snapshots, public keys, signatures, exported cards.
//!
//! The [`base64_bytes`] module plugs into `#[serde(with = ...)]` so byte
//! fields serialize as base64 strings in JSON.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::CardError;

/// Encode bytes as standard padded base64.
pub fn to_base64(bytes: impl AsRef<[u8]>) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard padded base64.
///
/// # Errors
///
/// Returns `CardError::Decoding` on malformed input.
pub fn from_base64(text: &str) -> Result<Vec<u8>, CardError> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| CardError::Decoding(format!("malformed base64: {e}")))
}

/// Serde adapter: `Vec<u8>` as a base64 string.
pub mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as base64.
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    /// Deserialize bytes from base64.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s.as_bytes()).map_err(serde::de::Error::custom)
    }
}

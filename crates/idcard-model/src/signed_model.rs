//! # Signed Model: Snapshot Plus Ordered Signature Set
//!
//! [`SignedModel`] pairs an immutable content snapshot with the signatures
//! collected over it.
//!
//! ## Invariants
//!
//! - The snapshot is assigned once, at construction. There is no setter.
//! - `signatures` never holds two structurally equal entries.
//!   [`SignedModel::add_signature`] rejects a duplicate with
//!   `CardError::DuplicateSignature` and leaves the list untouched.
//! - Insertion order is preserved and meaningful: owner first, then
//!   authorities, then the issuing service.
//! - Mutation takes `&mut self`, so an in-progress model has exactly one
//!   writer.
//!
//! ## Encodings
//!
//! | form | carries | produced by | consumed by |
//! |---|---|---|---|
//! | base64 text | snapshot only | `Display` / `to_string()` | [`SignedModel::from_string`], `FromStr` |
//! | JSON text | snapshot only | [`SignedModel::to_json`] | [`SignedModel::from_json`], [`SignedModel::from_json_str`] |
//! | envelope JSON | snapshot + signatures | [`SignedModel::to_envelope`] | [`SignedModel::from_envelope`] |

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use idcard_core::encoding::{base64_bytes, from_base64, to_base64};
use idcard_core::{CanonicalBytes, CardContent, CardError, CardId, SignerId, Timestamp};

use crate::signature::Signature;

/// A content snapshot and the signatures collected over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedModel {
    content_snapshot: Vec<u8>,
    signatures: Vec<Signature>,
}

/// Wire form carrying both the snapshot and the signatures.
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    #[serde(with = "base64_bytes")]
    content_snapshot: Vec<u8>,
    #[serde(default)]
    signatures: Vec<Signature>,
}

impl SignedModel {
    /// Wrap raw snapshot bytes. The signature list starts empty.
    pub fn new(content_snapshot: impl Into<Vec<u8>>) -> Self {
        Self {
            content_snapshot: content_snapshot.into(),
            signatures: Vec::new(),
        }
    }

    /// Build a fresh model from new card content.
    pub fn generate(
        public_key: &[u8],
        identity: &str,
        created_at: Timestamp,
        previous_card_id: Option<CardId>,
    ) -> Result<Self, CardError> {
        let snapshot = CardContent::generate(public_key, identity, created_at, previous_card_id)?;
        Ok(Self::new(snapshot.into_vec()))
    }

    /// Build a model over the snapshot of existing content.
    pub fn from_content(content: &CardContent) -> Result<Self, CardError> {
        Ok(Self::new(content.snapshot()?.into_vec()))
    }

    /// Decode a base64 snapshot.
    ///
    /// # Errors
    ///
    /// `CardError::Decoding` on malformed base64.
    pub fn from_string(encoded: &str) -> Result<Self, CardError> {
        Ok(Self::new(from_base64(encoded)?))
    }

    /// Store the canonical encoding of a structured JSON value as the snapshot.
    ///
    /// # Errors
    ///
    /// `CardError::Decoding` if the value holds a whole-valued float such as
    /// `1.0`, whose canonical text would reparse as an integer.
    pub fn from_json(value: &Value) -> Result<Self, CardError> {
        let canonical = CanonicalBytes::from_value(value.clone())
            .map_err(|e| CardError::Decoding(format!("value cannot be canonicalized: {e}")))?;
        Ok(Self::new(canonical.into_vec()))
    }

    /// Parse JSON text, then behave as [`SignedModel::from_json`].
    ///
    /// For a model whose snapshot is already canonical JSON,
    /// `from_json_str(&m.to_json()?)` reproduces `m`'s snapshot exactly.
    pub fn from_json_str(text: &str) -> Result<Self, CardError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| CardError::Decoding(format!("invalid JSON: {e}")))?;
        Self::from_json(&value)
    }

    /// The snapshot as UTF-8 text.
    ///
    /// # Errors
    ///
    /// `CardError::Encoding` if the snapshot bytes are not valid UTF-8.
    pub fn to_json(&self) -> Result<String, CardError> {
        String::from_utf8(self.content_snapshot.clone())
            .map_err(|e| CardError::Encoding(format!("snapshot is not UTF-8 text: {e}")))
    }

    /// Serialize snapshot and signatures, in order, as one JSON document.
    pub fn to_envelope(&self) -> Result<String, CardError> {
        let envelope = Envelope {
            content_snapshot: self.content_snapshot.clone(),
            signatures: self.signatures.clone(),
        };
        serde_json::to_string(&envelope)
            .map_err(|e| CardError::Encoding(format!("envelope serialization failed: {e}")))
    }

    /// Decode an envelope produced by [`SignedModel::to_envelope`].
    ///
    /// Signatures are re-added one by one, so an envelope carrying a
    /// duplicate is rejected with `CardError::DuplicateSignature`.
    pub fn from_envelope(text: &str) -> Result<Self, CardError> {
        let envelope: Envelope = serde_json::from_str(text)
            .map_err(|e| CardError::Decoding(format!("invalid signed model envelope: {e}")))?;
        let mut model = Self::new(envelope.content_snapshot);
        for signature in envelope.signatures {
            model.add_signature(signature)?;
        }
        Ok(model)
    }

    /// Append a signature unless a structurally equal one is present.
    pub fn add_signature(&mut self, signature: Signature) -> Result<(), CardError> {
        if signature.signature_bytes.is_empty() {
            return Err(CardError::invalid_argument(format!(
                "signature bytes from {} are empty",
                signature.signer_id
            )));
        }
        if self.signatures.contains(&signature) {
            return Err(CardError::DuplicateSignature {
                signer_id: signature.signer_id.to_string(),
            });
        }
        self.signatures.push(signature);
        Ok(())
    }

    /// The raw snapshot bytes.
    pub fn content_snapshot(&self) -> &[u8] {
        &self.content_snapshot
    }

    /// Signatures in the order they were added.
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Signatures filed under `signer_id`, in order.
    pub fn signatures_by<'a>(
        &'a self,
        signer_id: &'a SignerId,
    ) -> impl Iterator<Item = &'a Signature> + 'a {
        self.signatures.iter().filter(move |s| &s.signer_id == signer_id)
    }

    /// Decode the snapshot as card content.
    pub fn content(&self) -> Result<CardContent, CardError> {
        CardContent::from_snapshot(&self.content_snapshot)
    }

    /// The content address of this model's snapshot.
    pub fn card_id(&self) -> CardId {
        CardId::from_snapshot(&self.content_snapshot)
    }
}

/// Base64 of the snapshot. Signatures are not included.
impl std::fmt::Display for SignedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&to_base64(&self.content_snapshot))
    }
}

impl FromStr for SignedModel {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

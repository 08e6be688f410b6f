//! # Card Content and Its Canonical Snapshot
//!
//! [`CardContent`] is the immutable payload of an identity card. Its
//! snapshot is the pre-image every card signature is computed over, so the
//! encoding must never drift.
//!
//! ## Snapshot Format
//!
//! JCS-canonical JSON (via [`CanonicalBytes`]) of:
//!
//! ```text
//! {"created_at":<int>,"identity":<str>,"previous_card_id":<hex>?,"public_key":<base64>,"version":<str>}
//! ```
//!
//! `previous_card_id` is omitted entirely when absent. Keys are sorted by
//! JCS, so field declaration order never affects the bytes.

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalBytes;
use crate::encoding::base64_bytes;
use crate::error::CardError;
use crate::identity::CardId;
use crate::temporal::Timestamp;

/// Content-format version written into every new snapshot.
pub const CONTENT_VERSION: &str = "5.0";

/// Immutable card content. All fields are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CardContent {
    identity: String,
    #[serde(with = "base64_bytes")]
    public_key: Vec<u8>,
    version: String,
    created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous_card_id: Option<CardId>,
}

impl CardContent {
    /// Build content at the current protocol version.
    ///
    /// # Errors
    ///
    /// `CardError::InvalidArgument` if `identity` is empty or whitespace, or
    /// if `public_key` is empty.
    pub fn new(
        identity: impl Into<String>,
        public_key: impl Into<Vec<u8>>,
        created_at: Timestamp,
        previous_card_id: Option<CardId>,
    ) -> Result<Self, CardError> {
        let content = Self {
            identity: identity.into(),
            public_key: public_key.into(),
            version: CONTENT_VERSION.to_string(),
            created_at,
            previous_card_id,
        };
        content.validate()?;
        Ok(content)
    }

    /// Build content and return its canonical snapshot in one step.
    pub fn generate(
        public_key: &[u8],
        identity: &str,
        created_at: Timestamp,
        previous_card_id: Option<CardId>,
    ) -> Result<CanonicalBytes, CardError> {
        Self::new(identity, public_key, created_at, previous_card_id)?.snapshot()
    }

    /// The canonical snapshot of this content.
    pub fn snapshot(&self) -> Result<CanonicalBytes, CardError> {
        Ok(CanonicalBytes::new(self)?)
    }

    /// Decode content from snapshot bytes.
    ///
    /// The bytes must be exactly the canonical encoding of the content they
    /// describe: a re-encoded snapshot that differs from the input (extra
    /// whitespace, reordered keys, unknown fields) is rejected, because
    /// signatures made over the original bytes would not match.
    pub fn from_snapshot(snapshot: &[u8]) -> Result<Self, CardError> {
        let content: Self = serde_json::from_slice(snapshot)
            .map_err(|e| CardError::Decoding(format!("snapshot is not card content: {e}")))?;
        content
            .validate()
            .map_err(|e| CardError::Decoding(format!("snapshot content invalid: {e}")))?;
        if content.snapshot()?.as_bytes() != snapshot {
            return Err(CardError::Decoding(
                "snapshot bytes are not in canonical form".to_string(),
            ));
        }
        Ok(content)
    }

    fn validate(&self) -> Result<(), CardError> {
        if self.identity.trim().is_empty() {
            return Err(CardError::invalid_argument("card identity is empty"));
        }
        if self.public_key.is_empty() {
            return Err(CardError::invalid_argument("card public key is empty"));
        }
        if self.version.is_empty() {
            return Err(CardError::invalid_argument("content version is empty"));
        }
        Ok(())
    }

    /// The identity this card binds.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Raw exported public key bytes.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Content-format version tag.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Creation time.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// The card this one supersedes, if any.
    pub fn previous_card_id(&self) -> Option<&CardId> {
        self.previous_card_id.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_epoch_secs(secs).unwrap()
    }

    #[test]
    fn snapshot_has_fixed_layout() {
        let snapshot = CardContent::generate(b"PK1", "alice@example.com", ts(1000), None).unwrap();
        assert_eq!(
            snapshot.as_bytes(),
            br#"{"created_at":1000,"identity":"alice@example.com","public_key":"UEsx","version":"5.0"}"#
        );
    }

    #[test]
    fn snapshot_includes_previous_card_id_when_present() {
        let prev = CardId::from_snapshot(b"old card");
        let content = CardContent::new("bob", b"PK2".to_vec(), ts(5), Some(prev.clone())).unwrap();
        let text = String::from_utf8(content.snapshot().unwrap().into_vec()).unwrap();
        assert!(text.contains(&format!(r#""previous_card_id":"{prev}""#)));
    }

    #[test]
    fn identical_fields_identical_bytes() {
        let a = CardContent::generate(b"key", "carol", ts(42), None).unwrap();
        let b = CardContent::generate(b"key", "carol", ts(42), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_identity_rejected() {
        assert!(matches!(
            CardContent::new("", b"PK".to_vec(), ts(1), None),
            Err(CardError::InvalidArgument(_))
        ));
        assert!(matches!(
            CardContent::new("  ", b"PK".to_vec(), ts(1), None),
            Err(CardError::InvalidArgument(_))
        ));
    }

    #[test]
    fn empty_public_key_rejected() {
        assert!(matches!(
            CardContent::new("dave", Vec::new(), ts(1), None),
            Err(CardError::InvalidArgument(_))
        ));
    }

    #[test]
    fn from_snapshot_roundtrip() {
        let content = CardContent::new("erin", b"PK".to_vec(), ts(77), None).unwrap();
        let snapshot = content.snapshot().unwrap();
        let parsed = CardContent::from_snapshot(snapshot.as_bytes()).unwrap();
        assert_eq!(parsed, content);
        assert_eq!(parsed.version(), CONTENT_VERSION);
        assert_eq!(parsed.created_at().epoch_secs(), 77);
    }

    #[test]
    fn from_snapshot_rejects_non_canonical_bytes() {
        let spaced = br#"{ "created_at":1000,"identity":"a","public_key":"UEsx","version":"5.0"}"#;
        assert!(matches!(
            CardContent::from_snapshot(spaced),
            Err(CardError::Decoding(_))
        ));
    }

    #[test]
    fn from_snapshot_rejects_unknown_fields_and_garbage() {
        let extra = br#"{"created_at":1,"extra":1,"identity":"a","public_key":"UEsx","version":"5.0"}"#;
        assert!(CardContent::from_snapshot(extra).is_err());
        assert!(CardContent::from_snapshot(b"\xff\xfe").is_err());
        assert!(CardContent::from_snapshot(b"[]").is_err());
    }

    #[test]
    fn from_snapshot_rejects_empty_identity() {
        let bytes = br#"{"created_at":1,"identity":"","public_key":"UEsx","version":"5.0"}"#;
        assert!(matches!(
            CardContent::from_snapshot(bytes),
            Err(CardError::Decoding(_))
        ));
    }
}

//! # Card Records
//!
//! A [`CardRecord`] is the full attribute set of a resolved card: the signed
//! model plus the metadata the service keeps beside it. The card id,
//! identity, and public key are always derived from the snapshot, so a
//! record can never disagree with the bytes its signatures cover.
//!
//! ## Export Format
//!
//! [`CardRecord::export`] writes base64 of an [`ExportedCard`] JSON document.
//! `format_version` is checked before anything else on import; a document
//! of any other version is rejected with `CardError::Decoding`.

use serde::{Deserialize, Serialize};

use idcard_core::encoding::base64_bytes;
use idcard_core::{from_base64, to_base64, CardContent, CardError, CardId, IdentityType, Timestamp};
use idcard_model::{CustomFields, Signature, SignedModel};

/// Current export document version.
pub const EXPORT_FORMAT_VERSION: u32 = 1;

/// Where a card is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardScope {
    /// Visible within the issuing application.
    Application,
    /// A confirmed global identity.
    Global,
}

impl std::fmt::Display for CardScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Application => f.write_str("application"),
            Self::Global => f.write_str("global"),
        }
    }
}

/// A resolved card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRecord {
    id: CardId,
    content: CardContent,
    model: SignedModel,
    identity_type: IdentityType,
    custom_fields: CustomFields,
    scope: CardScope,
    issued_at: Option<Timestamp>,
}

impl CardRecord {
    /// Resolve a signed model into a record.
    ///
    /// `issued_at` is `None` for a card that has not been accepted by a
    /// service yet.
    ///
    /// # Errors
    ///
    /// `CardError::Decoding` if the snapshot is not card content.
    pub fn new(
        model: SignedModel,
        identity_type: IdentityType,
        custom_fields: CustomFields,
        scope: CardScope,
        issued_at: Option<Timestamp>,
    ) -> Result<Self, CardError> {
        let content = model.content()?;
        Ok(Self {
            id: model.card_id(),
            content,
            model,
            identity_type,
            custom_fields,
            scope,
            issued_at,
        })
    }

    pub fn id(&self) -> &CardId {
        &self.id
    }

    pub fn identity(&self) -> &str {
        self.content.identity()
    }

    pub fn identity_type(&self) -> &IdentityType {
        &self.identity_type
    }

    /// Raw exported public key bytes from the snapshot.
    pub fn public_key(&self) -> &[u8] {
        self.content.public_key()
    }

    pub fn custom_fields(&self) -> &CustomFields {
        &self.custom_fields
    }

    pub fn content(&self) -> &CardContent {
        &self.content
    }

    pub fn signed_model(&self) -> &SignedModel {
        &self.model
    }

    pub fn scope(&self) -> CardScope {
        self.scope
    }

    pub fn issued_at(&self) -> Option<Timestamp> {
        self.issued_at
    }

    /// Whether a service has accepted this card.
    pub fn is_published(&self) -> bool {
        self.issued_at.is_some()
    }

    /// Base64 of the versioned export document.
    pub fn export(&self) -> Result<String, CardError> {
        let doc = ExportedCard {
            format_version: EXPORT_FORMAT_VERSION,
            id: self.id.clone(),
            identity: self.content.identity().to_string(),
            identity_type: self.identity_type.clone(),
            public_key: self.content.public_key().to_vec(),
            custom_fields: self.custom_fields.clone(),
            scope: self.scope,
            issued_at: self.issued_at,
            content_snapshot: self.model.content_snapshot().to_vec(),
            signatures: self.model.signatures().to_vec(),
        };
        let json = serde_json::to_vec(&doc)
            .map_err(|e| CardError::Encoding(format!("card export failed: {e}")))?;
        Ok(to_base64(json))
    }

    /// Rebuild a record from [`CardRecord::export`] output.
    ///
    /// The stored id, identity, and public key must match the snapshot.
    pub fn import(encoded: &str) -> Result<Self, CardError> {
        let json = from_base64(encoded)?;

        let probe: VersionProbe = serde_json::from_slice(&json)
            .map_err(|e| CardError::Decoding(format!("not a card export: {e}")))?;
        if probe.format_version != EXPORT_FORMAT_VERSION {
            return Err(CardError::Decoding(format!(
                "unsupported card export format version {}",
                probe.format_version
            )));
        }

        let doc: ExportedCard = serde_json::from_slice(&json)
            .map_err(|e| CardError::Decoding(format!("invalid card export: {e}")))?;
        let mut model = SignedModel::new(doc.content_snapshot);
        for signature in doc.signatures {
            model.add_signature(signature)?;
        }
        let record = Self::new(
            model,
            doc.identity_type,
            doc.custom_fields,
            doc.scope,
            doc.issued_at,
        )?;

        if record.id != doc.id {
            return Err(CardError::Decoding(format!(
                "exported id {} does not match snapshot id {}",
                doc.id, record.id
            )));
        }
        if record.identity() != doc.identity || record.public_key() != doc.public_key.as_slice() {
            return Err(CardError::Decoding(
                "exported identity or public key does not match snapshot".to_string(),
            ));
        }
        Ok(record)
    }
}

/// Version 1 of the card export document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportedCard {
    pub format_version: u32,
    pub id: CardId,
    pub identity: String,
    pub identity_type: IdentityType,
    #[serde(with = "base64_bytes")]
    pub public_key: Vec<u8>,
    #[serde(default)]
    pub custom_fields: CustomFields,
    pub scope: CardScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<Timestamp>,
    #[serde(with = "base64_bytes")]
    pub content_snapshot: Vec<u8>,
    pub signatures: Vec<Signature>,
}

#[derive(Deserialize)]
struct VersionProbe {
    format_version: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use idcard_core::SignerId;

    fn record() -> CardRecord {
        let mut model = SignedModel::generate(
            b"PK1",
            "alice@example.com",
            Timestamp::from_epoch_secs(1000).unwrap(),
            None,
        )
        .unwrap();
        model
            .add_signature(Signature::new(SignerId::new("app1").unwrap(), b"s1".to_vec()).unwrap())
            .unwrap();
        let mut fields = CustomFields::new();
        fields.insert("device".into(), "laptop".into());
        CardRecord::new(
            model,
            IdentityType::email(),
            fields,
            CardScope::Application,
            Some(Timestamp::from_epoch_secs(2000).unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn derived_fields_come_from_snapshot() {
        let r = record();
        assert_eq!(r.identity(), "alice@example.com");
        assert_eq!(r.public_key(), b"PK1");
        assert_eq!(r.id(), &r.signed_model().card_id());
        assert!(r.is_published());
    }

    #[test]
    fn export_import_roundtrips_every_field() {
        let r = record();
        let back = CardRecord::import(&r.export().unwrap()).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn unknown_format_version_rejected() {
        let json = serde_json::json!({"format_version": 2, "anything": true});
        let encoded = to_base64(serde_json::to_vec(&json).unwrap());
        let err = CardRecord::import(&encoded).unwrap_err();
        assert!(matches!(err, CardError::Decoding(ref m) if m.contains("version 2")));
    }

    #[test]
    fn tampered_identity_rejected() {
        let r = record();
        let json = from_base64(&r.export().unwrap()).unwrap();
        let mut doc: serde_json::Value = serde_json::from_slice(&json).unwrap();
        doc["identity"] = "mallory@example.com".into();
        let encoded = to_base64(serde_json::to_vec(&doc).unwrap());
        assert!(matches!(CardRecord::import(&encoded), Err(CardError::Decoding(_))));
    }

    #[test]
    fn import_rejects_garbage() {
        assert!(matches!(CardRecord::import("@@@"), Err(CardError::Decoding(_))));
        assert!(matches!(
            CardRecord::import(&to_base64(b"[1,2,3]")),
            Err(CardError::Decoding(_))
        ));
    }
}

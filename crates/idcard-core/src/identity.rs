//! # Identifier Newtypes
//!
//! Newtype wrappers for the identifiers that flow through card issuance.
//! You cannot pass a `SignerId` where a `CardId` is expected.
//!
//! - [`CardId`]: content address of a card, the lowercase hex SHA-256 of the
//!   content snapshot.
//! - [`SignerId`]: the name a signature is filed under. The signer's role
//!   (owner, application, issuing service) is carried entirely by this
//!   value; there is no separate type per role.
//! - [`IdentityType`]: the kind of identity a card binds (`email`,
//!   `application`, or any custom string).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CardError;

/// Content address of a card.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardId(String);

impl CardId {
    /// Derive the card id from its content snapshot.
    pub fn from_snapshot(snapshot: &[u8]) -> Self {
        let hash = Sha256::digest(snapshot);
        Self(hash.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Parse a card id from its 64-character hex form.
    ///
    /// Uppercase hex is accepted and normalized to lowercase.
    pub fn parse(s: &str) -> Result<Self, CardError> {
        let s = s.trim().to_ascii_lowercase();
        if s.len() != 64 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CardError::Decoding(format!(
                "card id must be 64 hex chars, got {s:?}"
            )));
        }
        Ok(Self(s))
    }

    /// Access the hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CardId {
    type Error = CardError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<CardId> for String {
    fn from(id: CardId) -> Self {
        id.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier under which a signature is filed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SignerId(String);

impl SignerId {
    /// Create a signer id. Empty or whitespace-only ids are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self, CardError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CardError::invalid_argument("signer id is empty"));
        }
        Ok(Self(id))
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&CardId> for SignerId {
    fn from(id: &CardId) -> Self {
        Self(id.as_str().to_string())
    }
}

impl TryFrom<String> for SignerId {
    type Error = CardError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SignerId> for String {
    fn from(id: SignerId) -> Self {
        id.0
    }
}

impl std::fmt::Display for SignerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of identity a card binds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityType(String);

impl IdentityType {
    /// Email address identities (global, third-party verified).
    pub const EMAIL: &'static str = "email";
    /// Application identities.
    pub const APPLICATION: &'static str = "application";

    /// Create an identity type. Empty values are rejected.
    pub fn new(kind: impl Into<String>) -> Result<Self, CardError> {
        let kind = kind.into();
        if kind.trim().is_empty() {
            return Err(CardError::invalid_argument("identity type is empty"));
        }
        Ok(Self(kind))
    }

    /// The `email` identity type.
    pub fn email() -> Self {
        Self(Self::EMAIL.to_string())
    }

    /// The `application` identity type.
    pub fn application() -> Self {
        Self(Self::APPLICATION.to_string())
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IdentityType {
    type Error = CardError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<IdentityType> for String {
    fn from(kind: IdentityType) -> Self {
        kind.0
    }
}

impl std::fmt::Display for IdentityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

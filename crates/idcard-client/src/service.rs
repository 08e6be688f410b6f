//! # Card Service Collaborator
//!
//! [`CardService`] is the boundary to whatever issues and stores cards: a
//! remote service behind a transport, or
//! [`InMemoryCardService`](crate::InMemoryCardService) in tests. Requests are
//! taken by value; once handed over, a request cannot be signed again.
//!
//! Calls are synchronous. An implementation that needs shared mutable state
//! keeps it behind its own lock, since every method takes `&self`.

use serde::{Deserialize, Serialize};

use idcard_core::{CardId, IdentityType};
use idcard_model::{CreateCardRequest, CreateGlobalCardRequest, CustomFields, ValidationToken};

use crate::error::ServiceError;
use crate::record::CardRecord;

/// Identifier of a pending identity verification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operations the client layer needs from a card service.
pub trait CardService {
    /// Register an application-scope card. Returns the issued record.
    fn create_card_from_request(&self, request: CreateCardRequest)
        -> Result<CardRecord, ServiceError>;

    /// Register a card for a confirmed global identity.
    fn create_global_card_from_request(
        &self,
        request: CreateGlobalCardRequest,
    ) -> Result<CardRecord, ServiceError>;

    /// Start verification of a global identity (e.g. send a code by email).
    fn verify_identity(
        &self,
        identity: &str,
        identity_type: &IdentityType,
        custom_fields: &CustomFields,
    ) -> Result<ActionId, ServiceError>;

    /// Redeem a confirmation code for a validation token usable
    /// `count_to_live` times within `time_to_live` seconds.
    fn confirm_identity(
        &self,
        action_id: &ActionId,
        confirmation_code: &str,
        time_to_live: u64,
        count_to_live: u32,
    ) -> Result<ValidationToken, ServiceError>;

    /// Fetch an issued card.
    fn get_card(&self, id: &CardId) -> Result<CardRecord, ServiceError>;
}

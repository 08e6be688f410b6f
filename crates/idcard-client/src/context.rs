//! # Client Context
//!
//! [`Context`] bundles the three collaborators every card operation needs:
//! the crypto capability, the card service, and (for publishing) the
//! application credentials. Cards borrow their context, so a context
//! outlives every [`Card`] resolved through it.

use idcard_core::{CardId, IdentityType};
use idcard_crypto::Crypto;
use idcard_model::{CreateCardRequest, CustomFields, RequestSigner};

use crate::card::Card;
use crate::config::{ConfigError, Credentials};
use crate::error::ClientError;
use crate::record::{CardRecord, CardScope};
use crate::service::CardService;

/// Crypto capability, card service, and optional app credentials.
#[derive(Debug)]
pub struct Context<C: Crypto, S: CardService> {
    crypto: C,
    client: S,
    credentials: Option<Credentials>,
}

impl<C: Crypto, S: CardService> Context<C, S> {
    /// A context without credentials. Enough for resolving, verifying, and
    /// encrypting; publishing needs [`Context::with_credentials`].
    pub fn new(crypto: C, client: S) -> Self {
        Self {
            crypto,
            client,
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn crypto(&self) -> &C {
        &self.crypto
    }

    pub fn client(&self) -> &S {
        &self.client
    }

    /// # Errors
    ///
    /// `ConfigError::NoCredentials` if none were supplied.
    pub fn credentials(&self) -> Result<&Credentials, ConfigError> {
        self.credentials.as_ref().ok_or(ConfigError::NoCredentials)
    }

    /// Create a local, unpublished card for `owner_key` and self-sign it.
    ///
    /// The scope is settled when the card is published.
    pub fn create_card(
        &self,
        identity: &str,
        identity_type: IdentityType,
        owner_key: &C::PrivateKey,
        custom_fields: CustomFields,
    ) -> Result<Card<'_, C, S>, ClientError> {
        let public_key = self
            .crypto
            .export_public_key(&self.crypto.extract_public_key(owner_key));
        let mut request =
            CreateCardRequest::new(identity, identity_type, &public_key, custom_fields)?;
        RequestSigner::new(&self.crypto).self_sign(&mut request, owner_key)?;

        let identity_type = request.identity_type().clone();
        let custom_fields = request.custom_fields().clone();
        let record = CardRecord::new(
            request.into_signed_model(),
            identity_type,
            custom_fields,
            CardScope::Application,
            None,
        )?;
        tracing::debug!(card_id = %record.id(), identity_type = %record.identity_type(), "local card created");
        Ok(Card::new(self, record))
    }

    /// Resolve an issued card by id.
    pub fn get_card(&self, id: &CardId) -> Result<Card<'_, C, S>, ClientError> {
        let record = self.client.get_card(id)?;
        Ok(Card::new(self, record))
    }

    /// Resolve a card from [`Card::export`] output.
    pub fn import_card(&self, exported: &str) -> Result<Card<'_, C, S>, ClientError> {
        let record = CardRecord::import(exported)?;
        Ok(Card::new(self, record))
    }
}

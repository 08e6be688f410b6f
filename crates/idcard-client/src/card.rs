//! # Resolved Cards
//!
//! A [`Card`] is a [`CardRecord`] bound to the [`Context`] it was resolved
//! through. It offers the operations that use the card's public key
//! (encrypting to the holder, verifying the holder's signatures) and the
//! publishing flows that turn a local card into an issued one.
//!
//! The public key handle is imported through the crypto capability on every
//! use; nothing is cached.

use idcard_core::{CardError, CardId, IdentityType};
use idcard_crypto::Crypto;
use idcard_model::{
    CreateCardRequest, CreateGlobalCardRequest, CustomFields, RequestSigner, ValidationToken,
};

use crate::context::Context;
use crate::error::ClientError;
use crate::record::CardRecord;
use crate::service::CardService;
use crate::verification::{IdentityVerificationAttempt, VerificationOptions};

/// A resolved card bound to its context.
pub struct Card<'ctx, C: Crypto, S: CardService> {
    context: &'ctx Context<C, S>,
    record: CardRecord,
}

impl<'ctx, C: Crypto, S: CardService> Card<'ctx, C, S> {
    pub(crate) fn new(context: &'ctx Context<C, S>, record: CardRecord) -> Self {
        Self { context, record }
    }

    pub fn id(&self) -> &CardId {
        self.record.id()
    }

    pub fn identity(&self) -> &str {
        self.record.identity()
    }

    pub fn identity_type(&self) -> &IdentityType {
        self.record.identity_type()
    }

    pub fn custom_fields(&self) -> &CustomFields {
        self.record.custom_fields()
    }

    pub fn record(&self) -> &CardRecord {
        &self.record
    }

    /// Import the card's public key.
    pub fn public_key(&self) -> Result<C::PublicKey, ClientError> {
        Ok(self.context.crypto().import_public_key(self.record.public_key())?)
    }

    /// Encrypt `data` for the card holder.
    ///
    /// # Errors
    ///
    /// `CardError::InvalidArgument` if `data` is empty.
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, ClientError> {
        if data.is_empty() {
            return Err(CardError::invalid_argument("data to encrypt is empty").into());
        }
        let key = self.public_key()?;
        Ok(self.context.crypto().encrypt(data, &key)?)
    }

    /// Check that `signature` over `data` was made by the card holder.
    ///
    /// A signature that does not match is `Ok(false)`, not an error.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool, ClientError> {
        if data.is_empty() {
            return Err(CardError::invalid_argument("data to verify is empty").into());
        }
        if signature.is_empty() {
            return Err(CardError::invalid_argument("signature is empty").into());
        }
        let key = self.public_key()?;
        Ok(self.context.crypto().verify(data, signature, &key)?)
    }

    /// Start verification of this card's identity.
    ///
    /// `time_to_live` is in seconds, at most one year; `count_to_live` is at
    /// most 100. Both are checked before the service is called.
    pub fn check_identity(
        &self,
        time_to_live: u64,
        count_to_live: u32,
    ) -> Result<IdentityVerificationAttempt, ClientError> {
        let options = VerificationOptions::new(time_to_live, count_to_live)?;
        self.check_identity_with(options)
    }

    /// [`Card::check_identity`] with pre-validated options.
    pub fn check_identity_with(
        &self,
        options: VerificationOptions,
    ) -> Result<IdentityVerificationAttempt, ClientError> {
        let action_id = self.context.client().verify_identity(
            self.identity(),
            self.identity_type(),
            self.custom_fields(),
        )?;
        tracing::info!(card_id = %self.id(), action_id = %action_id, "identity verification started");
        Ok(IdentityVerificationAttempt {
            action_id,
            time_to_live: options.time_to_live(),
            count_to_live: options.count_to_live(),
            identity: self.identity().to_string(),
            identity_type: self.identity_type().clone(),
        })
    }

    /// Publish within the application's scope.
    ///
    /// The card's current snapshot and signatures are signed by the
    /// application credentials, submitted, and the record is replaced by the
    /// service's response. A card that already carries this application's
    /// signature is submitted without re-signing.
    pub fn publish(&mut self) -> Result<(), ClientError> {
        let context = self.context;
        let credentials = context.credentials()?;
        let crypto = context.crypto();

        let mut request = self.rebuild_request()?;
        let app_key = credentials.get_app_key(crypto)?;
        let signed =
            RequestSigner::new(crypto).authority_sign(&mut request, credentials.app_id(), &app_key);
        match signed {
            Ok(()) => {}
            Err(e) if e.is_duplicate_signature() => {
                tracing::debug!(card_id = %self.id(), "application signature already present");
            }
            Err(e) => return Err(e.into()),
        }

        let record = context.client().create_card_from_request(request)?;
        tracing::info!(card_id = %record.id(), app_id = %credentials.app_id(), "card published");
        self.record = record;
        Ok(())
    }

    /// Publish into global scope with an identity validation token.
    ///
    /// # Errors
    ///
    /// `CardError::InvalidArgument` on an empty token, before the service is
    /// contacted.
    pub fn publish_global(&mut self, identity_token: &str) -> Result<(), ClientError> {
        let token = ValidationToken::new(identity_token)?;
        self.publish_global_with(token)
    }

    /// [`Card::publish_global`] with a token from
    /// [`IdentityVerificationAttempt::confirm`].
    pub fn publish_global_with(&mut self, token: ValidationToken) -> Result<(), ClientError> {
        let request = CreateGlobalCardRequest::from_request(self.rebuild_request()?, token);
        let record = self.context.client().create_global_card_from_request(request)?;
        tracing::info!(card_id = %record.id(), scope = %record.scope(), "card published globally");
        self.record = record;
        Ok(())
    }

    /// Base64 export of the full record. [`Context::import_card`] reverses it.
    pub fn export(&self) -> Result<String, ClientError> {
        Ok(self.record.export()?)
    }

    fn rebuild_request(&self) -> Result<CreateCardRequest, CardError> {
        CreateCardRequest::from_signed_model(
            self.record.signed_model().clone(),
            self.record.identity_type().clone(),
            self.record.custom_fields().clone(),
        )
    }
}

impl<C: Crypto, S: CardService> std::fmt::Debug for Card<'_, C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Card").field("record", &self.record).finish()
    }
}

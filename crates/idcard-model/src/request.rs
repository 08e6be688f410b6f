//! # Card Creation Requests
//!
//! [`CreateCardRequest`] and [`CreateGlobalCardRequest`] wrap a
//! [`SignedModel`] together with the request metadata the issuing service
//! needs but that is not part of the signed snapshot: the identity type and
//! free-form custom fields.
//!
//! ## Lifecycle
//!
//! A request is **building** while its owner holds it by value and adds
//! signatures through [`RequestSigner`](crate::RequestSigner). Handing it to
//! the card service moves it, which is the terminal **submitted** state; no
//! further mutation is possible.
//!
//! ## Wire Form
//!
//! [`RequestBody`] is the JSON body a transport sends:
//!
//! ```json
//! {
//!   "content_snapshot": "<base64>",
//!   "meta": {
//!     "identity_type": "email",
//!     "data": { "device": "laptop" },
//!     "signs": [ { "signer_id": "...", "signature": "<base64>" } ]
//!   },
//!   "validation": { "token": "..." }
//! }
//! ```
//!
//! `validation` is present only for global requests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use idcard_core::encoding::base64_bytes;
use idcard_core::{CardContent, CardError, CardId, IdentityType, Timestamp};

use crate::signature::Signature;
use crate::signed_model::SignedModel;
use crate::signer::SignableRequest;

/// Free-form string metadata attached to a card request.
pub type CustomFields = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Validation token
// ---------------------------------------------------------------------------

/// Proof that a global identity was confirmed. Redacted from `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidationToken(String);

impl ValidationToken {
    /// Wrap a token string. Empty or whitespace-only tokens are rejected.
    pub fn new(token: impl Into<String>) -> Result<Self, CardError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(CardError::invalid_argument("identity validation token is empty"));
        }
        Ok(Self(token))
    }

    /// The token text, for handing to a transport.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ValidationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ValidationToken(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// Wire body
// ---------------------------------------------------------------------------

/// Transport body of a card creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestBody {
    /// Base64 of the signed snapshot.
    #[serde(with = "base64_bytes")]
    pub content_snapshot: Vec<u8>,
    /// Unsigned metadata and the ordered signatures.
    pub meta: RequestMeta,
    /// Present on global requests only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<RequestValidation>,
}

/// The `meta` object of a [`RequestBody`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestMeta {
    pub identity_type: IdentityType,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: CustomFields,
    #[serde(default)]
    pub signs: Vec<Signature>,
}

/// The `validation` object of a global [`RequestBody`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestValidation {
    pub token: String,
}

// ---------------------------------------------------------------------------
// CreateCardRequest
// ---------------------------------------------------------------------------

/// A request to register a card within an application's scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCardRequest {
    model: SignedModel,
    identity_type: IdentityType,
    custom_fields: CustomFields,
}

impl CreateCardRequest {
    /// Build a request over fresh content stamped with the current time.
    ///
    /// # Errors
    ///
    /// `CardError::InvalidArgument` on an empty identity or public key.
    pub fn new(
        identity: &str,
        identity_type: IdentityType,
        public_key: &[u8],
        custom_fields: CustomFields,
    ) -> Result<Self, CardError> {
        let mut builder = Self::builder(identity, identity_type, public_key);
        builder.custom_fields = custom_fields;
        builder.build()
    }

    /// Start a builder for full control over timestamps and rotation links.
    pub fn builder(
        identity: &str,
        identity_type: IdentityType,
        public_key: &[u8],
    ) -> CreateCardRequestBuilder {
        CreateCardRequestBuilder {
            identity: identity.to_string(),
            identity_type,
            public_key: public_key.to_vec(),
            custom_fields: CustomFields::new(),
            created_at: None,
            previous_card_id: None,
        }
    }

    /// Rebuild a request around an existing signed model, keeping its
    /// snapshot and signatures. Used to republish a card.
    ///
    /// # Errors
    ///
    /// `CardError::Decoding` if the snapshot is not card content.
    pub fn from_signed_model(
        model: SignedModel,
        identity_type: IdentityType,
        custom_fields: CustomFields,
    ) -> Result<Self, CardError> {
        model.content()?;
        Ok(Self {
            model,
            identity_type,
            custom_fields,
        })
    }

    /// Parse a transport body. Signatures are re-added in order.
    ///
    /// A body carrying a `validation` object is rejected; use
    /// [`CreateGlobalCardRequest::from_request_body`].
    pub fn from_request_body(body: RequestBody) -> Result<Self, CardError> {
        if body.validation.is_some() {
            return Err(CardError::Decoding(
                "application-scope request carries a validation token".to_string(),
            ));
        }
        let mut model = SignedModel::new(body.content_snapshot);
        for signature in body.meta.signs {
            model.add_signature(signature)?;
        }
        Self::from_signed_model(model, body.meta.identity_type, body.meta.data)
    }

    /// The decoded snapshot.
    pub fn content(&self) -> Result<CardContent, CardError> {
        self.model.content()
    }

    /// The signed model being built.
    pub fn signed_model(&self) -> &SignedModel {
        &self.model
    }

    /// Identity type metadata.
    pub fn identity_type(&self) -> &IdentityType {
        &self.identity_type
    }

    /// Custom field metadata.
    pub fn custom_fields(&self) -> &CustomFields {
        &self.custom_fields
    }

    /// The content address the service will assign.
    pub fn card_id(&self) -> CardId {
        self.model.card_id()
    }

    /// Release the signed model.
    pub fn into_signed_model(self) -> SignedModel {
        self.model
    }

    /// The transport body.
    pub fn request_body(&self) -> RequestBody {
        RequestBody {
            content_snapshot: self.model.content_snapshot().to_vec(),
            meta: RequestMeta {
                identity_type: self.identity_type.clone(),
                data: self.custom_fields.clone(),
                signs: self.model.signatures().to_vec(),
            },
            validation: None,
        }
    }
}

impl SignableRequest for CreateCardRequest {
    fn signed_model(&self) -> &SignedModel {
        &self.model
    }

    fn signed_model_mut(&mut self) -> &mut SignedModel {
        &mut self.model
    }
}

/// Builder for [`CreateCardRequest`] and [`CreateGlobalCardRequest`].
#[derive(Debug, Clone)]
pub struct CreateCardRequestBuilder {
    identity: String,
    identity_type: IdentityType,
    public_key: Vec<u8>,
    custom_fields: CustomFields,
    created_at: Option<Timestamp>,
    previous_card_id: Option<CardId>,
}

impl CreateCardRequestBuilder {
    /// Add one custom field. A repeated key keeps the last value.
    pub fn custom_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_fields.insert(key.into(), value.into());
        self
    }

    /// Fix the creation time instead of using the current clock.
    pub fn created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Link the new card to the card it replaces.
    pub fn previous_card_id(mut self, previous: CardId) -> Self {
        self.previous_card_id = Some(previous);
        self
    }

    /// Finish an application-scope request.
    pub fn build(self) -> Result<CreateCardRequest, CardError> {
        let model = SignedModel::generate(
            &self.public_key,
            &self.identity,
            self.created_at.unwrap_or_else(Timestamp::now),
            self.previous_card_id,
        )?;
        Ok(CreateCardRequest {
            model,
            identity_type: self.identity_type,
            custom_fields: self.custom_fields,
        })
    }

    /// Finish a global request. The token is checked before content is built.
    pub fn build_global(self, identity_token: &str) -> Result<CreateGlobalCardRequest, CardError> {
        let token = ValidationToken::new(identity_token)?;
        Ok(CreateGlobalCardRequest {
            request: self.build()?,
            validation_token: token,
        })
    }
}

// ---------------------------------------------------------------------------
// CreateGlobalCardRequest
// ---------------------------------------------------------------------------

/// A request to register a card for a confirmed global identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGlobalCardRequest {
    request: CreateCardRequest,
    validation_token: ValidationToken,
}

impl CreateGlobalCardRequest {
    /// Build a global request over fresh content.
    ///
    /// # Errors
    ///
    /// `CardError::InvalidArgument` on an empty token, checked first, then
    /// on an empty identity or public key.
    pub fn new(
        identity: &str,
        identity_type: IdentityType,
        public_key: &[u8],
        identity_token: &str,
        custom_fields: CustomFields,
    ) -> Result<Self, CardError> {
        let token = ValidationToken::new(identity_token)?;
        let request = CreateCardRequest::new(identity, identity_type, public_key, custom_fields)?;
        Ok(Self {
            request,
            validation_token: token,
        })
    }

    /// Promote an application-scope request with a validation token.
    pub fn from_request(request: CreateCardRequest, validation_token: ValidationToken) -> Self {
        Self {
            request,
            validation_token,
        }
    }

    /// Parse a transport body that carries a validation token.
    pub fn from_request_body(mut body: RequestBody) -> Result<Self, CardError> {
        let validation = body.validation.take().ok_or_else(|| {
            CardError::Decoding("global request is missing its validation token".to_string())
        })?;
        let token = ValidationToken::new(validation.token)?;
        Ok(Self {
            request: CreateCardRequest::from_request_body(body)?,
            validation_token: token,
        })
    }

    /// The wrapped application-scope request.
    pub fn request(&self) -> &CreateCardRequest {
        &self.request
    }

    /// The identity validation token.
    pub fn validation_token(&self) -> &ValidationToken {
        &self.validation_token
    }

    /// Split into the inner request and the token.
    pub fn into_parts(self) -> (CreateCardRequest, ValidationToken) {
        (self.request, self.validation_token)
    }

    /// The transport body, including `validation`.
    pub fn request_body(&self) -> RequestBody {
        let mut body = self.request.request_body();
        body.validation = Some(RequestValidation {
            token: self.validation_token.expose().to_string(),
        });
        body
    }
}

impl SignableRequest for CreateGlobalCardRequest {
    fn signed_model(&self) -> &SignedModel {
        &self.request.model
    }

    fn signed_model_mut(&mut self) -> &mut SignedModel {
        &mut self.request.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idcard_core::SignerId;

    fn ts() -> Timestamp {
        Timestamp::from_epoch_secs(1000).unwrap()
    }

    fn request() -> CreateCardRequest {
        CreateCardRequest::builder("alice@example.com", IdentityType::email(), b"PK1")
            .custom_field("device", "laptop")
            .created_at(ts())
            .build()
            .unwrap()
    }

    #[test]
    fn new_request_has_content_and_no_signatures() {
        let req = request();
        let content = req.content().unwrap();
        assert_eq!(content.identity(), "alice@example.com");
        assert_eq!(content.public_key(), b"PK1");
        assert!(req.signed_model().signatures().is_empty());
        assert_eq!(req.custom_fields().get("device").map(String::as_str), Some("laptop"));
    }

    #[test]
    fn metadata_is_outside_the_snapshot() {
        let with_fields = request();
        let without = CreateCardRequest::builder("alice@example.com", IdentityType::application(), b"PK1")
            .created_at(ts())
            .build()
            .unwrap();
        assert_eq!(
            with_fields.signed_model().content_snapshot(),
            without.signed_model().content_snapshot()
        );
    }

    #[test]
    fn empty_identity_rejected() {
        assert!(matches!(
            CreateCardRequest::new("", IdentityType::email(), b"PK1", CustomFields::new()),
            Err(CardError::InvalidArgument(_))
        ));
    }

    #[test]
    fn global_request_rejects_empty_token_first() {
        // Empty identity too, but the token is the reported problem.
        let err = CreateGlobalCardRequest::new("", IdentityType::email(), b"PK1", "", CustomFields::new())
            .unwrap_err();
        assert!(matches!(err, CardError::InvalidArgument(ref m) if m.contains("token")));
    }

    #[test]
    fn validation_token_debug_is_redacted() {
        let token = ValidationToken::new("s3cret").unwrap();
        assert!(!format!("{token:?}").contains("s3cret"));
        assert_eq!(token.expose(), "s3cret");
    }

    #[test]
    fn request_body_shape() {
        let mut req = request();
        req.signed_model_mut()
            .add_signature(Signature::new(SignerId::new("app1").unwrap(), b"s1".to_vec()).unwrap())
            .unwrap();
        let value = serde_json::to_value(req.request_body()).unwrap();
        assert_eq!(value["meta"]["identity_type"], "email");
        assert_eq!(value["meta"]["data"]["device"], "laptop");
        assert_eq!(value["meta"]["signs"][0]["signer_id"], "app1");
        assert!(value.get("validation").is_none());
        assert_eq!(
            value["content_snapshot"],
            req.signed_model().to_string().as_str()
        );
    }

    #[test]
    fn global_body_carries_token_and_parses_back() {
        let global = CreateGlobalCardRequest::from_request(request(), ValidationToken::new("tok").unwrap());
        let body = global.request_body();
        assert_eq!(body.validation.as_ref().map(|v| v.token.as_str()), Some("tok"));

        let parsed = CreateGlobalCardRequest::from_request_body(body.clone()).unwrap();
        assert_eq!(parsed, global);
        assert!(CreateCardRequest::from_request_body(body).is_err());
    }

    #[test]
    fn body_without_token_is_not_global() {
        let body = request().request_body();
        assert!(matches!(
            CreateGlobalCardRequest::from_request_body(body),
            Err(CardError::Decoding(_))
        ));
    }

    #[test]
    fn from_signed_model_rejects_foreign_snapshot() {
        let model = SignedModel::new(b"not a card".to_vec());
        assert!(matches!(
            CreateCardRequest::from_signed_model(model, IdentityType::email(), CustomFields::new()),
            Err(CardError::Decoding(_))
        ));
    }
}

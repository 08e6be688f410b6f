//! # In-Memory Issuing Service
//!
//! A complete [`CardService`] kept in process memory, for tests and local
//! development.
//!
//! ## Issuance Rules
//!
//! - The request snapshot must be card content, and the card id is its
//!   content address. An id that is already stored is rejected.
//! - The owner's self signature must be present and valid.
//! - Application-scope requests also need a valid signature from a
//!   registered application. Signatures from unknown signers are rejected.
//! - Global requests need a validation token issued for the same identity
//!   and identity type, unexpired and with uses left. Each issuance spends
//!   one use. Only `email` and `application` identities can be global.
//! - Accepted cards get the service's own signature appended last.
//!
//! ## Identity Verification
//!
//! [`CardService::verify_identity`] records a pending action with a 6-digit
//! confirmation code. The code would be delivered out of band; here it is
//! read back with [`InMemoryCardService::confirmation_code`]. Codes and
//! tokens are compared in constant time.
//!
//! A pending action lives for [`DEFAULT_CONFIRMATION_WINDOW`] seconds and
//! accepts [`MAX_CONFIRMATION_ATTEMPTS`] wrong codes. It is dropped once
//! either limit is exhausted.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use idcard_core::{CardError, CardId, IdentityType, SignerId, Timestamp};
use idcard_crypto::Crypto;
use idcard_model::{
    CreateCardRequest, CreateGlobalCardRequest, CustomFields, RequestSigner, SignatureVerifier,
    SignedModel, ValidationToken,
};

use crate::error::ServiceError;
use crate::record::{CardRecord, CardScope};
use crate::service::{ActionId, CardService};
use crate::verification::{MAX_COUNT_TO_LIVE, MAX_TIME_TO_LIVE};

/// Seconds a confirmation code stays redeemable.
pub const DEFAULT_CONFIRMATION_WINDOW: u64 = 600;

/// Wrong codes tolerated before a pending action is dropped.
pub const MAX_CONFIRMATION_ATTEMPTS: u32 = 3;

struct PendingAction {
    identity: String,
    identity_type: IdentityType,
    code: String,
    expires_at: Timestamp,
    attempts_left: u32,
}

impl PendingAction {
    fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}

struct IssuedToken {
    token: String,
    identity: String,
    identity_type: IdentityType,
    expires_at: Timestamp,
    uses_left: u32,
}

#[derive(Default)]
struct State {
    cards: BTreeMap<CardId, CardRecord>,
    actions: BTreeMap<ActionId, PendingAction>,
    tokens: Vec<IssuedToken>,
}

/// Card service backed by process memory.
pub struct InMemoryCardService<C: Crypto> {
    crypto: C,
    service_id: SignerId,
    service_key: C::PrivateKey,
    applications: BTreeMap<SignerId, Vec<u8>>,
    confirmation_window: u64,
    state: Mutex<State>,
    calls: AtomicUsize,
}

impl<C: Crypto> InMemoryCardService<C> {
    /// A service that signs issued cards as `service_id` with `service_key`.
    pub fn new(crypto: C, service_id: SignerId, service_key: C::PrivateKey) -> Self {
        Self {
            crypto,
            service_id,
            service_key,
            applications: BTreeMap::new(),
            confirmation_window: DEFAULT_CONFIRMATION_WINDOW,
            state: Mutex::new(State::default()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Trust authority signatures from `app_id`.
    pub fn register_application(mut self, app_id: SignerId, public_key: &C::PublicKey) -> Self {
        let raw = self.crypto.export_public_key(public_key);
        self.applications.insert(app_id, raw);
        self
    }

    /// Seconds a confirmation code stays redeemable after it is issued.
    pub fn with_confirmation_window(mut self, secs: u64) -> Self {
        self.confirmation_window = secs;
        self
    }

    pub fn service_id(&self) -> &SignerId {
        &self.service_id
    }

    /// Exported public key matching the service signature.
    pub fn service_public_key(&self) -> Vec<u8> {
        self.crypto
            .export_public_key(&self.crypto.extract_public_key(&self.service_key))
    }

    /// Number of [`CardService`] calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The code sent for a pending verification, if it is still pending.
    pub fn confirmation_code(&self, action_id: &ActionId) -> Option<String> {
        let now = Timestamp::now();
        self.state
            .lock()
            .actions
            .get(action_id)
            .filter(|a| !a.is_expired(now))
            .map(|a| a.code.clone())
    }

    /// Number of verification actions still awaiting confirmation.
    pub fn pending_action_count(&self) -> usize {
        self.state.lock().actions.len()
    }

    /// Number of issued cards held.
    pub fn card_count(&self) -> usize {
        self.state.lock().cards.len()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn check_signatures(&self, model: &SignedModel, scope: CardScope) -> Result<(), ServiceError> {
        let verifier = self
            .applications
            .iter()
            .fold(SignatureVerifier::new(&self.crypto), |v, (id, key)| {
                v.with_signer(id.clone(), key.clone())
            })
            .require_self_signature();
        verifier
            .verify_all(model)
            .map_err(|e| ServiceError::Rejected(e.to_string()))?;

        if scope == CardScope::Application
            && !model
                .signatures()
                .iter()
                .any(|s| self.applications.contains_key(&s.signer_id))
        {
            return Err(ServiceError::Rejected(
                "no registered application signed the card".to_string(),
            ));
        }
        Ok(())
    }

    fn issue(
        &self,
        request: CreateCardRequest,
        scope: CardScope,
        token: Option<&ValidationToken>,
    ) -> Result<CardRecord, ServiceError> {
        let content = request
            .content()
            .map_err(|e| ServiceError::Rejected(e.to_string()))?;
        let card_id = request.card_id();
        self.check_signatures(request.signed_model(), scope)?;

        let mut state = self.state.lock();
        if state.cards.contains_key(&card_id) {
            return Err(ServiceError::Rejected(format!("card {card_id} already exists")));
        }
        let token_slot = match token {
            Some(token) => Some(find_token(
                &mut state.tokens,
                token,
                content.identity(),
                request.identity_type(),
            )?),
            None => None,
        };

        let identity_type = request.identity_type().clone();
        let custom_fields = request.custom_fields().clone();
        let mut model = request.into_signed_model();
        RequestSigner::new(&self.crypto)
            .authority_sign(&mut model, &self.service_id, &self.service_key)
            .map_err(|e| ServiceError::Rejected(e.to_string()))?;

        let record = CardRecord::new(
            model,
            identity_type,
            custom_fields,
            scope,
            Some(Timestamp::now()),
        )
        .map_err(|e: CardError| ServiceError::Rejected(e.to_string()))?;

        // Spent only once nothing else can fail.
        if let Some(index) = token_slot {
            spend_token(&mut state.tokens, index);
        }
        state.cards.insert(card_id.clone(), record.clone());
        tracing::info!(card_id = %card_id, scope = %scope, "card issued");
        Ok(record)
    }
}

/// Position of a live token matching `presented` and the identity it was
/// issued for. Expired and used-up tokens are pruned first.
fn find_token(
    tokens: &mut Vec<IssuedToken>,
    presented: &ValidationToken,
    identity: &str,
    identity_type: &IdentityType,
) -> Result<usize, ServiceError> {
    let now = Timestamp::now();
    tokens.retain(|t| t.uses_left > 0 && t.expires_at >= now);

    let position = tokens.iter().position(|t| {
        bool::from(t.token.as_bytes().ct_eq(presented.expose().as_bytes()))
            && t.identity == identity
            && &t.identity_type == identity_type
    });
    let Some(index) = position else {
        tracing::warn!(identity_type = %identity_type, "validation token rejected");
        return Err(ServiceError::InvalidToken);
    };
    Ok(index)
}

fn spend_token(tokens: &mut Vec<IssuedToken>, index: usize) {
    tokens[index].uses_left -= 1;
    if tokens[index].uses_left == 0 {
        tokens.swap_remove(index);
    }
}

fn global_identity_type(identity_type: &IdentityType) -> Result<(), ServiceError> {
    match identity_type.as_str() {
        IdentityType::EMAIL | IdentityType::APPLICATION => Ok(()),
        other => Err(ServiceError::UnsupportedIdentityType(other.to_string())),
    }
}

impl<C: Crypto> CardService for InMemoryCardService<C> {
    fn create_card_from_request(
        &self,
        request: CreateCardRequest,
    ) -> Result<CardRecord, ServiceError> {
        self.record_call();
        self.issue(request, CardScope::Application, None)
            .map_err(|e| {
                tracing::warn!(error = %e, "card request rejected");
                e
            })
    }

    fn create_global_card_from_request(
        &self,
        request: CreateGlobalCardRequest,
    ) -> Result<CardRecord, ServiceError> {
        self.record_call();
        let (request, token) = request.into_parts();
        global_identity_type(request.identity_type())?;
        self.issue(request, CardScope::Global, Some(&token))
            .map_err(|e| {
                tracing::warn!(error = %e, "global card request rejected");
                e
            })
    }

    fn verify_identity(
        &self,
        identity: &str,
        identity_type: &IdentityType,
        _custom_fields: &CustomFields,
    ) -> Result<ActionId, ServiceError> {
        self.record_call();
        global_identity_type(identity_type)?;
        if identity.trim().is_empty() {
            return Err(ServiceError::Rejected("identity is empty".to_string()));
        }
        let action_id = ActionId::new(Uuid::new_v4().to_string());
        let code = format!("{:06}", Uuid::new_v4().as_u128() % 1_000_000);
        let now = Timestamp::now();
        let mut state = self.state.lock();
        state.actions.retain(|_, a| !a.is_expired(now));
        state.actions.insert(
            action_id.clone(),
            PendingAction {
                identity: identity.to_string(),
                identity_type: identity_type.clone(),
                code,
                expires_at: now.plus_secs(self.confirmation_window),
                attempts_left: MAX_CONFIRMATION_ATTEMPTS,
            },
        );
        tracing::debug!(action_id = %action_id, identity_type = %identity_type, "confirmation code issued");
        Ok(action_id)
    }

    fn confirm_identity(
        &self,
        action_id: &ActionId,
        confirmation_code: &str,
        time_to_live: u64,
        count_to_live: u32,
    ) -> Result<ValidationToken, ServiceError> {
        self.record_call();
        if !(1..=MAX_TIME_TO_LIVE).contains(&time_to_live)
            || !(1..=MAX_COUNT_TO_LIVE).contains(&count_to_live)
        {
            return Err(ServiceError::Rejected(format!(
                "token limits out of range: ttl {time_to_live}, count {count_to_live}"
            )));
        }

        let mut state = self.state.lock();
        let not_found = || ServiceError::NotFound(format!("verification action {action_id}"));
        let action = state.actions.get_mut(action_id).ok_or_else(not_found)?;
        if action.is_expired(Timestamp::now()) {
            state.actions.remove(action_id);
            tracing::warn!(action_id = %action_id, "verification action expired");
            return Err(not_found());
        }
        if !bool::from(action.code.as_bytes().ct_eq(confirmation_code.as_bytes())) {
            action.attempts_left = action.attempts_left.saturating_sub(1);
            if action.attempts_left == 0 {
                state.actions.remove(action_id);
                tracing::warn!(action_id = %action_id, "confirmation attempts exhausted");
            } else {
                tracing::warn!(action_id = %action_id, "confirmation code mismatch");
            }
            return Err(ServiceError::InvalidToken);
        }
        let action = state.actions.remove(action_id).ok_or_else(not_found)?;

        let token_text = Uuid::new_v4().simple().to_string();
        let token = ValidationToken::new(token_text.clone())
            .map_err(|e| ServiceError::Rejected(e.to_string()))?;
        state.tokens.push(IssuedToken {
            token: token_text,
            identity: action.identity,
            identity_type: action.identity_type,
            expires_at: Timestamp::now().plus_secs(time_to_live),
            uses_left: count_to_live,
        });
        Ok(token)
    }

    fn get_card(&self, id: &CardId) -> Result<CardRecord, ServiceError> {
        self.record_call();
        self.state
            .lock()
            .cards
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("card {id}")))
    }
}

//! # Signature Verification
//!
//! [`SignatureVerifier`] checks every signature on a [`SignedModel`] against
//! the keys of known signers and reports one [`SignatureCheck`] per
//! signature, in the model's order.
//!
//! The self signature needs no registration: a signature filed under the
//! model's own card id is checked against the public key inside the
//! snapshot. Any other signer must be registered with
//! [`SignatureVerifier::with_signer`]; an unknown signer fails its check.

use std::collections::BTreeMap;

use thiserror::Error;

use idcard_core::{CardError, SignerId};
use idcard_crypto::Crypto;

use crate::signed_model::SignedModel;

/// Outcome for a single signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureCheck {
    pub signer_id: SignerId,
    pub ok: bool,
    /// Why the check failed, if it did.
    pub error: Option<String>,
}

impl SignatureCheck {
    fn passed(signer_id: &SignerId) -> Self {
        Self {
            signer_id: signer_id.clone(),
            ok: true,
            error: None,
        }
    }

    fn failed(signer_id: &SignerId, reason: impl Into<String>) -> Self {
        Self {
            signer_id: signer_id.clone(),
            ok: false,
            error: Some(reason.into()),
        }
    }
}

/// Failure of [`SignatureVerifier::verify_all`].
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("signed model has no signatures")]
    NoSignatures,

    #[error("required signer {signer_id} did not sign")]
    MissingSigner { signer_id: SignerId },

    #[error("signature from {signer_id} failed: {reason}")]
    Failed { signer_id: SignerId, reason: String },

    #[error(transparent)]
    Card(#[from] CardError),
}

/// Checks a signed model's signatures against known signer keys.
pub struct SignatureVerifier<'c, C: Crypto> {
    crypto: &'c C,
    signers: BTreeMap<SignerId, Vec<u8>>,
    required: Vec<SignerId>,
    require_self: bool,
}

impl<'c, C: Crypto> SignatureVerifier<'c, C> {
    pub fn new(crypto: &'c C) -> Self {
        Self {
            crypto,
            signers: BTreeMap::new(),
            required: Vec::new(),
            require_self: false,
        }
    }

    /// Register the exported public key of a signer.
    pub fn with_signer(mut self, signer_id: SignerId, public_key: impl Into<Vec<u8>>) -> Self {
        self.signers.insert(signer_id, public_key.into());
        self
    }

    /// Make [`verify_all`](Self::verify_all) fail unless `signer_id` signed.
    pub fn require_signer(mut self, signer_id: SignerId) -> Self {
        if !self.required.contains(&signer_id) {
            self.required.push(signer_id);
        }
        self
    }

    /// Make [`verify_all`](Self::verify_all) fail unless the owner signed.
    pub fn require_self_signature(mut self) -> Self {
        self.require_self = true;
        self
    }

    /// Check each signature in order.
    ///
    /// # Errors
    ///
    /// `CardError::Decoding` if the snapshot is not card content.
    pub fn check(&self, model: &SignedModel) -> Result<Vec<SignatureCheck>, CardError> {
        let content = model.content()?;
        let self_id = SignerId::from(&model.card_id());

        let checks = model
            .signatures()
            .iter()
            .map(|signature| {
                let raw_key = if signature.signer_id == self_id {
                    content.public_key()
                } else {
                    match self.signers.get(&signature.signer_id) {
                        Some(key) => key.as_slice(),
                        None => {
                            return SignatureCheck::failed(&signature.signer_id, "unknown signer")
                        }
                    }
                };
                let key = match self.crypto.import_public_key(raw_key) {
                    Ok(key) => key,
                    Err(e) => return SignatureCheck::failed(&signature.signer_id, e.to_string()),
                };
                match self
                    .crypto
                    .verify(model.content_snapshot(), &signature.signature_bytes, &key)
                {
                    Ok(true) => SignatureCheck::passed(&signature.signer_id),
                    Ok(false) => {
                        SignatureCheck::failed(&signature.signer_id, "signature does not match")
                    }
                    Err(e) => SignatureCheck::failed(&signature.signer_id, e.to_string()),
                }
            })
            .collect();
        Ok(checks)
    }

    /// Require a non-empty signature set, every check passing, and every
    /// required signer present.
    pub fn verify_all(&self, model: &SignedModel) -> Result<(), VerifyError> {
        if model.signatures().is_empty() {
            return Err(VerifyError::NoSignatures);
        }
        let checks = self.check(model)?;
        if let Some(bad) = checks.iter().find(|c| !c.ok) {
            tracing::warn!(signer_id = %bad.signer_id, card_id = %model.card_id(), "card signature rejected");
            return Err(VerifyError::Failed {
                signer_id: bad.signer_id.clone(),
                reason: bad.error.clone().unwrap_or_default(),
            });
        }

        let mut required = self.required.clone();
        if self.require_self {
            required.push(SignerId::from(&model.card_id()));
        }
        for signer_id in required {
            if !checks.iter().any(|c| c.signer_id == signer_id) {
                return Err(VerifyError::MissingSigner { signer_id });
            }
        }
        Ok(())
    }
}

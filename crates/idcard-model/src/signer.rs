//! # Request Signer
//!
//! One signing path for every role. The owner's self signature, an
//! application's authority signature, and the issuing service's signature
//! all go through [`RequestSigner::authority_sign`]; only the `signer_id`
//! differs.
//!
//! The signer computes the raw signature over the request's current
//! snapshot through the [`Crypto`] capability, then appends it with
//! [`SignedModel::add_signature`], so the duplicate rule applies: the same
//! signer re-signing the same snapshot with a deterministic scheme is
//! rejected with `CardError::DuplicateSignature`.

use idcard_core::{CardError, SignerId};
use idcard_crypto::Crypto;

use crate::signature::Signature;
use crate::signed_model::SignedModel;

/// Anything that wraps a signed model in the building state.
pub trait SignableRequest {
    /// The model being built.
    fn signed_model(&self) -> &SignedModel;

    /// Mutable access for appending signatures.
    fn signed_model_mut(&mut self) -> &mut SignedModel;
}

impl SignableRequest for SignedModel {
    fn signed_model(&self) -> &SignedModel {
        self
    }

    fn signed_model_mut(&mut self) -> &mut SignedModel {
        self
    }
}

/// Applies named signatures to requests through a crypto capability.
#[derive(Debug)]
pub struct RequestSigner<'c, C: Crypto> {
    crypto: &'c C,
}

impl<'c, C: Crypto> RequestSigner<'c, C> {
    /// Create a signer over the given capability.
    pub fn new(crypto: &'c C) -> Self {
        Self { crypto }
    }

    /// Sign the request's snapshot and file the signature under `signer_id`.
    ///
    /// On error the request is left unchanged.
    pub fn authority_sign<R: SignableRequest + ?Sized>(
        &self,
        request: &mut R,
        signer_id: &SignerId,
        signing_key: &C::PrivateKey,
    ) -> Result<(), CardError> {
        let model = request.signed_model_mut();
        let signature_bytes = self.crypto.sign(model.content_snapshot(), signing_key)?;
        model.add_signature(Signature::new(signer_id.clone(), signature_bytes)?)?;
        tracing::debug!(
            signer_id = %signer_id,
            signatures = model.signatures().len(),
            "signature added to card request"
        );
        Ok(())
    }

    /// Sign as the card owner. The signer id is the card id of the snapshot.
    pub fn self_sign<R: SignableRequest + ?Sized>(
        &self,
        request: &mut R,
        owner_key: &C::PrivateKey,
    ) -> Result<(), CardError> {
        let signer_id = SignerId::from(&request.signed_model().card_id());
        self.authority_sign(request, &signer_id, owner_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idcard_core::Timestamp;
    use idcard_crypto::{Ed25519Crypto, Ed25519PrivateKey};

    fn model() -> SignedModel {
        SignedModel::generate(b"PK1", "alice@example.com", Timestamp::from_epoch_secs(1000).unwrap(), None)
            .unwrap()
    }

    #[test]
    fn authority_sign_appends_verifiable_signature() {
        let crypto = Ed25519Crypto;
        let key = Ed25519PrivateKey::from_seed(&[1; 32]);
        let app = SignerId::new("app1").unwrap();
        let mut m = model();

        RequestSigner::new(&crypto).authority_sign(&mut m, &app, &key).unwrap();

        assert_eq!(m.signatures().len(), 1);
        let sig = &m.signatures()[0];
        assert_eq!(sig.signer_id, app);
        assert!(crypto
            .verify(m.content_snapshot(), &sig.signature_bytes, &key.public_key())
            .unwrap());
    }

    #[test]
    fn same_signer_same_snapshot_is_duplicate() {
        let crypto = Ed25519Crypto;
        let key = Ed25519PrivateKey::from_seed(&[2; 32]);
        let app = SignerId::new("app1").unwrap();
        let signer = RequestSigner::new(&crypto);
        let mut m = model();

        signer.authority_sign(&mut m, &app, &key).unwrap();
        let err = signer.authority_sign(&mut m, &app, &key).unwrap_err();
        assert!(err.is_duplicate_signature());
        assert_eq!(m.signatures().len(), 1);
    }

    #[test]
    fn self_then_authority_order() {
        let crypto = Ed25519Crypto;
        let owner = Ed25519PrivateKey::from_seed(&[3; 32]);
        let app_key = Ed25519PrivateKey::from_seed(&[4; 32]);
        let app = SignerId::new("app1").unwrap();
        let signer = RequestSigner::new(&crypto);
        let mut m = model();

        signer.self_sign(&mut m, &owner).unwrap();
        signer.authority_sign(&mut m, &app, &app_key).unwrap();

        let ids: Vec<&str> = m.signatures().iter().map(|s| s.signer_id.as_str()).collect();
        assert_eq!(ids, vec![m.card_id().as_str(), "app1"]);
    }

    #[test]
    fn signing_does_not_touch_snapshot() {
        let crypto = Ed25519Crypto;
        let mut m = model();
        let before = m.content_snapshot().to_vec();
        RequestSigner::new(&crypto)
            .self_sign(&mut m, &Ed25519PrivateKey::from_seed(&[5; 32]))
            .unwrap();
        assert_eq!(m.content_snapshot(), before.as_slice());
    }
}

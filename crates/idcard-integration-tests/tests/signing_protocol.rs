//! # Card Signing Protocol
//!
//! Snapshot construction, multi-party signing, and the transport encodings,
//! exercised together across the core, crypto, and model crates.

mod common;

use idcard_core::{CardContent, CardError, IdentityType, SignerId, Timestamp};
use idcard_crypto::{Crypto, Ed25519Crypto};
use idcard_model::{
    CreateCardRequest, CustomFields, RequestSigner, SignatureVerifier, SignedModel,
};

fn created_at() -> Timestamp {
    Timestamp::from_epoch_secs(1_700_000_000).unwrap()
}

#[test]
fn authority_signed_model_survives_base64_transport() {
    common::init_tracing();
    let crypto = Ed25519Crypto;
    let app_key = common::app_key();
    let app = SignerId::new(common::APP_ID).unwrap();

    let mut model = SignedModel::generate(b"PK1", "alice@example.com", created_at(), None).unwrap();
    RequestSigner::new(&crypto).authority_sign(&mut model, &app, &app_key).unwrap();

    let decoded = SignedModel::from_string(&model.to_string()).unwrap();
    assert_eq!(decoded.content_snapshot(), model.content_snapshot());
    assert!(decoded.signatures().is_empty());

    // The signature made before transport still verifies over the decoded snapshot.
    let sig = &model.signatures()[0];
    assert!(crypto
        .verify(decoded.content_snapshot(), &sig.signature_bytes, &app_key.public_key())
        .unwrap());
}

#[test]
fn full_envelope_keeps_signatures_and_verifies() {
    common::init_tracing();
    let crypto = Ed25519Crypto;
    let owner = common::owner_key(1);
    let pk = crypto.export_public_key(&crypto.extract_public_key(&owner));
    let signer = RequestSigner::new(&crypto);

    let mut model = SignedModel::generate(&pk, "alice@example.com", created_at(), None).unwrap();
    signer.self_sign(&mut model, &owner).unwrap();
    signer
        .authority_sign(&mut model, &SignerId::new(common::APP_ID).unwrap(), &common::app_key())
        .unwrap();

    let back = SignedModel::from_envelope(&model.to_envelope().unwrap()).unwrap();
    assert_eq!(back, model);
    SignatureVerifier::new(&crypto)
        .with_signer(
            SignerId::new(common::APP_ID).unwrap(),
            common::app_key().public_key().to_bytes(),
        )
        .require_self_signature()
        .verify_all(&back)
        .unwrap();
}

#[test]
fn resigning_same_snapshot_is_duplicate() {
    let crypto = Ed25519Crypto;
    let app = SignerId::new(common::APP_ID).unwrap();
    let mut request = CreateCardRequest::builder("alice", IdentityType::application(), b"PK1")
        .created_at(created_at())
        .build()
        .unwrap();
    let signer = RequestSigner::new(&crypto);
    signer.authority_sign(&mut request, &app, &common::app_key()).unwrap();

    let err = signer
        .authority_sign(&mut request, &app, &common::app_key())
        .unwrap_err();
    assert!(matches!(err, CardError::DuplicateSignature { ref signer_id } if signer_id == "app1"));
    assert_eq!(request.signed_model().signatures().len(), 1);
}

#[test]
fn snapshot_is_independent_of_request_metadata() {
    let mut fields = CustomFields::new();
    fields.insert("note".into(), "x".into());
    let with_meta = CreateCardRequest::builder("bob", IdentityType::email(), b"PK2")
        .custom_field("note", "x")
        .created_at(created_at())
        .build()
        .unwrap();
    let snapshot = CardContent::generate(b"PK2", "bob", created_at(), None).unwrap();
    assert_eq!(with_meta.signed_model().content_snapshot(), snapshot.as_bytes());
    assert_eq!(with_meta.custom_fields(), &fields);
}

#[test]
fn rotation_links_previous_card() {
    let first = SignedModel::generate(b"PK1", "carol", created_at(), None).unwrap();
    let second = SignedModel::generate(b"PK9", "carol", created_at(), Some(first.card_id())).unwrap();
    assert_eq!(second.content().unwrap().previous_card_id(), Some(&first.card_id()));
    assert_ne!(second.card_id(), first.card_id());
}

#[test]
fn json_form_is_the_canonical_text() {
    let created_at = Timestamp::from_epoch_secs(1000).unwrap();
    let model = SignedModel::generate(b"PK1", "alice@example.com", created_at, None).unwrap();
    assert_eq!(
        model.to_json().unwrap(),
        r#"{"created_at":1000,"identity":"alice@example.com","public_key":"UEsx","version":"5.0"}"#
    );
}

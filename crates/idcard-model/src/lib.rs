//! # idcard-model: Signed Card Models
//!
//! The multi-party signing protocol for identity cards:
//!
//! - **Signature** (`signature.rs`): a signer id plus raw signature bytes.
//!
//! - **SignedModel** (`signed_model.rs`): an immutable content snapshot and
//!   the ordered, duplicate-free set of signatures over it, with its base64,
//!   JSON and envelope encodings.
//!
//! - **RequestSigner** (`signer.rs`): the single signing path shared by the
//!   owner, application authorities, and the issuing service.
//!
//! - **Requests** (`request.rs`): application-scope and global card creation
//!   requests and their transport body.
//!
//! - **Verifier** (`verifier.rs`): per-signature verification reports.
//!
//! ## Security Invariant
//!
//! Every signature is computed over the exact snapshot bytes. Nothing in this
//! crate re-serializes content between signing and verification.
//!
//! ## Crate Policy
//!
//! - Depends on `idcard-core` and `idcard-crypto` internally.
//! - Generic over the `Crypto` capability; no backend is assumed outside
//!   tests.

pub mod request;
pub mod signature;
pub mod signed_model;
pub mod signer;
pub mod verifier;

pub use request::{
    CreateCardRequest, CreateCardRequestBuilder, CreateGlobalCardRequest, CustomFields,
    RequestBody, ValidationToken,
};
pub use signature::Signature;
pub use signed_model::SignedModel;
pub use signer::{RequestSigner, SignableRequest};
pub use verifier::{SignatureCheck, SignatureVerifier, VerifyError};

//! # Card Signatures
//!
//! A [`Signature`] is a signer id plus the raw signature bytes. Equality is
//! structural over both fields, which is what the duplicate rule of
//! [`SignedModel`](crate::SignedModel) compares.
//!
//! In JSON the bytes travel as standard base64 under the key `signature`.

use serde::{Deserialize, Serialize};

use idcard_core::encoding::base64_bytes;
use idcard_core::{CardError, SignerId};

/// One signature over a card snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Signature {
    /// Who signed. Carries the signer's role (owner, application, service).
    pub signer_id: SignerId,

    /// Raw signature bytes as produced by the crypto capability.
    #[serde(rename = "signature", with = "base64_bytes")]
    pub signature_bytes: Vec<u8>,
}

impl Signature {
    /// Create a signature. Empty signature bytes are rejected.
    pub fn new(signer_id: SignerId, signature_bytes: Vec<u8>) -> Result<Self, CardError> {
        if signature_bytes.is_empty() {
            return Err(CardError::invalid_argument(format!(
                "signature bytes from {signer_id} are empty"
            )));
        }
        Ok(Self {
            signer_id,
            signature_bytes,
        })
    }
}

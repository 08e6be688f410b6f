//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types shared by every crate in the workspace. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Argument errors are detected synchronously, before any crypto call or
//!   collaborator I/O.
//! - Signature bookkeeping errors name the offending signer.
//! - Decoding errors describe which textual form failed to parse.

use thiserror::Error;

/// Top-level error type for card content, signed models, and signing.
#[derive(Error, Debug)]
pub enum CardError {
    /// A required input was empty or a parameter was out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A structurally identical signature is already attached to the model.
    #[error("duplicate signature from signer {signer_id}")]
    DuplicateSignature {
        /// The signer whose signature was already present.
        signer_id: String,
    },

    /// Malformed base64 or non-decodable content passed to a `from_*` constructor.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// Stored bytes cannot be rendered in the requested textual form.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The crypto capability failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl CardError {
    /// Shorthand for [`CardError::InvalidArgument`].
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Returns `true` if this is a [`CardError::DuplicateSignature`].
    ///
    /// Callers re-running a signing step may treat this as "already done".
    pub fn is_duplicate_signature(&self) -> bool {
        matches!(self, Self::DuplicateSignature { .. })
    }
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    /// A whole-valued float, which JCS would print as an integer.
    #[error("whole-valued float {0} has no distinct canonical form")]
    IntegralFloat(f64),
}

/// Error raised by a crypto capability.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Raw key bytes could not be imported into a key handle.
    #[error("key import failed: {0}")]
    KeyImport(String),

    /// Signature computation failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed (wrong key or tampered ciphertext).
    #[error("decryption failed: {0}")]
    Decryption(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_display() {
        let err = CardError::invalid_argument("buffer is empty");
        assert_eq!(format!("{err}"), "invalid argument: buffer is empty");
    }

    #[test]
    fn duplicate_signature_names_signer() {
        let err = CardError::DuplicateSignature {
            signer_id: "app1".to_string(),
        };
        assert!(format!("{err}").contains("app1"));
        assert!(err.is_duplicate_signature());
        assert!(!CardError::Decoding("x".into()).is_duplicate_signature());
    }

    #[test]
    fn crypto_error_converts() {
        let err: CardError = CryptoError::KeyImport("bad length".into()).into();
        assert!(matches!(err, CardError::Crypto(CryptoError::KeyImport(_))));
        assert!(format!("{err}").contains("bad length"));
    }
}

//! # Crypto Capability
//!
//! The card stack never touches raw key material itself. Every asymmetric
//! operation goes through a [`Crypto`] implementation supplied by the
//! caller, which owns the key formats and algorithms.
//!
//! Key handles are associated types so a backend can use whatever typed key
//! objects it likes; the stack only moves them between the capability's own
//! methods.

use idcard_core::CryptoError;

/// Asymmetric crypto operations consumed by card signing and card use.
pub trait Crypto {
    /// An imported, usable public key.
    type PublicKey;
    /// An imported, usable private key.
    type PrivateKey;

    /// Import raw exported public key bytes (as stored in card content).
    fn import_public_key(&self, raw: &[u8]) -> Result<Self::PublicKey, CryptoError>;

    /// Import raw private key bytes.
    fn import_private_key(&self, raw: &[u8]) -> Result<Self::PrivateKey, CryptoError>;

    /// Derive the public half of a private key.
    fn extract_public_key(&self, private_key: &Self::PrivateKey) -> Self::PublicKey;

    /// Export a public key to the raw bytes stored in card content.
    fn export_public_key(&self, public_key: &Self::PublicKey) -> Vec<u8>;

    /// Sign `data`.
    fn sign(&self, data: &[u8], private_key: &Self::PrivateKey) -> Result<Vec<u8>, CryptoError>;

    /// Check `signature` over `data`.
    ///
    /// A well-formed but non-matching signature yields `Ok(false)`; `Err` is
    /// reserved for failures of the capability itself.
    fn verify(
        &self,
        data: &[u8],
        signature: &[u8],
        public_key: &Self::PublicKey,
    ) -> Result<bool, CryptoError>;

    /// Encrypt `data` to the holder of `public_key`.
    fn encrypt(&self, data: &[u8], public_key: &Self::PublicKey) -> Result<Vec<u8>, CryptoError>;

    /// Decrypt ciphertext produced by [`Crypto::encrypt`].
    fn decrypt(&self, data: &[u8], private_key: &Self::PrivateKey)
        -> Result<Vec<u8>, CryptoError>;
}

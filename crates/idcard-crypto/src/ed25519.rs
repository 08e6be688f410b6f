//! # Ed25519 Reference Backend
//!
//! [`Ed25519Crypto`] implements the [`Crypto`] capability with a single
//! Ed25519 key per card:
//!
//! - **Signatures**: plain Ed25519 over the given bytes (64-byte output).
//! - **Encryption**: an anonymous sealed box (X25519 + XSalsa20-Poly1305)
//!   addressed to the Montgomery form of the card's Ed25519 key. The
//!   recipient opens it with the X25519 scalar derived from the same
//!   signing key.
//!
//! ## Key Formats
//!
//! - Public keys: the 32-byte compressed Edwards point.
//! - Private keys: the 32-byte Ed25519 seed.
//!
//! ## Security Invariants
//!
//! - `Ed25519PrivateKey` does not implement `Serialize`, `Clone` or a
//!   revealing `Debug`. Seed bytes leave it only inside `Zeroizing`.
//! - The underlying `SigningKey` zeroizes on drop.

use ed25519_dalek::{Signer, Verifier};
use idcard_core::CryptoError;
use rand_core::OsRng;
use zeroize::Zeroizing;

use crate::capability::Crypto;

/// An imported Ed25519 public key.
#[derive(Clone, PartialEq, Eq)]
pub struct Ed25519PublicKey(ed25519_dalek::VerifyingKey);

/// An imported Ed25519 private key.
pub struct Ed25519PrivateKey(ed25519_dalek::SigningKey);

/// Ed25519 signatures with sealed-box encryption to the same key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Crypto;

// ---------------------------------------------------------------------------
// Key impls
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    /// The raw 32-byte public key.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    fn sealing_key(&self) -> crypto_box::PublicKey {
        crypto_box::PublicKey::from(self.0.to_montgomery().to_bytes())
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.0.as_bytes().iter().take(4).map(|b| format!("{b:02x}")).collect();
        write!(f, "Ed25519PublicKey({prefix}...)")
    }
}

impl Ed25519PrivateKey {
    /// Create a private key from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(seed))
    }

    /// The 32-byte seed, wrapped so it is wiped when dropped.
    pub fn to_seed(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.0.to_bytes())
    }

    /// The matching public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.0.verifying_key())
    }

    fn opening_key(&self) -> crypto_box::SecretKey {
        let scalar = Zeroizing::new(self.0.to_scalar_bytes());
        crypto_box::SecretKey::from(*scalar)
    }
}

impl std::fmt::Debug for Ed25519PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PrivateKey(<private>)")
    }
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

impl Crypto for Ed25519Crypto {
    type PublicKey = Ed25519PublicKey;
    type PrivateKey = Ed25519PrivateKey;

    fn import_public_key(&self, raw: &[u8]) -> Result<Ed25519PublicKey, CryptoError> {
        let bytes: [u8; 32] = raw.try_into().map_err(|_| {
            CryptoError::KeyImport(format!(
                "Ed25519 public key must be 32 bytes, got {}",
                raw.len()
            ))
        })?;
        ed25519_dalek::VerifyingKey::from_bytes(&bytes)
            .map(Ed25519PublicKey)
            .map_err(|e| CryptoError::KeyImport(format!("invalid Ed25519 public key: {e}")))
    }

    fn import_private_key(&self, raw: &[u8]) -> Result<Ed25519PrivateKey, CryptoError> {
        let seed: Zeroizing<[u8; 32]> = Zeroizing::new(raw.try_into().map_err(|_| {
            CryptoError::KeyImport(format!(
                "Ed25519 private key seed must be 32 bytes, got {}",
                raw.len()
            ))
        })?);
        Ok(Ed25519PrivateKey::from_seed(&seed))
    }

    fn extract_public_key(&self, private_key: &Ed25519PrivateKey) -> Ed25519PublicKey {
        private_key.public_key()
    }

    fn export_public_key(&self, public_key: &Ed25519PublicKey) -> Vec<u8> {
        public_key.to_bytes().to_vec()
    }

    fn sign(&self, data: &[u8], private_key: &Ed25519PrivateKey) -> Result<Vec<u8>, CryptoError> {
        Ok(private_key.0.sign(data).to_bytes().to_vec())
    }

    fn verify(
        &self,
        data: &[u8],
        signature: &[u8],
        public_key: &Ed25519PublicKey,
    ) -> Result<bool, CryptoError> {
        let Ok(bytes) = <[u8; 64]>::try_from(signature) else {
            return Ok(false);
        };
        let sig = ed25519_dalek::Signature::from_bytes(&bytes);
        Ok(public_key.0.verify(data, &sig).is_ok())
    }

    fn encrypt(&self, data: &[u8], public_key: &Ed25519PublicKey) -> Result<Vec<u8>, CryptoError> {
        public_key
            .sealing_key()
            .seal(&mut OsRng, data)
            .map_err(|_| CryptoError::Encryption("sealed box construction failed".to_string()))
    }

    fn decrypt(&self, data: &[u8], private_key: &Ed25519PrivateKey) -> Result<Vec<u8>, CryptoError> {
        private_key
            .opening_key()
            .unseal(data)
            .map_err(|_| CryptoError::Decryption("sealed box did not open".to_string()))
    }
}

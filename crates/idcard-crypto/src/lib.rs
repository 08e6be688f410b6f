//! # idcard-crypto: The Crypto Capability
//!
//! Defines [`Crypto`], the opaque asymmetric-crypto capability the card
//! stack delegates every key operation to, and ships one backend:
//!
//! - **Ed25519** ([`Ed25519Crypto`], default feature `ed25519`): Ed25519
//!   card signatures and sealed-box encryption to the card key.
//!
//! ## Crate Policy
//!
//! - Depends only on `idcard-core` internally.
//! - Tests use real Ed25519 keys from fixed seeds; no mocked signatures.

pub mod capability;

#[cfg(feature = "ed25519")]
pub mod ed25519;

pub use capability::Crypto;
pub use idcard_core::CryptoError;

#[cfg(feature = "ed25519")]
pub use ed25519::{Ed25519Crypto, Ed25519PrivateKey, Ed25519PublicKey};

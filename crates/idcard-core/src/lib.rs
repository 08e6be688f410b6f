//! # idcard-core: Foundational Types for the Identity Card Stack
//!
//! This crate is the leaf of the workspace dependency graph. It defines the
//! value types every other crate builds on:
//!
//! 1. **`CardContent`**: the immutable card payload and its canonical
//!    snapshot, the byte string all card signatures bind to.
//!
//! 2. **`CanonicalBytes`**: the only construction path for snapshot bytes
//!    (RFC 8785 JCS), so the same logical content always yields the same
//!    bytes.
//!
//! 3. **Identifier newtypes**: `CardId`, `SignerId`, `IdentityType`. No
//!    bare strings for identifiers.
//!
//! 4. **`CardError` / `CryptoError`**: the error taxonomy shared by the
//!    signing and client layers.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `idcard-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod content;
pub mod encoding;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use content::{CardContent, CONTENT_VERSION};
pub use encoding::{from_base64, to_base64};
pub use error::{CanonicalizationError, CardError, CryptoError};
pub use identity::{CardId, IdentityType, SignerId};
pub use temporal::Timestamp;

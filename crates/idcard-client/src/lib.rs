//! # idcard-client: Cards Against a Card Service
//!
//! The layer applications use:
//!
//! - **Context** (`context.rs`): crypto capability, card service, and
//!   application credentials in one place; creates, resolves and imports
//!   cards.
//!
//! - **Card** (`card.rs`): a resolved card. Encrypts to and verifies for the
//!   holder, starts identity verification, publishes, exports.
//!
//! - **CardService** (`service.rs`): the issuing-service boundary.
//!
//! - **Records** (`record.rs`): the resolved attribute set and its
//!   versioned export document.
//!
//! - **Verification** (`verification.rs`): identity confirmation for global
//!   cards.
//!
//! - **Credentials** (`config.rs`): application id and key, from the
//!   environment or explicit values.
//!
//! - **InMemoryCardService** (`memory.rs`, feature `memory`): an issuing
//!   service that lives in process memory.
//!
//! ## Crate Policy
//!
//! - All calls are synchronous.
//! - Private keys, validation tokens, and confirmation codes never reach
//!   logs or `Debug` output.

pub mod card;
pub mod config;
pub mod context;
pub mod error;
#[cfg(feature = "memory")]
pub mod memory;
pub mod record;
pub mod service;
pub mod verification;

pub use card::Card;
pub use config::{ConfigError, Credentials};
pub use context::Context;
pub use error::{ClientError, ServiceError};
#[cfg(feature = "memory")]
pub use memory::InMemoryCardService;
pub use record::{CardRecord, CardScope, ExportedCard, EXPORT_FORMAT_VERSION};
pub use service::{ActionId, CardService};
pub use verification::{IdentityVerificationAttempt, VerificationOptions};

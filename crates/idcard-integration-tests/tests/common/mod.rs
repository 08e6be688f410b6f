//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Once;

use idcard_client::{Context, Credentials, InMemoryCardService};
use idcard_core::SignerId;
use idcard_crypto::{Ed25519Crypto, Ed25519PrivateKey};
use tracing_subscriber::EnvFilter;

pub const APP_ID: &str = "app1";
pub const SERVICE_ID: &str = "card-service";

pub type MemoryContext = Context<Ed25519Crypto, InMemoryCardService<Ed25519Crypto>>;

static TRACING: Once = Once::new();

/// Route `tracing` output to the test harness. `RUST_LOG` overrides the
/// default `warn` level.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_test_writer()
            .try_init();
    });
}

pub fn owner_key(seed: u8) -> Ed25519PrivateKey {
    Ed25519PrivateKey::from_seed(&[seed; 32])
}

pub fn app_key() -> Ed25519PrivateKey {
    Ed25519PrivateKey::from_seed(&[0xA1; 32])
}

pub fn service_key() -> Ed25519PrivateKey {
    Ed25519PrivateKey::from_seed(&[0x5E; 32])
}

pub fn memory_service() -> InMemoryCardService<Ed25519Crypto> {
    InMemoryCardService::new(
        Ed25519Crypto,
        SignerId::new(SERVICE_ID).unwrap(),
        service_key(),
    )
    .register_application(SignerId::new(APP_ID).unwrap(), &app_key().public_key())
}

/// A context over the in-memory service with `app1` credentials.
pub fn memory_context() -> MemoryContext {
    init_tracing();
    Context::new(Ed25519Crypto, memory_service())
        .with_credentials(Credentials::new(APP_ID, app_key().to_seed().to_vec()).unwrap())
}

//! # Application Credentials
//!
//! An application publishes cards under its own authority signature. Its
//! credentials are the signer id it files that signature under and the raw
//! private key bytes the crypto capability imports on demand.
//!
//! ## Environment
//!
//! ```bash
//! export IDCARD_APP_ID="app1"
//! export IDCARD_APP_KEY="<base64 private key bytes>"
//! ```
//!
//! Key bytes live in `Zeroizing` storage and are redacted from `Debug`.

use thiserror::Error;
use zeroize::Zeroizing;

use idcard_core::{from_base64, CryptoError, SignerId};
use idcard_crypto::Crypto;

/// Environment variable holding the application id.
pub const APP_ID_VAR: &str = "IDCARD_APP_ID";
/// Environment variable holding the base64 application private key.
pub const APP_KEY_VAR: &str = "IDCARD_APP_KEY";

/// Configuration failure.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variable {0} not set")]
    MissingVar(&'static str),

    #[error("invalid value in {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },

    #[error("application credentials are not configured")]
    NoCredentials,
}

/// Application id and private key.
pub struct Credentials {
    app_id: SignerId,
    app_key: Zeroizing<Vec<u8>>,
}

impl Credentials {
    /// Build credentials from an id and raw private key bytes.
    pub fn new(app_id: &str, app_key: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let app_id = SignerId::new(app_id).map_err(|e| ConfigError::InvalidVar {
            name: APP_ID_VAR,
            reason: e.to_string(),
        })?;
        let app_key = Zeroizing::new(app_key.into());
        if app_key.is_empty() {
            return Err(ConfigError::InvalidVar {
                name: APP_KEY_VAR,
                reason: "key is empty".to_string(),
            });
        }
        Ok(Self { app_id, app_key })
    }

    /// Load from `IDCARD_APP_ID` and `IDCARD_APP_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let app_id = lookup(APP_ID_VAR).ok_or(ConfigError::MissingVar(APP_ID_VAR))?;
        let encoded = Zeroizing::new(lookup(APP_KEY_VAR).ok_or(ConfigError::MissingVar(APP_KEY_VAR))?);
        let app_key = Zeroizing::new(from_base64(&encoded).map_err(|e| ConfigError::InvalidVar {
            name: APP_KEY_VAR,
            reason: e.to_string(),
        })?);
        let creds = Self::new(&app_id, app_key.to_vec())?;
        tracing::debug!(app_id = %creds.app_id, "application credentials loaded");
        Ok(creds)
    }

    /// The signer id authority signatures are filed under.
    pub fn app_id(&self) -> &SignerId {
        &self.app_id
    }

    /// Import the application key through the crypto capability.
    pub fn get_app_key<C: Crypto>(&self, crypto: &C) -> Result<C::PrivateKey, CryptoError> {
        crypto.import_private_key(&self.app_key)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("app_key", &"<redacted>")
            .finish()
    }
}

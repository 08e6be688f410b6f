//! # Client Errors
//!
//! [`ServiceError`] is what a [`CardService`](crate::CardService)
//! implementation reports. [`ClientError`] is what client operations return:
//! card-level and service-level errors pass through unchanged.

use thiserror::Error;

use idcard_core::{CardError, CryptoError};

use crate::config::ConfigError;

/// Failure reported by the card service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The service refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// A validation token or confirmation code was not accepted.
    #[error("invalid or expired identity token")]
    InvalidToken,

    /// The identity type cannot be used for this operation.
    #[error("unsupported identity type: {0}")]
    UnsupportedIdentityType(String),

    /// No card or verification action with this id.
    #[error("not found: {0}")]
    NotFound(String),

    /// The transport failed before the service answered.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Error returned by client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Card(#[from] CardError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<CryptoError> for ClientError {
    fn from(e: CryptoError) -> Self {
        Self::Card(CardError::Crypto(e))
    }
}

impl ClientError {
    /// Returns `true` for `CardError::InvalidArgument`.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::Card(CardError::InvalidArgument(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_surface_unchanged() {
        let err = ClientError::from(ServiceError::Rejected("no app signature".into()));
        assert_eq!(err.to_string(), "request rejected: no app signature");
        assert!(matches!(err, ClientError::Service(ServiceError::Rejected(_))));
    }

    #[test]
    fn crypto_errors_nest_under_card() {
        let err = ClientError::from(CryptoError::KeyImport("bad".into()));
        assert!(matches!(err, ClientError::Card(CardError::Crypto(_))));
    }

    #[test]
    fn invalid_argument_predicate() {
        assert!(ClientError::from(CardError::invalid_argument("x")).is_invalid_argument());
        assert!(!ClientError::from(ServiceError::InvalidToken).is_invalid_argument());
    }
}

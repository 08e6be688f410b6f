//! # Global Identity Verification
//!
//! Publishing a global card needs a validation token proving the identity
//! holder received a confirmation code. The flow is:
//!
//! 1. [`Card::check_identity`](crate::Card::check_identity) asks the service
//!    to start verification and returns an [`IdentityVerificationAttempt`].
//! 2. The holder receives a code out of band.
//! 3. [`IdentityVerificationAttempt::confirm`] redeems it for a
//!    [`ValidationToken`].
//! 4. [`Card::publish_global`](crate::Card::publish_global) submits the card
//!    with that token.

use serde::{Deserialize, Serialize};

use idcard_core::{CardError, IdentityType};
use idcard_model::ValidationToken;

use crate::error::ClientError;
use crate::service::{ActionId, CardService};

/// Longest token lifetime a service will grant: one year.
pub const MAX_TIME_TO_LIVE: u64 = 60 * 60 * 24 * 365;
/// Most uses a single token may be granted.
pub const MAX_COUNT_TO_LIVE: u32 = 100;

/// Lifetime limits requested for a validation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOptions {
    time_to_live: u64,
    count_to_live: u32,
}

impl VerificationOptions {
    /// # Errors
    ///
    /// `CardError::InvalidArgument` unless `1 <= time_to_live <= 31_536_000`
    /// and `1 <= count_to_live <= 100`.
    pub fn new(time_to_live: u64, count_to_live: u32) -> Result<Self, CardError> {
        if time_to_live == 0 || time_to_live > MAX_TIME_TO_LIVE {
            return Err(CardError::invalid_argument(format!(
                "time_to_live must be within 1..={MAX_TIME_TO_LIVE} seconds, got {time_to_live}"
            )));
        }
        if count_to_live == 0 || count_to_live > MAX_COUNT_TO_LIVE {
            return Err(CardError::invalid_argument(format!(
                "count_to_live must be within 1..={MAX_COUNT_TO_LIVE}, got {count_to_live}"
            )));
        }
        Ok(Self {
            time_to_live,
            count_to_live,
        })
    }

    pub fn time_to_live(&self) -> u64 {
        self.time_to_live
    }

    pub fn count_to_live(&self) -> u32 {
        self.count_to_live
    }
}

impl Default for VerificationOptions {
    /// One hour, one use.
    fn default() -> Self {
        Self {
            time_to_live: 3600,
            count_to_live: 1,
        }
    }
}

/// A started identity verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityVerificationAttempt {
    pub action_id: ActionId,
    pub time_to_live: u64,
    pub count_to_live: u32,
    pub identity: String,
    pub identity_type: IdentityType,
}

impl IdentityVerificationAttempt {
    /// Redeem the confirmation code for a validation token.
    pub fn confirm<S: CardService + ?Sized>(
        &self,
        client: &S,
        confirmation_code: &str,
    ) -> Result<ValidationToken, ClientError> {
        if confirmation_code.trim().is_empty() {
            return Err(CardError::invalid_argument("confirmation code is empty").into());
        }
        let token = client.confirm_identity(
            &self.action_id,
            confirmation_code.trim(),
            self.time_to_live,
            self.count_to_live,
        )?;
        tracing::info!(action_id = %self.action_id, identity_type = %self.identity_type, "identity confirmed");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = VerificationOptions::default();
        assert_eq!(opts.time_to_live(), 3600);
        assert_eq!(opts.count_to_live(), 1);
    }

    #[test]
    fn one_year_is_the_upper_bound() {
        assert!(VerificationOptions::new(31_536_000, 1).is_ok());
        assert!(matches!(
            VerificationOptions::new(31_536_001, 1),
            Err(CardError::InvalidArgument(_))
        ));
    }

    #[test]
    fn count_bounds() {
        assert!(VerificationOptions::new(60, 100).is_ok());
        assert!(VerificationOptions::new(60, 101).is_err());
        assert!(VerificationOptions::new(60, 0).is_err());
        assert!(VerificationOptions::new(0, 1).is_err());
    }
}

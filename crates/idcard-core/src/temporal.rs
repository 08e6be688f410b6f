//! # Temporal Types: Epoch-Second Timestamps
//!
//! Card content records its creation time as an integer count of seconds
//! since the Unix epoch. `Timestamp` wraps that integer so it serializes as a
//! plain JSON number inside the canonical snapshot, while still offering a
//! UTC rendering for logs and diagnostics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CardError;

/// A UTC instant with seconds precision, stored as epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    /// Create a timestamp from epoch seconds.
    ///
    /// # Errors
    ///
    /// Returns `CardError::InvalidArgument` if `secs` is outside the range
    /// chrono can represent.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, CardError> {
        DateTime::from_timestamp(secs, 0)
            .map(|_| Self(secs))
            .ok_or_else(|| CardError::invalid_argument(format!("invalid Unix timestamp: {secs}")))
    }

    /// Returns the Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0
    }

    /// A timestamp `secs` seconds later, saturating at `i64::MAX`.
    pub fn plus_secs(&self, secs: u64) -> Self {
        let secs = i64::try_from(secs).unwrap_or(i64::MAX);
        Self(self.0.saturating_add(secs))
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        match DateTime::from_timestamp(self.0, 0) {
            Some(dt) => dt.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            None => format!("@{}", self.0),
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

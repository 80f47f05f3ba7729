//! # Temporal Types — Epoch-Millisecond Timestamps and the Injected Clock
//!
//! Entity metadata stores creation and last-update instants as non-negative
//! epoch milliseconds. [`Timestamp`] enforces that range at construction and
//! serializes as a plain integer.
//!
//! "Now" is never read from a global. Code that needs the current time asks
//! a [`Clock`], which callers inject: [`SystemClock`] in production,
//! [`FixedClock`] in tests that assert exact timestamps.

use std::fmt;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors constructing a [`Timestamp`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// Epoch milliseconds before 1970-01-01T00:00:00Z.
    #[error("timestamp must be a non-negative epoch millisecond value, got {0}")]
    Negative(i64),

    /// Epoch milliseconds outside the representable calendar range.
    #[error("timestamp {0} is outside the representable range")]
    OutOfRange(i64),
}

/// A UTC instant truncated to millisecond precision, never before the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current system time, truncated to milliseconds.
    ///
    /// Prefer a [`Clock`] in code paths that must be testable.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating to milliseconds.
    ///
    /// Instants before the epoch are clamped to the epoch.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        if dt.timestamp_millis() < 0 {
            return Self(DateTime::<Utc>::default());
        }
        Self(truncate_to_millis(dt))
    }

    /// Create a timestamp from Unix epoch milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError::Negative`] for values below zero and
    /// [`TimestampError::OutOfRange`] for values chrono cannot represent.
    pub fn from_millis(millis: i64) -> Result<Self, TimestampError> {
        if millis < 0 {
            return Err(TimestampError::Negative(millis));
        }
        DateTime::from_timestamp_millis(millis)
            .map(Self)
            .ok_or(TimestampError::OutOfRange(millis))
    }

    /// Unix epoch milliseconds.
    pub fn epoch_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as ISO 8601 with millisecond precision and Z suffix.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
    }
}

impl TryFrom<i64> for Timestamp {
    type Error = TimestampError;

    fn try_from(millis: i64) -> Result<Self, Self::Error> {
        Self::from_millis(millis)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.epoch_millis()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = dt.nanosecond();
    dt.with_nanosecond(nanos - nanos % 1_000_000).unwrap_or(dt)
}

// ─── Clock ───────────────────────────────────────────────────────────

/// A source of the current time.
pub trait Clock: Send + Sync + fmt::Debug {
    /// The current instant.
    fn now(&self) -> Timestamp;
}

/// The operating-system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(Timestamp);

impl FixedClock {
    /// A clock that always reports `at`.
    pub fn new(at: Timestamp) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

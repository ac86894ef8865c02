//! Retention window for idempotency records.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// How long stored booking outcomes remain replayable.
///
/// Hours are clamped to `[1, 87600]` so a misconfigured value can neither
/// expire records before a client retries nor keep them forever.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use telecare::domain::idempotency::IdempotencyConfig;
///
/// assert_eq!(IdempotencyConfig::default().ttl(), Duration::from_secs(24 * 3600));
/// assert_eq!(IdempotencyConfig::from_hours(0).ttl(), Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdempotencyConfig {
    ttl_hours: u64,
}

impl IdempotencyConfig {
    /// Default retention.
    pub const DEFAULT_TTL_HOURS: u64 = 24;
    const MIN_TTL_HOURS: u64 = 1;
    const MAX_TTL_HOURS: u64 = 24 * 365 * 10;

    /// Retain records for `hours`, clamped.
    pub fn from_hours(hours: u64) -> Self {
        Self {
            ttl_hours: hours.clamp(Self::MIN_TTL_HOURS, Self::MAX_TTL_HOURS),
        }
    }

    /// Retention window.
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_hours * 3600)
    }

    /// Records created before this instant have expired.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        // ttl_hours is bounded by MAX_TTL_HOURS so the cast cannot wrap.
        now - TimeDelta::hours(self.ttl_hours as i64)
    }
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self::from_hours(Self::DEFAULT_TTL_HOURS)
    }
}

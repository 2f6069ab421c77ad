//! Local time-of-day model.
//!
//! # Design
//!
//! Every timestamp in the engine comes from telemetry (`cycle_start_time`,
//! Unix seconds); nothing reads the wall clock, so replaying a log is
//! deterministic.  Schedules and history profiles are keyed by *local*
//! time-of-day, which needs only a fixed UTC offset:
//!
//! ```text
//! local_secs   = unix_secs + utc_offset_secs
//! hour_of_day  = (local_secs mod 86_400) / 3_600
//! ```

use std::fmt;

use chrono::{DateTime, NaiveDate};

use crate::{CoreError, CoreResult};

const SECS_PER_DAY: i64 = 86_400;
const SECS_PER_HOUR: f64 = 3_600.0;
/// chrono rejects offsets of a full day or more.
const MAX_OFFSET_SECS: i32 = 86_399;

// ── LocalClock ────────────────────────────────────────────────────────────────

/// Converts telemetry Unix seconds to local time-of-day and calendar date.
///
/// Cheap to copy; holds no heap data.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalClock {
    utc_offset_secs: i32,
}

impl LocalClock {
    /// A clock `utc_offset_secs` east of UTC (e.g. 28_800 for UTC+8).
    pub fn new(utc_offset_secs: i32) -> CoreResult<Self> {
        if utc_offset_secs.abs() > MAX_OFFSET_SECS {
            return Err(CoreError::InvalidUtcOffset(utc_offset_secs));
        }
        Ok(Self { utc_offset_secs })
    }

    pub fn utc() -> Self {
        Self { utc_offset_secs: 0 }
    }

    pub fn utc_offset_secs(&self) -> i32 {
        self.utc_offset_secs
    }

    /// Seconds elapsed since local midnight.  Defined for every `i64`.
    #[inline]
    pub fn secs_of_day(&self, unix_secs: i64) -> i64 {
        (unix_secs.rem_euclid(SECS_PER_DAY) + i64::from(self.utc_offset_secs)).rem_euclid(SECS_PER_DAY)
    }

    /// Fractional local hour in `[0, 24)`.
    #[inline]
    pub fn hour_of_day(&self, unix_secs: i64) -> f64 {
        self.secs_of_day(unix_secs) as f64 / SECS_PER_HOUR
    }

    /// Whole minutes since local midnight, `[0, 1440)`.
    #[inline]
    pub fn minute_of_day(&self, unix_secs: i64) -> u32 {
        (self.secs_of_day(unix_secs) / 60) as u32
    }

    /// Local calendar date of `unix_secs`.
    pub fn local_date(&self, unix_secs: i64) -> CoreResult<NaiveDate> {
        unix_secs
            .checked_add(i64::from(self.utc_offset_secs))
            .and_then(|local| DateTime::from_timestamp(local, 0))
            .map(|dt| dt.date_naive())
            .ok_or(CoreError::InvalidTimestamp(unix_secs))
    }
}

impl fmt::Display for LocalClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.utc_offset_secs < 0 { '-' } else { '+' };
        let abs = self.utc_offset_secs.unsigned_abs();
        write!(f, "UTC{}{:02}:{:02}", sign, abs / 3_600, (abs % 3_600) / 60)
    }
}

// ── Rate conversion ───────────────────────────────────────────────────────────

/// Scale a vehicle count observed over `duration_secs` to an hourly rate.
///
/// Returns `None` for a non-positive duration.
#[inline]
pub fn hourly_rate(count: f64, duration_secs: f64) -> Option<f64> {
    (duration_secs > 0.0).then(|| count / duration_secs * SECS_PER_HOUR)
}

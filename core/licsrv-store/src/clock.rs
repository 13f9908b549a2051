//! Local wall clock and ISO-8601 helpers.
//!
//! Timestamps written to the store carry the configured local offset and
//! second precision, e.g. `2026-10-18T19:04:05+07:00`. Timestamps read back
//! are parsed permissively because the table can be edited by hand.

use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, SecondsFormat, TimeZone, Utc};
use std::fmt::Display;

/// Default license window for newly created records, in days.
pub const DEFAULT_ACTIVATION_DAYS: i64 = 7;

/// Default local timezone offset, in hours east of UTC.
pub const DEFAULT_TZ_OFFSET_HOURS: i32 = 7;

const SECS_PER_HOUR: i32 = 60 * 60;

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// A wall clock pinned to a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalClock {
    offset: FixedOffset,
}

impl LocalClock {
    /// Creates a clock for the given offset in hours east of UTC.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the offset is not within ±23 hours.
    pub fn from_offset_hours(hours: i32) -> StoreResult<Self> {
        hours
            .checked_mul(SECS_PER_HOUR)
            .and_then(FixedOffset::east_opt)
            .map(|offset| Self { offset })
            .ok_or_else(|| StoreError::Config(format!("timezone offset out of range: {hours}h")))
    }

    /// A clock that reports UTC.
    #[must_use]
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Returns the configured offset.
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Returns the current time in the configured offset.
    #[must_use]
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

/// Formats a timestamp as ISO-8601 with second precision and an explicit
/// `±HH:MM` offset.
pub fn format_iso<Tz>(dt: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Parses a stored timestamp and normalizes it to UTC.
///
/// Accepts RFC 3339, offset-less date-times (taken as UTC), a space instead
/// of `T`, optional fractional seconds, a trailing `Z`, and bare dates
/// (midnight UTC). Returns `None` for empty or unparseable input.
pub fn parse_iso_utc(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let normalized = raw.replacen(' ', "T", 1);
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive = normalized.trim_end_matches(['Z', 'z']);
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

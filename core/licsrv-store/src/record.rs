//! The license record and its raw row form.

use crate::clock::format_iso;
use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

/// 1-based row number in the backing table.
pub type RowIndex = u32;

/// Number of cells a license row occupies.
pub const ROW_WIDTH: usize = 4;

/// A license record for one machine.
///
/// Timestamps are kept as the strings found in (or written to) the store so
/// they round-trip byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    /// Client-supplied machine identifier.
    pub machine_key: String,
    /// First activation, ISO-8601.
    pub activated_at: String,
    /// End of the license window, ISO-8601.
    pub expires_at: String,
    /// Number of recorded runs.
    pub run_count: u64,
}

impl LicenseRecord {
    /// Builds the record for a machine seen for the first time.
    ///
    /// # Errors
    ///
    /// Fails if the activation window overflows the calendar.
    pub fn fresh(
        machine_key: &str,
        now: DateTime<FixedOffset>,
        activation_days: i64,
    ) -> StoreResult<Self> {
        Ok(Self {
            machine_key: machine_key.to_string(),
            activated_at: format_iso(&now),
            expires_at: default_expiry(now, activation_days)?,
            run_count: 0,
        })
    }

    /// Returns the four cells in column order: key, activated-at,
    /// expires-at, run-count.
    #[must_use]
    pub fn to_cells(&self) -> [String; ROW_WIDTH] {
        [
            self.machine_key.clone(),
            self.activated_at.clone(),
            self.expires_at.clone(),
            self.run_count.to_string(),
        ]
    }
}

/// Expiry written for new records and for rows missing one.
///
/// # Errors
///
/// Returns [`StoreError::Config`] if `now + activation_days` is not a
/// representable date.
pub fn default_expiry(now: DateTime<FixedOffset>, activation_days: i64) -> StoreResult<String> {
    Duration::try_days(activation_days)
        .and_then(|window| now.checked_add_signed(window))
        .map(|expiry| format_iso(&expiry))
        .ok_or_else(|| {
            StoreError::Config(format!(
                "activation window out of range: {activation_days} days"
            ))
        })
}

/// A row exactly as read from the store, before any defaulting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredRow {
    pub machine_key: String,
    pub activated_at: String,
    pub expires_at: String,
    pub run_count: String,
}

impl StoredRow {
    /// Builds a row from raw cells. Missing trailing cells read as empty.
    pub fn from_cells<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut cells = cells.into_iter();
        let mut next = || cells.next().unwrap_or_default();
        Self {
            machine_key: next(),
            activated_at: next(),
            expires_at: next(),
            run_count: next(),
        }
    }
}

/// Parses a stored run count.
///
/// An empty cell counts as zero. Returns `None` when the cell holds
/// anything other than a non-negative integer.
#[must_use]
pub fn parse_run_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0);
    }
    raw.parse().ok()
}

/// Returns true if a key-column cell identifies `machine_key`.
pub(crate) fn key_matches(cell: &str, machine_key: &str) -> bool {
    cell.trim() == machine_key
}

/// Converts a 0-based position in the key column to a row number.
pub(crate) fn row_at(position: usize) -> StoreResult<RowIndex> {
    position
        .checked_add(1)
        .and_then(|row| RowIndex::try_from(row).ok())
        .ok_or(StoreError::InvalidRow(RowIndex::MAX))
}

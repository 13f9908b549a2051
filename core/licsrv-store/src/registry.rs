//! License record reconciliation.
//!
//! Turns a machine key into a complete license record: rows are created on
//! first sight, rows with blank timestamps are repaired in place, and run
//! counts are bumped on request. The store gives no transactional
//! guarantees, so two first activations of the same key racing each other
//! can both append; that race is not handled here.

use crate::clock::{format_iso, LocalClock};
use crate::error::StoreResult;
use crate::record::{default_expiry, parse_run_count, LicenseRecord, RowIndex, StoredRow};
use crate::store::RecordStore;
use chrono::{DateTime, FixedOffset};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of resolving a machine key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    /// The record as it now stands in the store.
    pub record: LicenseRecord,
    /// True if this call appended the row.
    pub created: bool,
}

/// Whether repairs found while reading are written back straight away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repairs {
    Persist,
    Defer,
}

/// Get-or-create and run counting on top of a [`RecordStore`].
#[derive(Clone)]
pub struct LicenseRegistry {
    store: Arc<dyn RecordStore>,
    clock: LocalClock,
    activation_days: i64,
}

impl LicenseRegistry {
    /// Creates a registry. New records expire `activation_days` after their
    /// activation.
    pub fn new(store: Arc<dyn RecordStore>, clock: LocalClock, activation_days: i64) -> Self {
        Self {
            store,
            clock,
            activation_days,
        }
    }

    /// Returns the clock used for generated timestamps.
    pub fn clock(&self) -> &LocalClock {
        &self.clock
    }

    /// Returns the license window given to new records, in days.
    pub fn activation_days(&self) -> i64 {
        self.activation_days
    }

    /// Returns the record for `machine_key`, creating it with
    /// `run_count = 0` if absent and backfilling blank timestamps.
    pub async fn get_or_create(&self, machine_key: &str) -> StoreResult<Activation> {
        let (_, activation) = self.resolve(machine_key, Repairs::Persist).await?;
        Ok(activation)
    }

    /// Like [`get_or_create`](Self::get_or_create), then adds one to the run
    /// count and writes the whole row. A first call records `run_count = 1`.
    pub async fn increment_run(&self, machine_key: &str) -> StoreResult<Activation> {
        let (row, mut activation) = self.resolve(machine_key, Repairs::Defer).await?;
        activation.record.run_count = activation.record.run_count.saturating_add(1);
        self.store.upsert_row(row, &activation.record).await?;

        debug!(
            "Run {} recorded for {}",
            activation.record.run_count, machine_key
        );
        Ok(activation)
    }

    async fn resolve(
        &self,
        machine_key: &str,
        repairs: Repairs,
    ) -> StoreResult<(RowIndex, Activation)> {
        let now = self.clock.now();

        let Some(row) = self.store.find_row(machine_key).await? else {
            let record = LicenseRecord::fresh(machine_key, now, self.activation_days)?;
            let row = self.store.append_row(&record).await?;
            info!(
                "Activated {} at row {} (expires {})",
                machine_key, row, record.expires_at
            );
            return Ok((
                row,
                Activation {
                    record,
                    created: true,
                },
            ));
        };

        debug!("Found {} at row {}", machine_key, row);
        let stored = self.store.read_row(row).await?;
        let (record, repaired) = self.reconcile(machine_key, row, stored, now)?;

        if repaired && repairs == Repairs::Persist {
            info!("Backfilled missing dates for {} at row {}", machine_key, row);
            self.store.upsert_row(row, &record).await?;
        }

        Ok((
            row,
            Activation {
                record,
                created: false,
            },
        ))
    }

    /// Fills blank timestamps with creation defaults and parses the run
    /// count. Returns the record and whether any field was backfilled.
    /// Fails only if the default expiry cannot be computed.
    fn reconcile(
        &self,
        machine_key: &str,
        row: RowIndex,
        stored: StoredRow,
        now: DateTime<FixedOffset>,
    ) -> StoreResult<(LicenseRecord, bool)> {
        let mut repaired = false;

        let activated_at = if stored.activated_at.is_empty() {
            repaired = true;
            format_iso(&now)
        } else {
            stored.activated_at
        };

        let expires_at = if stored.expires_at.is_empty() {
            repaired = true;
            default_expiry(now, self.activation_days)?
        } else {
            stored.expires_at
        };

        let run_count = parse_run_count(&stored.run_count).unwrap_or_else(|| {
            warn!(
                "Non-numeric run count {:?} for {} at row {}, treating as 0",
                stored.run_count, machine_key, row
            );
            0
        });

        Ok((
            LicenseRecord {
                machine_key: machine_key.to_string(),
                activated_at,
                expires_at,
                run_count,
            },
            repaired,
        ))
    }
}

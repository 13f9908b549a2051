//! In-process record store.
//!
//! Mirrors the spreadsheet's addressing rules (1-based rows, appends land
//! after the last non-empty key cell) so it can stand in for the real
//! backend in development and tests.

use crate::error::{StoreError, StoreResult};
use crate::record::{key_matches, row_at, LicenseRecord, RowIndex, StoredRow};
use crate::store::RecordStore;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// A record store held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<Vec<String>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with raw rows, first row at index 1.
    ///
    /// Rows may be short or contain blank cells, as a hand-edited sheet can.
    #[must_use]
    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Returns a snapshot of every row.
    pub async fn rows(&self) -> Vec<Vec<String>> {
        self.rows.read().await.clone()
    }

    /// Returns a snapshot of one row, or `None` past the end of the table.
    pub async fn row(&self, row: RowIndex) -> Option<Vec<String>> {
        let index = usize::try_from(row).ok()?.checked_sub(1)?;
        self.rows.read().await.get(index).cloned()
    }
}

fn slot(row: RowIndex) -> StoreResult<usize> {
    usize::try_from(row)
        .ok()
        .and_then(|r| r.checked_sub(1))
        .ok_or(StoreError::InvalidRow(row))
}

/// Number of rows up to and including the last non-empty key cell.
fn key_column_len(rows: &[Vec<String>]) -> usize {
    rows.iter()
        .rposition(|cells| cells.first().is_some_and(|key| !key.is_empty()))
        .map_or(0, |last| last + 1)
}

fn write_cells(rows: &mut Vec<Vec<String>>, slot: usize, record: &LicenseRecord) {
    if rows.len() <= slot {
        rows.resize_with(slot + 1, Vec::new);
    }
    rows[slot] = record.to_cells().to_vec();
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find_row(&self, machine_key: &str) -> StoreResult<Option<RowIndex>> {
        let rows = self.rows.read().await;
        let found = rows[..key_column_len(&rows)]
            .iter()
            .position(|cells| {
                key_matches(cells.first().map_or("", String::as_str), machine_key)
            });

        found.map(row_at).transpose()
    }

    async fn read_row(&self, row: RowIndex) -> StoreResult<StoredRow> {
        let slot = slot(row)?;
        let rows = self.rows.read().await;
        let cells = rows.get(slot).cloned().unwrap_or_default();
        Ok(StoredRow::from_cells(cells))
    }

    async fn upsert_row(&self, row: RowIndex, record: &LicenseRecord) -> StoreResult<()> {
        let slot = slot(row)?;
        let mut rows = self.rows.write().await;
        write_cells(&mut rows, slot, record);
        debug!("Wrote row {} for {}", row, record.machine_key);
        Ok(())
    }

    async fn append_row(&self, record: &LicenseRecord) -> StoreResult<RowIndex> {
        let mut rows = self.rows.write().await;
        let slot = key_column_len(&rows);
        let row = row_at(slot)?;
        write_cells(&mut rows, slot, record);
        debug!("Appended row {} for {}", row, record.machine_key);
        Ok(row)
    }
}

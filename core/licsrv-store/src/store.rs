//! Record store abstraction.
//!
//! A store is a row-oriented table: four cells per license, one row per
//! machine, rows addressed by a stable 1-based index. Stores offer no
//! transactions; callers look a key up, then write by row index.

use crate::error::StoreResult;
use crate::record::{LicenseRecord, RowIndex, StoredRow};
use async_trait::async_trait;

/// Row-oriented persistence for license records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns the name of the backing store.
    fn backend_name(&self) -> &'static str;

    /// Scans the key column top to bottom and returns the first row whose
    /// trimmed key equals `machine_key`.
    async fn find_row(&self, machine_key: &str) -> StoreResult<Option<RowIndex>>;

    /// Reads the four cells of a row. Missing cells read as empty.
    async fn read_row(&self, row: RowIndex) -> StoreResult<StoredRow>;

    /// Overwrites all four cells of a row in a single write.
    async fn upsert_row(&self, row: RowIndex, record: &LicenseRecord) -> StoreResult<()>;

    /// Writes `record` to the row after the last key-column entry and
    /// returns its index. The caller must have checked the key is absent.
    async fn append_row(&self, record: &LicenseRecord) -> StoreResult<RowIndex>;
}

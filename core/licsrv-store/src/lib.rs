//! License record storage for the license server.
//!
//! This crate handles:
//! - The license record model (one row of four cells per machine)
//! - A [`RecordStore`] trait over row-oriented backends
//! - A Google Sheets backend with service-account authentication
//! - An in-memory backend for development and tests
//! - Get-or-create and run counting with repair-on-read ([`LicenseRegistry`])
//!
//! # Row Layout
//!
//! | A | B | C | D |
//! |---|---|---|---|
//! | machine key | activated at (ISO-8601) | expires at (ISO-8601) | run count |
//!
//! Rows are addressed by a stable 1-based index and are never deleted or
//! reordered.

mod clock;
mod error;
mod memory;
mod record;
mod registry;
pub mod sheets;
mod store;

pub use clock::{
    format_iso, parse_iso_utc, LocalClock, DEFAULT_ACTIVATION_DAYS, DEFAULT_TZ_OFFSET_HOURS,
};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use record::{default_expiry, parse_run_count, LicenseRecord, RowIndex, StoredRow, ROW_WIDTH};
pub use registry::{Activation, LicenseRegistry};
pub use sheets::{CredentialSource, SheetsConfig, SheetsStore};
pub use store::RecordStore;

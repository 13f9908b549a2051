//! Google Sheets record store.
//!
//! Uses the Sheets API v4 values endpoints. Each license occupies columns
//! A–D of one worksheet row; the key column is read whole for lookups.

mod auth;

pub use auth::{
    CredentialSource, ServiceAccountAuth, ServiceAccountKey, DEFAULT_TOKEN_URI, SHEETS_SCOPE,
};

use crate::error::{StoreError, StoreResult};
use crate::record::{key_matches, row_at, LicenseRecord, RowIndex, StoredRow};
use crate::store::RecordStore;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Worksheet used when none is configured.
pub const DEFAULT_WORKSHEET: &str = "google drive";

/// Google Sheets specific configuration.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// Spreadsheet identifier (the long id in the sheet URL).
    pub spreadsheet_id: String,
    /// Worksheet (tab) holding the license rows.
    pub worksheet: String,
    /// Base URL for the Sheets API (e.g. `https://sheets.googleapis.com`).
    pub api_base_url: String,
    /// Service-account credentials.
    pub credentials: CredentialSource,
    /// Per-request timeout of the HTTP client.
    pub request_timeout: Duration,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            worksheet: DEFAULT_WORKSHEET.to_string(),
            api_base_url: "https://sheets.googleapis.com".to_string(),
            credentials: CredentialSource::Missing,
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Sheets API `ValueRange` as returned by reads.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Sheets API `ValueRange` as sent by writes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RowUpdate<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: [[String; 4]; 1],
}

/// Record store backed by a Google Sheets worksheet.
pub struct SheetsStore {
    config: SheetsConfig,
    client: Client,
    auth: ServiceAccountAuth,
}

impl SheetsStore {
    /// Creates a new Sheets store. No network calls are made until the
    /// first operation.
    pub fn new(config: SheetsConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| StoreError::Network(format!("failed to create HTTP client: {e}")))?;
        let auth = ServiceAccountAuth::new(config.credentials.clone(), client.clone());

        Ok(Self {
            config,
            client,
            auth,
        })
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &SheetsConfig {
        &self.config
    }

    fn values_url(&self, range: &str) -> StoreResult<String> {
        let spreadsheet_id = self.config.spreadsheet_id.trim();
        if spreadsheet_id.is_empty() {
            return Err(StoreError::Config("spreadsheet id is not set".to_string()));
        }
        Ok(format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.config.api_base_url,
            urlencoding::encode(spreadsheet_id),
            urlencoding::encode(range)
        ))
    }

    async fn get_values(
        &self,
        range: &str,
        major_dimension: &str,
    ) -> StoreResult<Vec<Vec<String>>> {
        let url = self.values_url(range)?;
        let access_token = self.auth.access_token().await?;

        debug!("Reading {}", range);

        let response = self
            .client
            .get(url)
            .bearer_auth(&access_token)
            .query(&[("majorDimension", major_dimension)])
            .send()
            .await
            .map_err(|e| StoreError::Network(format!("read {range} failed: {e}")))?;

        let value_range: ValueRange = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Network(format!("failed to parse {range}: {e}")))?;

        Ok(value_range
            .values
            .into_iter()
            .map(|line| line.into_iter().map(cell_text).collect())
            .collect())
    }

    /// Reads the key column, top to bottom, up to its last non-empty cell.
    async fn key_column(&self) -> StoreResult<Vec<String>> {
        let range = a1_range(&self.config.worksheet, "A:A");
        let mut columns = self.get_values(&range, "COLUMNS").await?;
        Ok(if columns.is_empty() {
            Vec::new()
        } else {
            columns.swap_remove(0)
        })
    }

    async fn write_row(&self, row: RowIndex, record: &LicenseRecord) -> StoreResult<()> {
        if row == 0 {
            return Err(StoreError::InvalidRow(row));
        }
        let range = a1_range(&self.config.worksheet, &format!("A{row}:D{row}"));
        let url = self.values_url(&range)?;
        let access_token = self.auth.access_token().await?;
        let body = RowUpdate {
            range: &range,
            major_dimension: "ROWS",
            values: [record.to_cells()],
        };

        debug!("Writing {} for {}", range, record.machine_key);

        let response = self
            .client
            .put(url)
            .bearer_auth(&access_token)
            .query(&[("valueInputOption", "RAW")])
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Network(format!("write {range} failed: {e}")))?;

        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> StoreResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Backend { status, message })
}

/// Builds an A1 range on a worksheet, quoting the sheet name.
fn a1_range(worksheet: &str, cells: &str) -> String {
    format!("'{}'!{}", worksheet.replace('\'', "''"), cells)
}

fn cell_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    }
}

#[async_trait]
impl RecordStore for SheetsStore {
    fn backend_name(&self) -> &'static str {
        "Google Sheets"
    }

    async fn find_row(&self, machine_key: &str) -> StoreResult<Option<RowIndex>> {
        let keys = self.key_column().await?;
        keys.iter()
            .position(|cell| key_matches(cell, machine_key))
            .map(row_at)
            .transpose()
    }

    async fn read_row(&self, row: RowIndex) -> StoreResult<StoredRow> {
        if row == 0 {
            return Err(StoreError::InvalidRow(row));
        }
        let range = a1_range(&self.config.worksheet, &format!("A{row}:D{row}"));
        let mut rows = self.get_values(&range, "ROWS").await?;
        let cells = if rows.is_empty() {
            Vec::new()
        } else {
            rows.swap_remove(0)
        };
        Ok(StoredRow::from_cells(cells))
    }

    async fn upsert_row(&self, row: RowIndex, record: &LicenseRecord) -> StoreResult<()> {
        self.write_row(row, record).await
    }

    async fn append_row(&self, record: &LicenseRecord) -> StoreResult<RowIndex> {
        let keys = self.key_column().await?;
        let row = row_at(keys.len())?;
        self.write_row(row, record).await?;
        info!("Appended row {} for {}", row, record.machine_key);
        Ok(row)
    }
}

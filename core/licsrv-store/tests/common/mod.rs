//! Shared test helpers for store tests.

#![allow(dead_code)]

use licsrv_store::{LicenseRegistry, LocalClock, MemoryStore, DEFAULT_ACTIVATION_DAYS};
use std::sync::Arc;

/// RSA private key (PKCS#8) used to sign service-account assertions.
pub const TEST_PRIVATE_KEY: &str = include_str!("../../../../testdata/rsa_private.pem");

/// Service-account JSON whose token endpoint lives on a mock server.
pub fn service_account_json(token_uri: &str) -> String {
    serde_json::json!({
        "type": "service_account",
        "project_id": "license-test",
        "client_email": "licsrv@license-test.iam.gserviceaccount.com",
        "private_key": TEST_PRIVATE_KEY,
        "token_uri": token_uri,
    })
    .to_string()
}

/// Builds raw cells from string slices.
pub fn cells(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// A registry over a memory store, with the store handle kept for
/// inspection.
pub fn memory_registry(rows: Vec<Vec<String>>) -> (LicenseRegistry, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_rows(rows));
    let clock = LocalClock::from_offset_hours(7).unwrap();
    let registry = LicenseRegistry::new(store.clone(), clock, DEFAULT_ACTIVATION_DAYS);
    (registry, store)
}

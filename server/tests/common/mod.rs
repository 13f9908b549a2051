//! Shared helpers for API tests.

#![allow(dead_code)]

use jsonwebtoken::{DecodingKey, Validation};
use licsrv_server::{build_router, AppState, API_KEY_HEADER};
use licsrv_store::{LicenseRegistry, LocalClock, MemoryStore, DEFAULT_ACTIVATION_DAYS};
use licsrv_token::{
    IssuerConfig, OfflineClaims, SigningKeySource, TokenIssuer, DEFAULT_TOKEN_TTL_DAYS,
    TOKEN_ALGORITHM,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// RSA private key (PKCS#8) used to sign test tokens.
pub const TEST_PRIVATE_KEY: &str = include_str!("../../../testdata/rsa_private.pem");

/// Public half of [`TEST_PRIVATE_KEY`].
pub const TEST_PUBLIC_KEY: &str = include_str!("../../../testdata/rsa_public.pem");

pub const API_KEY: &str = "test-api-key";

/// A running server and a handle on its store.
pub struct TestServer {
    pub base: String,
    pub store: Arc<MemoryStore>,
    pub api_key: Option<String>,
    client: reqwest::Client,
}

/// Knobs for [`spawn_server`].
pub struct ServerOptions {
    pub rows: Vec<Vec<String>>,
    pub api_key: Option<&'static str>,
    pub signing_key: SigningKeySource,
    pub audience: Option<&'static str>,
    pub activation_days: i64,
    pub ttl_days: i64,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            api_key: Some(API_KEY),
            signing_key: SigningKeySource::inline(TEST_PRIVATE_KEY),
            audience: None,
            activation_days: DEFAULT_ACTIVATION_DAYS,
            ttl_days: DEFAULT_TOKEN_TTL_DAYS,
        }
    }
}

/// Spin up the HTTP server on an OS-assigned port.
pub async fn spawn_server(options: ServerOptions) -> TestServer {
    let store = Arc::new(MemoryStore::with_rows(options.rows));
    let clock = LocalClock::from_offset_hours(7).unwrap();
    let registry = LicenseRegistry::new(store.clone(), clock, options.activation_days);
    let issuer = TokenIssuer::new(IssuerConfig {
        ttl_days: options.ttl_days,
        audience: options.audience.map(str::to_string),
        signing_key: options.signing_key,
    });
    let api_key = options.api_key.map(str::to_string);
    let state = Arc::new(AppState::new(registry, issuer, api_key.clone()));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base: format!("http://127.0.0.1:{}", port),
        store,
        api_key,
        client: reqwest::Client::new(),
    }
}

/// Spin up a server with default options.
pub async fn spawn_default() -> TestServer {
    spawn_server(ServerOptions::default()).await
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// POSTs `{"machine_key": key}` with the configured API key.
    pub async fn post_key(&self, path: &str, machine_key: &str) -> reqwest::Response {
        self.post_json(path, json!({ "machine_key": machine_key })).await
    }

    /// POSTs a raw JSON body with the configured API key.
    pub async fn post_json(&self, path: &str, body: Value) -> reqwest::Response {
        let mut request = self.client.post(self.url(path)).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        request.send().await.unwrap()
    }

    /// POSTs without any API key header.
    pub async fn post_anonymous(&self, path: &str, machine_key: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(&json!({ "machine_key": machine_key }))
            .send()
            .await
            .unwrap()
    }
}

/// Builds raw cells from string slices.
pub fn cells(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Verifies a token against the test public key.
pub fn decode_token(token: &str, audience: Option<&str>, validate_exp: bool) -> OfflineClaims {
    let key = DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap();
    let mut validation = Validation::new(TOKEN_ALGORITHM);
    validation.validate_exp = validate_exp;
    validation.required_spec_claims.clear();
    match audience {
        Some(aud) => validation.set_audience(&[aud]),
        None => validation.validate_aud = false,
    }
    jsonwebtoken::decode::<OfflineClaims>(token, &key, &validation)
        .unwrap()
        .claims
}

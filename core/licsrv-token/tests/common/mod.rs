//! Shared test helpers for token tests.

#![allow(dead_code)]

use jsonwebtoken::{DecodingKey, Validation};
use licsrv_token::{IssuerConfig, OfflineClaims, SigningKeySource, TokenIssuer, TOKEN_ALGORITHM};

/// RSA private key (PKCS#8) used to sign test tokens.
pub const TEST_PRIVATE_KEY: &str = include_str!("../../../../testdata/rsa_private.pem");

/// Public half of [`TEST_PRIVATE_KEY`].
pub const TEST_PUBLIC_KEY: &str = include_str!("../../../../testdata/rsa_public.pem");

/// Public key of an unrelated key pair.
pub const OTHER_PUBLIC_KEY: &str = include_str!("../../../../testdata/rsa_other_public.pem");

/// An issuer signing with the test key.
pub fn test_issuer(ttl_days: i64, audience: Option<&str>) -> TokenIssuer {
    TokenIssuer::new(IssuerConfig {
        ttl_days,
        audience: audience.map(str::to_string),
        signing_key: SigningKeySource::inline(TEST_PRIVATE_KEY),
    })
}

/// Verifies a token against a public key and returns its claims.
pub fn decode_with(token: &str, public_pem: &str, audience: Option<&str>) -> jsonwebtoken::errors::Result<OfflineClaims> {
    let key = DecodingKey::from_rsa_pem(public_pem.as_bytes()).unwrap();
    let mut validation = Validation::new(TOKEN_ALGORITHM);
    validation.validate_nbf = true;
    match audience {
        Some(aud) => validation.set_audience(&[aud]),
        None => validation.validate_aud = false,
    }
    jsonwebtoken::decode::<OfflineClaims>(token, &key, &validation).map(|data| data.claims)
}

/// Verifies a token against the test public key.
pub fn decode(token: &str) -> OfflineClaims {
    decode_with(token, TEST_PUBLIC_KEY, None).unwrap()
}

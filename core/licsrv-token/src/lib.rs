//! Offline license tokens.
//!
//! An offline token lets a client prove its license is valid without
//! calling the server. Tokens are compact JWTs signed with RS256 whose
//! claims name the machine and its run count.
//!
//! # Expiry
//!
//! A token never outlives its license: `exp` is the earlier of the license
//! record's stored expiry and `now + ttl_days`.

mod claims;
mod error;
mod issuer;
mod key;

pub use claims::{clamp_expiry, OfflineClaims};
pub use error::{TokenError, TokenResult};
pub use issuer::{IssuerConfig, TokenIssuer, DEFAULT_TOKEN_TTL_DAYS, TOKEN_ALGORITHM};
pub use key::SigningKeySource;

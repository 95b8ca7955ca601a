// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Per-source signature verification. `gateway-server` normalizes request
//! headers into a [`Headers`] map (lower-cased names) and hands the raw body
//! bytes here; nothing in this module knows about HTTP framework types.

mod cloudwatch;
mod github;
mod linear;
mod none;
mod pagerduty;
mod shared_secret;
mod slack;

pub use cloudwatch::{confirm_subscription, CloudwatchVerifier};
pub use github::GithubVerifier;
pub use linear::LinearVerifier;
pub use none::NoneVerifier;
pub use pagerduty::PagerdutyVerifier;
pub use shared_secret::SharedSecretVerifier;
pub use slack::SlackVerifier;

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

/// Lower-cased header name to raw value. Multi-valued headers are not
/// needed by any scheme the gateway verifies.
pub type Headers = HashMap<String, String>;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("missing signature header {0}")]
    MissingHeader(&'static str),
    #[error("signature mismatch")]
    Mismatch,
    #[error("timestamp outside acceptable window")]
    StaleTimestamp,
    #[error("malformed signature header: {0}")]
    Malformed(String),
}

/// A per-source signature scheme. Implementations never log the secret or
/// the computed MAC; only the outcome.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, headers: &Headers, body: &[u8], now: DateTime<Utc>) -> Result<(), SignatureError>;
}

// HMAC accepts a key of any length, so `new_from_slice` is infallible here;
// the `unwrap_or_else` branch is unreachable in practice.
#[allow(clippy::unwrap_used)]
pub(crate) fn hmac_sha256_hex(secret: &str, message: &[u8]) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    type HmacSha256 = Hmac<Sha256>;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| HmacSha256::new_from_slice(&[]).unwrap());
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

pub(crate) fn constant_time_eq(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

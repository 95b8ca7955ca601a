// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

use super::{constant_time_eq, hmac_sha256_hex, Headers, SignatureError, SignatureVerifier};
use chrono::{DateTime, Utc};

/// PagerDuty v3 webhooks sign the raw body with HMAC-SHA256, hex-encoded,
/// in `X-PagerDuty-Signature` as `v1=<hex-hmac>`.
pub struct PagerdutyVerifier {
    secret: String,
}

impl PagerdutyVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }
}

impl SignatureVerifier for PagerdutyVerifier {
    fn verify(&self, headers: &Headers, body: &[u8], _now: DateTime<Utc>) -> Result<(), SignatureError> {
        let header = headers
            .get("x-pagerduty-signature")
            .ok_or(SignatureError::MissingHeader("x-pagerduty-signature"))?;
        let expected = hmac_sha256_hex(&self.secret, body);
        let matched = header
            .split(',')
            .filter_map(|part| part.strip_prefix("v1="))
            .any(|digest| constant_time_eq(digest, &expected));
        if matched {
            Ok(())
        } else {
            Err(SignatureError::Mismatch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_v1_signature() {
        let verifier = PagerdutyVerifier::new("secret");
        let body = br#"{"event":{"event_type":"incident.triggered"}}"#;
        let signature = format!("v1={}", hmac_sha256_hex("secret", body));
        let mut headers = Headers::new();
        headers.insert("x-pagerduty-signature".to_string(), signature);
        assert!(verifier.verify(&headers, body, Utc::now()).is_ok());
    }

    #[test]
    fn rejects_mismatch() {
        let verifier = PagerdutyVerifier::new("secret");
        let mut headers = Headers::new();
        headers.insert("x-pagerduty-signature".to_string(), "v1=bad".to_string());
        assert!(verifier.verify(&headers, b"{}", Utc::now()).is_err());
    }
}

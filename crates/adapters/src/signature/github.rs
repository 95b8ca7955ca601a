// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

use super::{constant_time_eq, hmac_sha256_hex, Headers, SignatureError, SignatureVerifier};
use chrono::{DateTime, Utc};

/// `X-Hub-Signature-256: sha256=<hex-hmac>` over the raw request body.
pub struct GithubVerifier {
    secret: String,
}

impl GithubVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }
}

impl SignatureVerifier for GithubVerifier {
    fn verify(&self, headers: &Headers, body: &[u8], _now: DateTime<Utc>) -> Result<(), SignatureError> {
        let header = headers
            .get("x-hub-signature-256")
            .ok_or(SignatureError::MissingHeader("x-hub-signature-256"))?;
        let hex_digest = header
            .strip_prefix("sha256=")
            .ok_or_else(|| SignatureError::Malformed(header.clone()))?;

        let expected = hmac_sha256_hex(&self.secret, body);
        if constant_time_eq(hex_digest, &expected) {
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
    fn accepts_matching_signature() {
        let verifier = GithubVerifier::new("topsecret");
        let body = br#"{"action":"opened"}"#;
        let signature = format!("sha256={}", hmac_sha256_hex("topsecret", body));
        let mut headers = Headers::new();
        headers.insert("x-hub-signature-256".to_string(), signature);
        assert!(verifier.verify(&headers, body, Utc::now()).is_ok());
    }

    #[test]
    fn rejects_wrong_signature() {
        let verifier = GithubVerifier::new("topsecret");
        let body = br#"{"action":"opened"}"#;
        let mut headers = Headers::new();
        headers.insert("x-hub-signature-256".to_string(), "sha256=deadbeef".to_string());
        assert!(verifier.verify(&headers, body, Utc::now()).is_err());
    }

    #[test]
    fn rejects_missing_header() {
        let verifier = GithubVerifier::new("topsecret");
        assert!(matches!(
            verifier.verify(&Headers::new(), b"{}", Utc::now()),
            Err(SignatureError::MissingHeader(_))
        ));
    }
}

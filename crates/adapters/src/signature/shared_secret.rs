// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

use super::{constant_time_eq, Headers, SignatureError, SignatureVerifier};
use chrono::{DateTime, Utc};

/// Sources that sign by echoing a pre-shared token in a fixed header
/// (Jira's `X-Atlassian-Webhook-Identifier`, SonarQube's `X-Sonar-Webhook-HMAC-SHA256`
/// when configured as a plain token, Shortcut's `Shortcut-Signature`): no
/// derivation, just a constant-time string comparison against the
/// configured secret.
pub struct SharedSecretVerifier {
    header_name: &'static str,
    secret: String,
}

impl SharedSecretVerifier {
    pub fn new(header_name: &'static str, secret: impl Into<String>) -> Self {
        Self { header_name, secret: secret.into() }
    }
}

impl SignatureVerifier for SharedSecretVerifier {
    fn verify(&self, headers: &Headers, _body: &[u8], _now: DateTime<Utc>) -> Result<(), SignatureError> {
        let header = headers
            .get(self.header_name)
            .ok_or(SignatureError::MissingHeader(self.header_name))?;
        if constant_time_eq(header, &self.secret) {
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
    fn accepts_matching_token() {
        let verifier = SharedSecretVerifier::new("x-atlassian-webhook-identifier", "tok-123");
        let mut headers = Headers::new();
        headers.insert("x-atlassian-webhook-identifier".to_string(), "tok-123".to_string());
        assert!(verifier.verify(&headers, b"{}", Utc::now()).is_ok());
    }

    #[test]
    fn rejects_wrong_token() {
        let verifier = SharedSecretVerifier::new("x-atlassian-webhook-identifier", "tok-123");
        let mut headers = Headers::new();
        headers.insert("x-atlassian-webhook-identifier".to_string(), "wrong".to_string());
        assert!(verifier.verify(&headers, b"{}", Utc::now()).is_err());
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

use super::{constant_time_eq, hmac_sha256_hex, Headers, SignatureError, SignatureVerifier};
use chrono::{DateTime, Utc};

/// Linear signs the raw body with HMAC-SHA256, hex-encoded, in
/// `Linear-Signature`.
pub struct LinearVerifier {
    secret: String,
}

impl LinearVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }
}

impl SignatureVerifier for LinearVerifier {
    fn verify(&self, headers: &Headers, body: &[u8], _now: DateTime<Utc>) -> Result<(), SignatureError> {
        let header = headers
            .get("linear-signature")
            .ok_or(SignatureError::MissingHeader("linear-signature"))?;
        let expected = hmac_sha256_hex(&self.secret, body);
        if constant_time_eq(header, &expected) {
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
        let verifier = LinearVerifier::new("secret");
        let body = br#"{"type":"Issue","action":"create"}"#;
        let signature = hmac_sha256_hex("secret", body);
        let mut headers = Headers::new();
        headers.insert("linear-signature".to_string(), signature);
        assert!(verifier.verify(&headers, body, Utc::now()).is_ok());
    }
}

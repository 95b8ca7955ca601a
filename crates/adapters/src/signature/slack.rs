// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

use super::{constant_time_eq, hmac_sha256_hex, Headers, SignatureError, SignatureVerifier};
use chrono::{DateTime, Utc};

/// Slack's signing scheme: `HMAC-SHA256(secret, "v0:" + timestamp + ":" + body)`,
/// header `X-Slack-Signature: v0=<hex>`, rejecting requests whose
/// `X-Slack-Request-Timestamp` is more than `window_seconds` away from now.
pub struct SlackVerifier {
    secret: String,
    window_seconds: i64,
}

impl SlackVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into(), window_seconds: 300 }
    }

    pub fn with_window(secret: impl Into<String>, window_seconds: i64) -> Self {
        Self { secret: secret.into(), window_seconds }
    }
}

impl SignatureVerifier for SlackVerifier {
    fn verify(&self, headers: &Headers, body: &[u8], now: DateTime<Utc>) -> Result<(), SignatureError> {
        let signature = headers
            .get("x-slack-signature")
            .ok_or(SignatureError::MissingHeader("x-slack-signature"))?;
        let timestamp_header = headers
            .get("x-slack-request-timestamp")
            .ok_or(SignatureError::MissingHeader("x-slack-request-timestamp"))?;
        let timestamp: i64 = timestamp_header
            .parse()
            .map_err(|_| SignatureError::Malformed(timestamp_header.clone()))?;

        if (now.timestamp() - timestamp).abs() > self.window_seconds {
            return Err(SignatureError::StaleTimestamp);
        }

        let hex_digest = signature
            .strip_prefix("v0=")
            .ok_or_else(|| SignatureError::Malformed(signature.clone()))?;

        let mut message = format!("v0:{timestamp}:").into_bytes();
        message.extend_from_slice(body);
        let expected = hmac_sha256_hex(&self.secret, &message);

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

    fn sign(secret: &str, timestamp: i64, body: &[u8]) -> String {
        let mut message = format!("v0:{timestamp}:").into_bytes();
        message.extend_from_slice(body);
        format!("v0={}", hmac_sha256_hex(secret, &message))
    }

    #[test]
    fn accepts_fresh_signed_request() {
        let verifier = SlackVerifier::new("secret");
        let now = Utc::now();
        let body = br#"{"type":"event_callback"}"#;
        let signature = sign("secret", now.timestamp(), body);
        let mut headers = Headers::new();
        headers.insert("x-slack-signature".to_string(), signature);
        headers.insert("x-slack-request-timestamp".to_string(), now.timestamp().to_string());
        assert!(verifier.verify(&headers, body, now).is_ok());
    }

    #[test]
    fn rejects_stale_timestamp() {
        let verifier = SlackVerifier::new("secret");
        let now = Utc::now();
        let stale = now - chrono::Duration::seconds(301);
        let body = br#"{"type":"event_callback"}"#;
        let signature = sign("secret", stale.timestamp(), body);
        let mut headers = Headers::new();
        headers.insert("x-slack-signature".to_string(), signature);
        headers.insert("x-slack-request-timestamp".to_string(), stale.timestamp().to_string());
        assert!(matches!(
            verifier.verify(&headers, body, now),
            Err(SignatureError::StaleTimestamp)
        ));
    }

    #[test]
    fn accepts_timestamp_exactly_at_window_edge() {
        let verifier = SlackVerifier::new("secret");
        let now = Utc::now();
        let edge = now - chrono::Duration::seconds(300);
        let body = br#"{"type":"event_callback"}"#;
        let signature = sign("secret", edge.timestamp(), body);
        let mut headers = Headers::new();
        headers.insert("x-slack-signature".to_string(), signature);
        headers.insert("x-slack-request-timestamp".to_string(), edge.timestamp().to_string());
        assert!(verifier.verify(&headers, body, now).is_ok());
    }
}

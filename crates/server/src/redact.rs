// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Scrubs sensitive header values before they reach a log line. Applied to
//! every header map logged by the webhook router and the request-tracing
//! layer; never applied to header values forwarded to signature verifiers,
//! which need the real value.

const REDACTED: &str = "[redacted]";

fn is_sensitive(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower == "authorization"
        || lower == "cookie"
        || lower == "set-cookie"
        || lower == "x-hub-signature-256"
        || lower == "x-slack-signature"
        || lower.contains("secret")
        || lower.contains("token")
}

/// Returns `value` unchanged for an ordinary header, or the redaction
/// placeholder for anything that looks like a credential.
pub fn redact_header<'a>(name: &str, value: &'a str) -> &'a str {
    if is_sensitive(name) {
        REDACTED
    } else {
        value
    }
}

/// Redacts every sensitive entry in a header map in place, returning a fresh
/// map safe to attach to a `tracing` event or persist in a log sink.
pub fn redact_headers(headers: &std::collections::HashMap<String, String>) -> std::collections::HashMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            let redacted = if is_sensitive(name) { REDACTED.to_string() } else { value.clone() };
            (name.clone(), redacted)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_known_sensitive_headers() {
        assert_eq!(redact_header("Authorization", "Bearer abc"), REDACTED);
        assert_eq!(redact_header("X-Hub-Signature-256", "sha256=abc"), REDACTED);
        assert_eq!(redact_header("Cookie", "session=abc"), REDACTED);
    }

    #[test]
    fn redacts_by_substring_match() {
        assert_eq!(redact_header("X-Api-Secret", "s3cr3t"), REDACTED);
        assert_eq!(redact_header("X-Auth-Token", "tok"), REDACTED);
    }

    #[test]
    fn leaves_ordinary_headers_alone() {
        assert_eq!(redact_header("Content-Type", "application/json"), "application/json");
        assert_eq!(redact_header("X-GitHub-Event", "push"), "push");
    }

    #[test]
    fn redact_headers_preserves_non_sensitive_entries() {
        let mut headers = std::collections::HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer abc".to_string());
        headers.insert("X-GitHub-Event".to_string(), "push".to_string());
        let redacted = redact_headers(&headers);
        assert_eq!(redacted.get("Authorization").unwrap(), REDACTED);
        assert_eq!(redacted.get("X-GitHub-Event").unwrap(), "push");
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

use super::{Headers, SignatureError, SignatureVerifier};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// CloudWatch (via SNS) doesn't sign individual notifications the way the
/// other sources do. Trust is established once per topic: a
/// `SubscriptionConfirmation` message must be confirmed by fetching its
/// `SubscribeURL`, after which ordinary `Notification` messages from the
/// same topic ARN are accepted.
///
/// This verifier only checks that the envelope names a trusted topic; it
/// does not itself perform the one-time subscription confirmation fetch —
/// that is a side effect the router drives explicitly (see
/// `gateway-server::routes::webhooks::handle_cloudwatch`) so it runs at
/// most once and is observable in logs.
pub struct CloudwatchVerifier {
    trusted_topic_arns: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SnsEnvelope {
    #[serde(rename = "TopicArn")]
    topic_arn: Option<String>,
}

impl CloudwatchVerifier {
    pub fn new(trusted_topic_arns: Vec<String>) -> Self {
        Self { trusted_topic_arns }
    }
}

impl SignatureVerifier for CloudwatchVerifier {
    fn verify(&self, _headers: &Headers, body: &[u8], _now: DateTime<Utc>) -> Result<(), SignatureError> {
        let envelope: SnsEnvelope = serde_json::from_slice(body)
            .map_err(|err| SignatureError::Malformed(err.to_string()))?;
        let topic_arn = envelope
            .topic_arn
            .ok_or_else(|| SignatureError::Malformed("missing TopicArn".to_string()))?;

        if self.trusted_topic_arns.iter().any(|trusted| trusted == &topic_arn) {
            Ok(())
        } else {
            Err(SignatureError::Mismatch)
        }
    }
}

/// Fetches `subscribe_url` once to complete the SNS handshake. Called by the
/// router when it sees `x-amz-sns-message-type: SubscriptionConfirmation`.
pub async fn confirm_subscription(client: &reqwest::Client, subscribe_url: &str) -> Result<(), reqwest::Error> {
    client.get(subscribe_url).send().await?.error_for_status()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_trusted_topic() {
        let verifier = CloudwatchVerifier::new(vec!["arn:aws:sns:us-east-1:1:alarms".to_string()]);
        let body = br#"{"TopicArn":"arn:aws:sns:us-east-1:1:alarms","Type":"Notification"}"#;
        assert!(verifier.verify(&Headers::new(), body, Utc::now()).is_ok());
    }

    #[test]
    fn rejects_unknown_topic() {
        let verifier = CloudwatchVerifier::new(vec!["arn:aws:sns:us-east-1:1:alarms".to_string()]);
        let body = br#"{"TopicArn":"arn:aws:sns:us-east-1:1:other","Type":"Notification"}"#;
        assert!(verifier.verify(&Headers::new(), body, Utc::now()).is_err());
    }
}

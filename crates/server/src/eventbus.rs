// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Best-effort fan-out of accepted events to a broker subject. Publish
//! failures are logged and counted, never propagated — intake latency must
//! never depend on a downstream consumer keeping up.

use chrono::{DateTime, Utc};
use gateway_core::Source;
use serde::Serialize;
use std::sync::Arc;

/// The payload published on `events.<source>`: a digest, not the raw body,
/// so consumers that only need presence/shape don't need read access to the
/// full event store.
#[derive(Debug, Clone, Serialize)]
pub struct EventNotification {
    pub id: i64,
    pub source: Source,
    pub event_type: String,
    pub received_at: DateTime<Utc>,
    pub payload_digest: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("no subscribers currently attached")]
    NoSubscribers,
}

/// A broker publish path. `gateway-server` ships the in-process broadcast
/// implementation; a NATS-backed implementation would satisfy the same
/// trait for real multi-process fan-out without the router knowing the
/// difference.
pub trait Publisher: Send + Sync {
    fn publish(&self, notification: EventNotification) -> Result<(), PublishError>;
}

/// In-process fan-out over `tokio::sync::broadcast`. Subscribers that lag
/// past the channel capacity miss messages silently, consistent with
/// "best-effort" — nothing here blocks the webhook router.
pub struct BroadcastPublisher {
    sender: tokio::sync::broadcast::Sender<EventNotification>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = tokio::sync::broadcast::channel(capacity);
        Self { sender }
    }

    pub fn shared(capacity: usize) -> Arc<Self> {
        Arc::new(Self::new(capacity))
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EventNotification> {
        self.sender.subscribe()
    }
}

impl Publisher for BroadcastPublisher {
    fn publish(&self, notification: EventNotification) -> Result<(), PublishError> {
        self.sender.send(notification).map(|_| ()).map_err(|_| PublishError::NoSubscribers)
    }
}

pub fn payload_digest(payload: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: i64) -> EventNotification {
        EventNotification {
            id,
            source: Source::Github,
            event_type: "push".to_string(),
            received_at: Utc::now(),
            payload_digest: payload_digest("{}"),
        }
    }

    #[test]
    fn publish_without_subscribers_is_reported_not_panicked() {
        let publisher = BroadcastPublisher::new(8);
        assert!(matches!(publisher.publish(sample(1)), Err(PublishError::NoSubscribers)));
    }

    #[test]
    fn subscriber_receives_published_notification() {
        let publisher = BroadcastPublisher::new(8);
        let mut receiver = publisher.subscribe();
        publisher.publish(sample(42)).unwrap();
        let received = receiver.try_recv().unwrap();
        assert_eq!(received.id, 42);
    }

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(payload_digest("hello"), payload_digest("hello"));
        assert_ne!(payload_digest("hello"), payload_digest("world"));
    }
}

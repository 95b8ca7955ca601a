// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! The normalized, immutable webhook record.

use crate::source::Source;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

crate::define_id! {
    /// Unique identifier for an event record. Distinct from the monotonic
    /// `id` column used for ordering — repositories expose both.
    pub struct EventRecordId("evt_");
}

/// A normalized webhook delivery, persisted exactly once per `delivery_id`.
///
/// Never updated after insert; retention purge is the only thing that
/// removes rows (see `gateway-storage::events::purge_older_than`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Monotonic row id, assigned by the store on insert.
    pub id: i64,
    pub source: Source,
    /// Free string scoped by source, e.g. `"push"`, `"issue.created"`.
    pub event_type: String,
    /// The idempotency key. Globally unique across all sources.
    pub delivery_id: String,
    /// Raw signature header value, if the source sent one.
    pub signature: Option<String>,
    pub headers: HashMap<String, String>,
    pub payload: String,
    pub received_at: DateTime<Utc>,
}

/// Fields needed to insert a new record; `id` is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewEventRecord {
    pub source: Source,
    pub event_type: String,
    pub delivery_id: String,
    pub signature: Option<String>,
    pub headers: HashMap<String, String>,
    pub payload: String,
    pub received_at: DateTime<Utc>,
}

#[cfg(any(test, feature = "test-support"))]
impl NewEventRecord {
    pub fn builder(source: Source, delivery_id: impl Into<String>) -> Self {
        Self {
            source,
            event_type: "unknown".to_string(),
            delivery_id: delivery_id.into(),
            signature: None,
            headers: HashMap::new(),
            payload: "{}".to_string(),
            received_at: Utc::now(),
        }
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = payload.into();
        self
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Webhook intake response shapes. Every `POST /webhooks/:source` returns
//! one of these, regardless of source.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status")]
pub enum WebhookIngestResponse {
    #[serde(rename = "ok")]
    Ok { id: i64 },
    #[serde(rename = "duplicate")]
    Duplicate { id: i64 },
}

/// The url_verification handshake response for chat sources. Not tagged with
/// `status` — it echoes exactly `{"challenge": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct ChallengeResponse {
    pub challenge: String,
}

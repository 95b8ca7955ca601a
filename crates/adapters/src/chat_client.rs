// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Outbound chat side effect (Slack-shaped, but the trait is deliberately
//! thin so a different chat backend can implement it without touching
//! `gateway-engine`).

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("transient chat delivery failure: {0}")]
    Transient(String),
    #[error("chat request rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), ChatError>;
}

/// Posts to a Slack-compatible incoming webhook URL.
pub struct SlackChatClient {
    http: reqwest::Client,
    webhook_url: String,
}

impl SlackChatClient {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, webhook_url: webhook_url.into() }
    }
}

#[async_trait]
impl ChatClient for SlackChatClient {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), ChatError> {
        let body = serde_json::json!({ "channel": channel, "text": text });
        let response = self
            .http
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await
            .map_err(|err| ChatError::Transient(err.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else if response.status().is_client_error() {
            Err(ChatError::Rejected(response.status().to_string()))
        } else {
            Err(ChatError::Transient(response.status().to_string()))
        }
    }
}

/// In-memory client for tests: records every message sent.
#[derive(Default)]
pub struct RecordingChatClient {
    pub sent: parking_lot::Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ChatClient for RecordingChatClient {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), ChatError> {
        self.sent.lock().push((channel.to_string(), text.to_string()));
        Ok(())
    }
}

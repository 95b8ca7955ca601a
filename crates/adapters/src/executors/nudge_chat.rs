// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

use super::{ActionExecutor, ExecutionContext, ExecutorError};
use crate::chat_client::{ChatClient, ChatError};
use crate::quotas::QuotaTracker;
use async_trait::async_trait;
use gateway_core::QuotaKind;
use serde_json::Value;
use std::sync::Arc;

/// Posts a nudge message to a chat channel. Consumes the `slack_posts`
/// daily quota before sending; exceeding the quota is a permanent failure
/// so the runner does not retry it.
pub struct NudgeChatExecutor {
    chat_client: Arc<dyn ChatClient>,
    quotas: Arc<QuotaTracker>,
}

impl NudgeChatExecutor {
    pub fn new(chat_client: Arc<dyn ChatClient>, quotas: Arc<QuotaTracker>) -> Self {
        Self { chat_client, quotas }
    }
}

#[async_trait]
impl ActionExecutor for NudgeChatExecutor {
    async fn execute(&self, context: &ExecutionContext) -> Result<Value, ExecutorError> {
        self.quotas
            .check_and_increment(QuotaKind::SlackPosts)
            .map_err(|err| ExecutorError::Permanent(err.to_string()))?;

        let channel = context
            .payload
            .get("channel")
            .and_then(|v| v.as_str())
            .unwrap_or("#eng-ops");
        let text = context
            .payload
            .get("text")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("heads up on {}", context.subject));

        self.chat_client
            .post_message(channel, &text)
            .await
            .map_err(|err| match err {
                ChatError::Transient(message) => ExecutorError::Transient(message),
                ChatError::Rejected(message) => ExecutorError::Permanent(message),
            })?;

        Ok(serde_json::json!({ "channel": channel }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat_client::RecordingChatClient;
    use std::collections::HashMap;

    #[tokio::test]
    async fn posts_and_consumes_quota() {
        let chat = Arc::new(RecordingChatClient::default());
        let mut caps = HashMap::new();
        caps.insert(QuotaKind::SlackPosts, 1);
        let quotas = Arc::new(QuotaTracker::new(caps));
        let executor = NudgeChatExecutor::new(chat.clone(), quotas.clone());

        let context = ExecutionContext {
            subject: "pr:42".to_string(),
            payload: serde_json::json!({ "channel": "#reviews", "text": "stale PR" }),
        };

        executor.execute(&context).await.unwrap();
        assert_eq!(chat.sent.lock().len(), 1);

        // Second call exceeds the cap of 1 and must fail permanently.
        let second = executor.execute(&context).await;
        assert!(matches!(second, Err(ExecutorError::Permanent(_))));
    }
}

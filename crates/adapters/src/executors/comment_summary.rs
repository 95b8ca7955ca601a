// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

use super::{ActionExecutor, ExecutionContext, ExecutorError};
use crate::vcs_client::{VcsClient, VcsError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Posts a comment on a pull request. `payload` carries `{repo, pr_number, body}`.
pub struct CommentSummaryExecutor {
    vcs_client: Arc<dyn VcsClient>,
}

impl CommentSummaryExecutor {
    pub fn new(vcs_client: Arc<dyn VcsClient>) -> Self {
        Self { vcs_client }
    }
}

#[async_trait]
impl ActionExecutor for CommentSummaryExecutor {
    async fn execute(&self, context: &ExecutionContext) -> Result<Value, ExecutorError> {
        let repo = context
            .payload
            .get("repo")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ExecutorError::Permanent("payload missing repo".to_string()))?;
        let pr_number = context
            .payload
            .get("pr_number")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| ExecutorError::Permanent("payload missing pr_number".to_string()))?;
        let body = context
            .payload
            .get("body")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("automated summary for {}", context.subject));

        self.vcs_client
            .comment(repo, pr_number, &body)
            .await
            .map_err(|err| match err {
                VcsError::Transient(message) => ExecutorError::Transient(message),
                VcsError::Rejected(message) => ExecutorError::Permanent(message),
            })?;

        Ok(serde_json::json!({ "repo": repo, "pr_number": pr_number }))
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

use super::{ActionExecutor, ExecutionContext, ExecutorError};
use crate::vcs_client::{VcsClient, VcsError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Creates an issue in the target tracker. `payload` carries `{repo, title, body}`.
pub struct IssueCreateExecutor {
    vcs_client: Arc<dyn VcsClient>,
}

impl IssueCreateExecutor {
    pub fn new(vcs_client: Arc<dyn VcsClient>) -> Self {
        Self { vcs_client }
    }
}

#[async_trait]
impl ActionExecutor for IssueCreateExecutor {
    async fn execute(&self, context: &ExecutionContext) -> Result<Value, ExecutorError> {
        let repo = context
            .payload
            .get("repo")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ExecutorError::Permanent("payload missing repo".to_string()))?;
        let title = context
            .payload
            .get("title")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("follow-up: {}", context.subject));
        let body = context
            .payload
            .get("body")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        let url = self
            .vcs_client
            .create_issue(repo, &title, body)
            .await
            .map_err(|err| match err {
                VcsError::Transient(message) => ExecutorError::Transient(message),
                VcsError::Rejected(message) => ExecutorError::Permanent(message),
            })?;

        Ok(serde_json::json!({ "repo": repo, "url": url }))
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

use super::{ActionExecutor, ExecutionContext, ExecutorError};
use crate::vcs_client::{VcsClient, VcsError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Applies a label to an issue or pull request. `payload` carries
/// `{repo, issue_number, label}`.
pub struct LabelExecutor {
    vcs_client: Arc<dyn VcsClient>,
}

impl LabelExecutor {
    pub fn new(vcs_client: Arc<dyn VcsClient>) -> Self {
        Self { vcs_client }
    }
}

#[async_trait]
impl ActionExecutor for LabelExecutor {
    async fn execute(&self, context: &ExecutionContext) -> Result<Value, ExecutorError> {
        let repo = context
            .payload
            .get("repo")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ExecutorError::Permanent("payload missing repo".to_string()))?;
        let issue_number = context
            .payload
            .get("issue_number")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| ExecutorError::Permanent("payload missing issue_number".to_string()))?;
        let label = context
            .payload
            .get("label")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ExecutorError::Permanent("payload missing label".to_string()))?;

        self.vcs_client
            .add_label(repo, issue_number, label)
            .await
            .map_err(|err| match err {
                VcsError::Transient(message) => ExecutorError::Transient(message),
                VcsError::Rejected(message) => ExecutorError::Permanent(message),
            })?;

        Ok(serde_json::json!({ "repo": repo, "issue_number": issue_number, "label": label }))
    }
}

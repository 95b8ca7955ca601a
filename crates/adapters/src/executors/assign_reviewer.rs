// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

use super::{ActionExecutor, ExecutionContext, ExecutorError};
use crate::vcs_client::{VcsClient, VcsError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Requests reviewers on a pull request. `payload` carries `{repo, pr_number, reviewers}`.
pub struct AssignReviewerExecutor {
    vcs_client: Arc<dyn VcsClient>,
}

impl AssignReviewerExecutor {
    pub fn new(vcs_client: Arc<dyn VcsClient>) -> Self {
        Self { vcs_client }
    }
}

#[async_trait]
impl ActionExecutor for AssignReviewerExecutor {
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
        let reviewers: Vec<String> = context
            .payload
            .get("reviewers")
            .and_then(|v| v.as_array())
            .map(|values| values.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default();

        if reviewers.is_empty() {
            return Err(ExecutorError::Permanent("no reviewers in payload".to_string()));
        }

        self.vcs_client
            .request_reviewers(repo, pr_number, &reviewers)
            .await
            .map_err(map_vcs_error)?;

        Ok(serde_json::json!({ "repo": repo, "pr_number": pr_number, "reviewers": reviewers }))
    }
}

fn map_vcs_error(err: VcsError) -> ExecutorError {
    match err {
        VcsError::Transient(message) => ExecutorError::Transient(message),
        VcsError::Rejected(message) => ExecutorError::Permanent(message),
    }
}

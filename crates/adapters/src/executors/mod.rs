// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Action executors: stateless adapters keyed by `action`, each with a
//! pure-in-params signature `(payload, context) -> Result<(), ExecutorError>`.
//! Executors never touch the Event Store or Approvals tables — outcomes are
//! reported back to the caller (the Workflow Runner), which logs them.

mod assign_reviewer;
mod comment_summary;
mod issue_create;
mod label;
mod nudge_chat;

pub use assign_reviewer::AssignReviewerExecutor;
pub use comment_summary::CommentSummaryExecutor;
pub use issue_create::IssueCreateExecutor;
pub use label::LabelExecutor;
pub use nudge_chat::NudgeChatExecutor;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("transient: {0}")]
    Transient(String),
    #[error("permanent: {0}")]
    Permanent(String),
}

impl ExecutorError {
    /// Whether the Workflow Runner should retry this failure (subject to
    /// `max_attempts`) or treat it as terminal immediately.
    pub fn is_retriable(&self) -> bool {
        matches!(self, ExecutorError::Transient(_))
    }
}

/// Context available to every executor: the subject the action targets and
/// a free-form payload carried from the triggering signal or approval.
pub struct ExecutionContext {
    pub subject: String,
    pub payload: Value,
}

#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(&self, context: &ExecutionContext) -> Result<Value, ExecutorError>;
}

/// Dispatch table from `action` name to executor, built once at startup.
pub struct ExecutorRegistry {
    executors: HashMap<String, Arc<dyn ActionExecutor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self { executors: HashMap::new() }
    }

    pub fn register(&mut self, action: impl Into<String>, executor: Arc<dyn ActionExecutor>) -> &mut Self {
        self.executors.insert(action.into(), executor);
        self
    }

    pub fn get(&self, action: &str) -> Option<Arc<dyn ActionExecutor>> {
        self.executors.get(action).cloned()
    }
}

impl Default for ExecutorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

use crate::validate::{non_empty, ValidationError};
use chrono::{DateTime, Utc};
use gateway_core::{JobStatus, WorkflowJob};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct RunWorkflowRequest {
    pub rule_kind: String,
    pub subject: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default = "default_payload")]
    pub payload: Value,
}

fn default_payload() -> Value {
    Value::Object(Default::default())
}

impl RunWorkflowRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_empty("rule_kind", &self.rule_kind)?;
        non_empty("subject", &self.subject)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status")]
pub enum RunWorkflowResponse {
    #[serde(rename = "queued")]
    Queued { action_id: String, job_id: String },
    #[serde(rename = "awaiting_approval")]
    AwaitingApproval { action_id: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowJobView {
    pub id: String,
    pub rule_kind: String,
    pub subject: String,
    pub action: String,
    pub status: JobStatus,
    pub attempts: i32,
    pub max_attempts: i32,
    pub last_error: Option<String>,
    pub trace_id: String,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&WorkflowJob> for WorkflowJobView {
    fn from(job: &WorkflowJob) -> Self {
        Self {
            id: job.id.to_string(),
            rule_kind: job.rule_kind.clone(),
            subject: job.subject.clone(),
            action: job.action.clone(),
            status: job.status,
            attempts: job.attempts,
            max_attempts: job.max_attempts,
            last_error: job.last_error.clone(),
            trace_id: job.trace_id.clone(),
            created_at: job.created_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<WorkflowJobView>,
}

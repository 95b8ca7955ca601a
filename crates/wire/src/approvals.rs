// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

use crate::validate::{max_len, non_empty, ValidationError};
use chrono::{DateTime, Utc};
use gateway_core::{Approval, ApprovalStatus, Decision, RiskLevel};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct ProposeApprovalRequest {
    pub subject: String,
    pub action: String,
    pub risk: RiskLevel,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default = "default_payload")]
    pub payload: Value,
}

fn default_payload() -> Value {
    Value::Object(Default::default())
}

impl ProposeApprovalRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_empty("subject", &self.subject)?;
        max_len("subject", &self.subject, 255)?;
        non_empty("action", &self.action)?;
        max_len("action", &self.action, 64)?;
        if let Some(reason) = &self.reason {
            max_len("reason", reason, 1000)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProposeApprovalResponse {
    pub id: String,
    pub status: ApprovalStatus,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub blocked: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
    #[serde(default)]
    pub reason: Option<String>,
}

impl DecisionRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(reason) = &self.reason {
            max_len("reason", reason, 1000)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApprovalView {
    pub id: String,
    pub subject: String,
    pub action: String,
    pub risk_level: RiskLevel,
    pub status: ApprovalStatus,
    pub proposed_payload: Value,
    pub requester: String,
    pub decided_by: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision: Option<Decision>,
    pub reason: Option<String>,
    pub trace_id: String,
    pub created_at: DateTime<Utc>,
    /// Present only on the decision response when a job was enqueued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

impl From<&Approval> for ApprovalView {
    fn from(approval: &Approval) -> Self {
        Self {
            id: approval.id.to_string(),
            subject: approval.subject.clone(),
            action: approval.action.clone(),
            risk_level: approval.risk_level,
            status: approval.status,
            proposed_payload: approval.proposed_payload.clone(),
            requester: approval.requester.clone(),
            decided_by: approval.decided_by.clone(),
            decided_at: approval.decided_at,
            decision: approval.decision,
            reason: approval.reason.clone(),
            trace_id: approval.trace_id.clone(),
            created_at: approval.created_at,
            job_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApprovalListResponse {
    pub approvals: Vec<ApprovalView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_oversized_subject() {
        let request = ProposeApprovalRequest {
            subject: "x".repeat(256),
            action: "nudge".to_string(),
            risk: RiskLevel::Low,
            reason: None,
            payload: default_payload(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn accepts_well_formed_request() {
        let request = ProposeApprovalRequest {
            subject: "pr:456".to_string(),
            action: "block".to_string(),
            risk: RiskLevel::High,
            reason: Some("stale".to_string()),
            payload: default_payload(),
        };
        assert!(request.validate().is_ok());
    }
}

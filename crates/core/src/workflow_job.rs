// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! The durable job record executed by the Workflow Runner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    pub struct WorkflowJobId("wfj_");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

crate::simple_display! {
    JobStatus {
        Queued => "queued",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
    }
}

impl JobStatus {
    /// Whether `self -> next` is a legal edge in the job-status DAG:
    /// `queued -> running -> (completed|failed)`, with `running -> queued`
    /// permitted only as a retry.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
                | (JobStatus::Running, JobStatus::Queued)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowJob {
    pub id: WorkflowJobId,
    pub rule_kind: String,
    pub subject: String,
    pub action: String,
    pub status: JobStatus,
    pub attempts: i32,
    pub max_attempts: i32,
    pub last_error: Option<String>,
    pub payload: Value,
    pub trace_id: String,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl WorkflowJob {
    pub fn can_retry(&self) -> bool {
        self.attempts < self.max_attempts
    }
}

pub const DEFAULT_MAX_ATTEMPTS: i32 = 3;

#[derive(Debug, Clone)]
pub struct NewWorkflowJob {
    pub rule_kind: String,
    pub subject: String,
    pub action: String,
    pub payload: Value,
    pub trace_id: String,
    pub max_attempts: i32,
}

impl NewWorkflowJob {
    pub fn new(
        rule_kind: impl Into<String>,
        subject: impl Into<String>,
        action: impl Into<String>,
        payload: Value,
        trace_id: impl Into<String>,
    ) -> Self {
        Self {
            rule_kind: rule_kind.into(),
            subject: subject.into(),
            action: action.into(),
            payload,
            trace_id: trace_id.into(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_status() -> impl Strategy<Value = JobStatus> {
        prop_oneof![
            Just(JobStatus::Queued),
            Just(JobStatus::Running),
            Just(JobStatus::Completed),
            Just(JobStatus::Failed),
        ]
    }

    #[test]
    fn legal_edges_only() {
        assert!(JobStatus::Queued.can_transition_to(JobStatus::Running));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Completed));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Failed));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Queued));
    }

    #[test]
    fn illegal_edges_rejected() {
        assert!(!JobStatus::Queued.can_transition_to(JobStatus::Completed));
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Running));
        assert!(!JobStatus::Failed.can_transition_to(JobStatus::Queued));
        assert!(!JobStatus::Queued.can_transition_to(JobStatus::Failed));
    }

    #[test]
    fn terminal_states() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }

    proptest! {
        /// §8 invariant 3: a terminal status has no outgoing edges in the
        /// status DAG, for any candidate next status.
        #[test]
        fn terminal_statuses_have_no_outgoing_edges(from in any_status(), to in any_status()) {
            if from.is_terminal() {
                prop_assert!(!from.can_transition_to(to));
            }
        }

        /// No status transitions to itself except nothing — the DAG has no
        /// self-loops at all, queued/running included.
        #[test]
        fn no_self_loops(status in any_status()) {
            prop_assert!(!status.can_transition_to(status));
        }

        #[test]
        fn can_retry_iff_attempts_below_max(attempts in 0i32..10, max_attempts in 0i32..10) {
            let mut job = NewWorkflowJob::new("stale_pr", "pr:1", "nudge", Value::Null, "trace-1");
            job.max_attempts = max_attempts;
            let job = WorkflowJob {
                id: WorkflowJobId::new(),
                rule_kind: job.rule_kind,
                subject: job.subject,
                action: job.action,
                status: JobStatus::Running,
                attempts,
                max_attempts: job.max_attempts,
                last_error: None,
                payload: job.payload,
                trace_id: job.trace_id,
                created_at: Utc::now(),
                started_at: None,
                completed_at: None,
            };
            prop_assert_eq!(job.can_retry(), attempts < max_attempts);
        }
    }
}

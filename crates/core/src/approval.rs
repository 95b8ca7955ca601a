// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! The human-in-the-loop approval record and its one-shot state transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    pub struct ApprovalId("apr_");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

crate::simple_display! {
    RiskLevel {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

/// The decision a human (or policy, for `auto`-mode proposals) made on an
/// approval. A strict subset of [`ApprovalStatus`] — `pending` is not a
/// decision, it's the absence of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Decline,
    Modify,
}

crate::simple_display! {
    Decision {
        Approve => "approve",
        Decline => "decline",
        Modify => "modify",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Declined,
    Expired,
    Modified,
}

crate::simple_display! {
    ApprovalStatus {
        Pending => "pending",
        Approved => "approved",
        Declined => "declined",
        Expired => "expired",
        Modified => "modified",
    }
}

impl From<Decision> for ApprovalStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approve => ApprovalStatus::Approved,
            Decision::Decline => ApprovalStatus::Declined,
            Decision::Modify => ApprovalStatus::Modified,
        }
    }
}

impl ApprovalStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, ApprovalStatus::Pending)
    }

    /// Whether a `queued`/`running` `WorkflowJob` should be enqueued when
    /// this status is reached. Declined and expired approvals never enqueue.
    pub fn enqueues_job(&self) -> bool {
        matches!(self, ApprovalStatus::Approved | ApprovalStatus::Modified)
    }
}

/// A proposed side-effecting action awaiting or resolved by a human decision.
///
/// Invariant enforced by `gateway-storage::approvals`: `status` transitions
/// out of `pending` exactly once, and `decided_at` is `Some` if and only if
/// `status != pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Approval {
    pub id: ApprovalId,
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
    pub ttl_seconds: i64,
    pub trace_id: String,
    pub created_at: DateTime<Utc>,
}

impl Approval {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status.is_pending()
            && now - self.created_at > chrono::Duration::seconds(self.ttl_seconds)
    }
}

#[derive(Debug, Clone)]
pub struct NewApproval {
    pub subject: String,
    pub action: String,
    pub risk_level: RiskLevel,
    pub proposed_payload: Value,
    pub requester: String,
    pub reason: Option<String>,
    pub ttl_seconds: i64,
    pub trace_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decision_maps_to_terminal_status_only() {
        assert_eq!(ApprovalStatus::from(Decision::Approve), ApprovalStatus::Approved);
        assert_eq!(ApprovalStatus::from(Decision::Decline), ApprovalStatus::Declined);
        assert_eq!(ApprovalStatus::from(Decision::Modify), ApprovalStatus::Modified);
    }

    #[test]
    fn only_approved_and_modified_enqueue() {
        assert!(ApprovalStatus::Approved.enqueues_job());
        assert!(ApprovalStatus::Modified.enqueues_job());
        assert!(!ApprovalStatus::Declined.enqueues_job());
        assert!(!ApprovalStatus::Expired.enqueues_job());
        assert!(!ApprovalStatus::Pending.enqueues_job());
    }

    fn sample_approval(status: ApprovalStatus, created_at: DateTime<Utc>, ttl_seconds: i64) -> Approval {
        Approval {
            id: ApprovalId::new(),
            subject: "pr:1".to_string(),
            action: "nudge".to_string(),
            risk_level: RiskLevel::Low,
            status,
            proposed_payload: Value::Null,
            requester: "signal-evaluator".to_string(),
            decided_by: None,
            decided_at: None,
            decision: None,
            reason: None,
            ttl_seconds,
            trace_id: "trace-1".to_string(),
            created_at,
        }
    }

    proptest! {
        /// §8 invariant 2 is about `decided_at`; this is the companion TTL
        /// invariant from §4.6 — expiry is purely a function of elapsed
        /// time vs. `ttl_seconds`, for any elapsed duration and any TTL.
        #[test]
        fn is_expired_matches_elapsed_vs_ttl(elapsed_seconds in 0i64..1_000_000, ttl_seconds in 1i64..1_000_000) {
            let now = Utc::now();
            let created_at = now - chrono::Duration::seconds(elapsed_seconds);
            let approval = sample_approval(ApprovalStatus::Pending, created_at, ttl_seconds);
            prop_assert_eq!(approval.is_expired(now), elapsed_seconds > ttl_seconds);
        }

        /// A decided approval is never "expired" regardless of its age —
        /// expiry only applies while a decision is still outstanding.
        #[test]
        fn decided_approvals_never_expire(elapsed_seconds in 0i64..1_000_000, ttl_seconds in 1i64..1_000_000, status in prop_oneof![
            Just(ApprovalStatus::Approved),
            Just(ApprovalStatus::Declined),
            Just(ApprovalStatus::Modified),
            Just(ApprovalStatus::Expired),
        ]) {
            let created_at = Utc::now() - chrono::Duration::seconds(elapsed_seconds);
            let approval = sample_approval(status, created_at, ttl_seconds);
            prop_assert!(!approval.is_expired(Utc::now()));
        }
    }
}

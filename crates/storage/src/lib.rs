// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gateway-storage: the Postgres-backed repositories, one per aggregate.
//!
//! Every repo takes a `sqlx::PgPool` by value (pools are `Clone` + `Arc`
//! internally) and maps rows onto the `gateway-core` domain types. No
//! handler or background task builds SQL outside this crate.

pub mod action_log;
pub mod approvals;
pub mod error;
pub mod events;
pub mod identity;
pub mod jobs;
pub mod pool;

pub use action_log::ActionLogRepo;
pub use approvals::ApprovalsRepo;
pub use error::{StorageError, Result};
pub use events::{EventStore, InsertOutcome};
pub use identity::IdentityRepo;
pub use jobs::JobsRepo;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gateway_core::{Decision, NewApproval, NewWorkflowJob, RiskLevel};

    #[sqlx::test(migrations = "./migrations")]
    async fn propose_and_decide_is_one_shot(pool: sqlx::PgPool) {
        let repo = ApprovalsRepo::new(pool);
        let approval = repo
            .propose(NewApproval {
                subject: "pr:123".to_string(),
                action: "block_merge".to_string(),
                risk_level: RiskLevel::High,
                proposed_payload: serde_json::json!({}),
                requester: "signal-evaluator".to_string(),
                reason: None,
                ttl_seconds: 3600,
                trace_id: "trace-1".to_string(),
            })
            .await
            .unwrap();

        let decided = repo
            .decide(approval.id.as_str(), Decision::Approve, "alice", None)
            .await
            .unwrap();
        assert!(matches!(decided.status, gateway_core::ApprovalStatus::Approved));

        // A second decision on the same approval must fail: it's no longer pending.
        let second = repo
            .decide(approval.id.as_str(), Decision::Decline, "bob", None)
            .await;
        assert!(second.is_err());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn expire_overdue_only_touches_pending_past_ttl(pool: sqlx::PgPool) {
        let repo = ApprovalsRepo::new(pool);
        let approval = repo
            .propose(NewApproval {
                subject: "pr:1".to_string(),
                action: "nudge".to_string(),
                risk_level: RiskLevel::Low,
                proposed_payload: serde_json::json!({}),
                requester: "signal-evaluator".to_string(),
                reason: None,
                ttl_seconds: -1, // already overdue
                trace_id: "trace-2".to_string(),
            })
            .await
            .unwrap();

        let expired = repo.expire_overdue().await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, approval.id);

        let refetched = repo.get(approval.id.as_str()).await.unwrap();
        assert!(matches!(refetched.status, gateway_core::ApprovalStatus::Expired));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn claim_next_does_not_double_claim(pool: sqlx::PgPool) {
        let repo = JobsRepo::new(pool);
        for i in 0..3 {
            repo.enqueue(NewWorkflowJob::new(
                "stale_pr",
                format!("pr:{i}"),
                "nudge_chat",
                serde_json::json!({}),
                format!("trace-{i}"),
            ))
            .await
            .unwrap();
        }

        let first_batch = repo.claim_next(2, 30).await.unwrap();
        assert_eq!(first_batch.len(), 2);
        for job in &first_batch {
            assert!(matches!(job.status, gateway_core::JobStatus::Running));
        }

        // Only the remaining queued job should be claimable now.
        let second_batch = repo.claim_next(10, 30).await.unwrap();
        assert_eq!(second_batch.len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn fail_requeues_until_max_attempts(pool: sqlx::PgPool) {
        let repo = JobsRepo::new(pool);
        let mut job = repo
            .enqueue(NewWorkflowJob::new(
                "wip_limit_exceeded",
                "user:alice",
                "nudge_chat",
                serde_json::json!({}),
                "trace-3".to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(job.max_attempts, gateway_core::DEFAULT_MAX_ATTEMPTS);

        for attempt in 1..gateway_core::DEFAULT_MAX_ATTEMPTS {
            let claimed = repo.claim_next(1, 30).await.unwrap();
            assert_eq!(claimed.len(), 1);
            job = repo.fail(job.id.as_str(), "transient error").await.unwrap();
            assert_eq!(job.attempts, attempt);
            assert!(matches!(job.status, gateway_core::JobStatus::Queued));
        }

        let claimed = repo.claim_next(1, 30).await.unwrap();
        assert_eq!(claimed.len(), 1);
        job = repo.fail(job.id.as_str(), "final failure").await.unwrap();
        assert!(matches!(job.status, gateway_core::JobStatus::Failed));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn duplicate_delivery_id_returns_existing_row(pool: sqlx::PgPool) {
        let store = EventStore::new(pool);
        let new_record = gateway_core::NewEventRecord::builder(
            gateway_core::Source::Github,
            "delivery-xyz",
        )
        .event_type("push");

        let first = store.insert(new_record.clone()).await.unwrap();
        let first_id = match first {
            InsertOutcome::Inserted(record) => record.id,
            InsertOutcome::Duplicate(_) => panic!("expected first insert to be fresh"),
        };

        let second = store.insert(new_record).await.unwrap();
        match second {
            InsertOutcome::Duplicate(record) => assert_eq!(record.id, first_id),
            InsertOutcome::Inserted(_) => panic!("duplicate delivery_id must not insert twice"),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn purge_older_than_leaves_recent_rows(pool: sqlx::PgPool) {
        let store = EventStore::new(pool);
        store
            .insert(
                gateway_core::NewEventRecord::builder(gateway_core::Source::Slack, "recent-1")
                    .event_type("message"),
            )
            .await
            .unwrap();

        let purged = store.purge_older_than(Utc::now() - chrono::Duration::days(1)).await.unwrap();
        assert_eq!(purged, 0);

        let still_there = store.get_by_delivery_id("recent-1").await.unwrap();
        assert!(still_there.is_some());
    }
}

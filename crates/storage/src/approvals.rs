// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Approval storage: propose, race-safe decide, and soft-delete-filtered
//! reads. The one-shot `pending -> terminal` transition is enforced by the
//! `WHERE status = 'pending'` clause in [`ApprovalsRepo::decide`] — only one
//! concurrent decision can ever match and return a row.

use chrono::Utc;
use gateway_core::{Approval, ApprovalStatus, Decision, NewApproval, RiskLevel};
use sqlx::PgPool;

use crate::error::{Result, StorageError};

#[derive(Debug, Clone, sqlx::FromRow)]
struct ApprovalRow {
    id: String,
    subject: String,
    action: String,
    risk_level: String,
    status: String,
    proposed_payload: sqlx::types::Json<serde_json::Value>,
    requester: String,
    decided_by: Option<String>,
    decided_at: Option<chrono::DateTime<Utc>>,
    decision: Option<String>,
    reason: Option<String>,
    ttl_seconds: i64,
    trace_id: String,
    created_at: chrono::DateTime<Utc>,
}

impl ApprovalRow {
    fn into_domain(self) -> Approval {
        Approval {
            id: gateway_core::approval::ApprovalId::from_string(self.id),
            subject: self.subject,
            action: self.action,
            risk_level: parse_risk(&self.risk_level),
            status: parse_status(&self.status),
            proposed_payload: self.proposed_payload.0,
            requester: self.requester,
            decided_by: self.decided_by,
            decided_at: self.decided_at,
            decision: self.decision.as_deref().and_then(parse_decision),
            reason: self.reason,
            ttl_seconds: self.ttl_seconds,
            trace_id: self.trace_id,
            created_at: self.created_at,
        }
    }
}

fn parse_risk(s: &str) -> RiskLevel {
    match s {
        "low" => RiskLevel::Low,
        "medium" => RiskLevel::Medium,
        "high" => RiskLevel::High,
        other => unreachable!("invalid risk_level persisted: {other}"),
    }
}

fn parse_status(s: &str) -> ApprovalStatus {
    match s {
        "pending" => ApprovalStatus::Pending,
        "approved" => ApprovalStatus::Approved,
        "declined" => ApprovalStatus::Declined,
        "expired" => ApprovalStatus::Expired,
        "modified" => ApprovalStatus::Modified,
        other => unreachable!("invalid status persisted: {other}"),
    }
}

fn parse_decision(s: &str) -> Option<Decision> {
    match s {
        "approve" => Some(Decision::Approve),
        "decline" => Some(Decision::Decline),
        "modify" => Some(Decision::Modify),
        _ => None,
    }
}

const SELECT_COLUMNS: &str = r#"
    id, subject, action, risk_level, status, proposed_payload, requester,
    decided_by, decided_at, decision, reason, ttl_seconds, trace_id, created_at
"#;

pub struct ApprovalsRepo {
    pool: PgPool,
}

impl ApprovalsRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn propose(&self, new_approval: NewApproval) -> Result<Approval> {
        let id = gateway_core::approval::ApprovalId::new();
        let query = format!(
            r#"
            INSERT INTO approvals (id, subject, action, risk_level, status, proposed_payload, requester, reason, ttl_seconds, trace_id)
            VALUES ($1, $2, $3, $4, 'pending', $5, $6, $7, $8, $9)
            RETURNING {SELECT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ApprovalRow>(&query)
            .bind(id.as_str())
            .bind(&new_approval.subject)
            .bind(&new_approval.action)
            .bind(new_approval.risk_level.to_string())
            .bind(sqlx::types::Json(&new_approval.proposed_payload))
            .bind(&new_approval.requester)
            .bind(&new_approval.reason)
            .bind(new_approval.ttl_seconds)
            .bind(&new_approval.trace_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into_domain())
    }

    pub async fn get(&self, id: &str) -> Result<Approval> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM approvals WHERE id = $1 AND deleted_at IS NULL"
        );
        let row = sqlx::query_as::<_, ApprovalRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(row.into_domain())
    }

    pub async fn list_pending(&self) -> Result<Vec<Approval>> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM approvals WHERE status = 'pending' AND deleted_at IS NULL ORDER BY created_at"
        );
        let rows = sqlx::query_as::<_, ApprovalRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ApprovalRow::into_domain).collect())
    }

    /// Finds an existing pending approval for the same subject/action, used
    /// to reject duplicate proposals while one is still outstanding.
    pub async fn find_pending_duplicate(
        &self,
        subject: &str,
        action: &str,
    ) -> Result<Option<Approval>> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM approvals WHERE subject = $1 AND action = $2 AND status = 'pending' AND deleted_at IS NULL LIMIT 1"
        );
        let row = sqlx::query_as::<_, ApprovalRow>(&query)
            .bind(subject)
            .bind(action)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ApprovalRow::into_domain))
    }

    /// Applies a human decision. Only matches a row that is still `pending`
    /// and not soft-deleted, so two concurrent decisions on the same
    /// approval race on this `UPDATE` and exactly one wins.
    pub async fn decide(
        &self,
        id: &str,
        decision: Decision,
        decided_by: &str,
        reason: Option<&str>,
    ) -> Result<Approval> {
        let status: ApprovalStatus = decision.into();
        let query = format!(
            r#"
            UPDATE approvals
            SET status = $2, decision = $3, decided_by = $4, decided_at = now(), reason = COALESCE($5, reason)
            WHERE id = $1 AND status = 'pending' AND deleted_at IS NULL
            RETURNING {SELECT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ApprovalRow>(&query)
            .bind(id)
            .bind(status.to_string())
            .bind(decision.to_string())
            .bind(decided_by)
            .bind(reason)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row.into_domain()),
            None => {
                // Either the id doesn't exist, it's soft-deleted, or it was
                // already decided (possibly by a concurrent request).
                match self.get(id).await {
                    Ok(existing) => Err(StorageError::Conflict(format!(
                        "approval {id} is already {}",
                        existing.status
                    ))),
                    Err(_) => Err(StorageError::NotFound),
                }
            }
        }
    }

    /// Marks every pending approval past its TTL as expired, returning the
    /// expired rows. Called by the reaper task on a fixed interval.
    pub async fn expire_overdue(&self) -> Result<Vec<Approval>> {
        let query = format!(
            r#"
            UPDATE approvals
            SET status = 'expired', decided_at = now()
            WHERE status = 'pending'
              AND deleted_at IS NULL
              AND created_at + (ttl_seconds || ' seconds')::INTERVAL < now()
            RETURNING {SELECT_COLUMNS}
            "#
        );
        let rows = sqlx::query_as::<_, ApprovalRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ApprovalRow::into_domain).collect())
    }

    pub async fn soft_delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE approvals SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

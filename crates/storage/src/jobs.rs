// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Workflow job storage: enqueue, atomic claim via `FOR UPDATE SKIP LOCKED`,
//! and the terminal transitions the Workflow Runner drives jobs through.

use chrono::{DateTime, Utc};
use gateway_core::{workflow_job::WorkflowJobId, JobStatus, NewWorkflowJob, WorkflowJob};
use sqlx::PgPool;

use crate::error::{Result, StorageError};

#[derive(Debug, Clone, sqlx::FromRow)]
struct WorkflowJobRow {
    id: String,
    rule_kind: String,
    subject: String,
    action: String,
    status: String,
    attempts: i32,
    max_attempts: i32,
    last_error: Option<String>,
    payload: sqlx::types::Json<serde_json::Value>,
    trace_id: String,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl WorkflowJobRow {
    fn into_domain(self) -> WorkflowJob {
        WorkflowJob {
            id: WorkflowJobId::from_string(self.id),
            rule_kind: self.rule_kind,
            subject: self.subject,
            action: self.action,
            status: parse_status(&self.status),
            attempts: self.attempts,
            max_attempts: self.max_attempts,
            last_error: self.last_error,
            payload: self.payload.0,
            trace_id: self.trace_id,
            created_at: self.created_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
        }
    }
}

fn parse_status(s: &str) -> JobStatus {
    match s {
        "queued" => JobStatus::Queued,
        "running" => JobStatus::Running,
        "completed" => JobStatus::Completed,
        "failed" => JobStatus::Failed,
        other => unreachable!("invalid job status persisted: {other}"),
    }
}

const SELECT_COLUMNS: &str = r#"
    id, rule_kind, subject, action, status, attempts, max_attempts, last_error,
    payload, trace_id, created_at, started_at, completed_at
"#;

pub struct JobsRepo {
    pool: PgPool,
}

impl JobsRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn enqueue(&self, new_job: NewWorkflowJob) -> Result<WorkflowJob> {
        let id = WorkflowJobId::new();
        let query = format!(
            r#"
            INSERT INTO workflow_jobs (id, rule_kind, subject, action, status, max_attempts, payload, trace_id)
            VALUES ($1, $2, $3, $4, 'queued', $5, $6, $7)
            RETURNING {SELECT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, WorkflowJobRow>(&query)
            .bind(id.as_str())
            .bind(&new_job.rule_kind)
            .bind(&new_job.subject)
            .bind(&new_job.action)
            .bind(new_job.max_attempts)
            .bind(sqlx::types::Json(&new_job.payload))
            .bind(&new_job.trace_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into_domain())
    }

    pub async fn get(&self, id: &str) -> Result<WorkflowJob> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM workflow_jobs WHERE id = $1 AND deleted_at IS NULL"
        );
        let row = sqlx::query_as::<_, WorkflowJobRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(row.into_domain())
    }

    pub async fn list_for_subject(&self, subject: &str) -> Result<Vec<WorkflowJob>> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM workflow_jobs WHERE subject = $1 AND deleted_at IS NULL ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, WorkflowJobRow>(&query)
            .bind(subject)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(WorkflowJobRow::into_domain).collect())
    }

    pub async fn list_recent(&self, limit: i64) -> Result<Vec<WorkflowJob>> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM workflow_jobs WHERE deleted_at IS NULL ORDER BY created_at DESC LIMIT $1"
        );
        let rows = sqlx::query_as::<_, WorkflowJobRow>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(WorkflowJobRow::into_domain).collect())
    }

    /// Claims up to `limit` queued jobs (plus any `running` job whose lease
    /// has expired, recovering from a crashed runner) and marks them
    /// `running` with a fresh lease, all in one statement so two runner
    /// instances never claim the same row.
    pub async fn claim_next(
        &self,
        limit: i64,
        lease_seconds: i64,
    ) -> Result<Vec<WorkflowJob>> {
        let query = format!(
            r#"
            WITH next_jobs AS (
                SELECT id
                FROM workflow_jobs
                WHERE deleted_at IS NULL
                  AND (
                        status = 'queued'
                        OR (status = 'running' AND lease_expires_at < now())
                      )
                ORDER BY created_at
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE workflow_jobs
            SET status = 'running',
                started_at = COALESCE(started_at, now()),
                lease_expires_at = now() + ($2 || ' seconds')::INTERVAL
            WHERE id IN (SELECT id FROM next_jobs)
            RETURNING {SELECT_COLUMNS}
            "#
        );
        let rows = sqlx::query_as::<_, WorkflowJobRow>(&query)
            .bind(limit)
            .bind(lease_seconds)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(WorkflowJobRow::into_domain).collect())
    }

    pub async fn complete(&self, id: &str) -> Result<WorkflowJob> {
        let query = format!(
            r#"
            UPDATE workflow_jobs
            SET status = 'completed', completed_at = now()
            WHERE id = $1 AND status = 'running' AND deleted_at IS NULL
            RETURNING {SELECT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, WorkflowJobRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(row.into_domain())
    }

    /// Fails the current attempt. If the job still has attempts remaining it
    /// goes back to `queued` for the runner's backoff retry; otherwise it
    /// lands `failed`, terminal.
    pub async fn fail(&self, id: &str, error: &str) -> Result<WorkflowJob> {
        let query = format!(
            r#"
            UPDATE workflow_jobs
            SET attempts = attempts + 1,
                last_error = $2,
                status = CASE WHEN attempts + 1 < max_attempts THEN 'queued' ELSE 'failed' END,
                completed_at = CASE WHEN attempts + 1 < max_attempts THEN completed_at ELSE now() END,
                lease_expires_at = NULL
            WHERE id = $1 AND status = 'running' AND deleted_at IS NULL
            RETURNING {SELECT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, WorkflowJobRow>(&query)
            .bind(id)
            .bind(error)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(row.into_domain())
    }

    pub async fn soft_delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE workflow_jobs SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
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

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! The Workflow Runner: claims queued jobs, dispatches them to the
//! registered Action Executor, and drives the retry/backoff state machine
//! until a job lands `completed` or `failed`.
//!
//! Per-subject ordering is not guaranteed by default — two jobs for the
//! same subject may run on different runner instances concurrently. Setting
//! `serialize_by_subject` makes a single runner instance claim and hold an
//! advisory lock keyed by `hash(subject)` for the duration of the dispatch,
//! which is sufficient to serialize claims within one instance but not
//! across a multi-instance deployment; that limit is intentional, not an
//! oversight (see design notes).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use gateway_adapters::executors::{ExecutionContext, ExecutorRegistry};
use gateway_core::{ActionOutcome, NewActionLogEntry, WorkflowJob};
use gateway_storage::{ActionLogRepo, JobsRepo};
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use tokio_util::sync::CancellationToken;

const DEFAULT_LEASE_SECONDS: i64 = 60;
const DEFAULT_CLAIM_BATCH: i64 = 10;
const DEFAULT_BASE_BACKOFF: Duration = Duration::from_secs(1);

pub struct WorkflowRunnerConfig {
    pub poll_interval: Duration,
    pub max_backoff: Duration,
    pub serialize_by_subject: bool,
    pub actor: String,
}

pub struct WorkflowRunner {
    jobs: Arc<JobsRepo>,
    action_log: Arc<ActionLogRepo>,
    executors: Arc<ExecutorRegistry>,
    advisory_lock_pool: Option<PgPool>,
    config: WorkflowRunnerConfig,
}

impl WorkflowRunner {
    pub fn new(
        jobs: Arc<JobsRepo>,
        action_log: Arc<ActionLogRepo>,
        executors: Arc<ExecutorRegistry>,
        advisory_lock_pool: Option<PgPool>,
        config: WorkflowRunnerConfig,
    ) -> Self {
        Self { jobs, action_log, executors, advisory_lock_pool, config }
    }

    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.poll_interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("workflow runner shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        if let Err(err) = self.run_once().await {
                            tracing::warn!(error = %err, "workflow runner claim cycle failed");
                        }
                    }
                }
            }
        })
    }

    async fn run_once(&self) -> Result<(), gateway_storage::error::StorageError> {
        let claimed = self.jobs.claim_next(DEFAULT_CLAIM_BATCH, DEFAULT_LEASE_SECONDS).await?;
        for job in claimed {
            // A failure dispatching one job must never stop the loop from
            // picking up the rest of the batch.
            if let Err(err) = self.dispatch(job).await {
                tracing::warn!(error = %err, "failed to process claimed job");
            }
        }
        Ok(())
    }

    async fn dispatch(&self, job: WorkflowJob) -> Result<(), gateway_storage::error::StorageError> {
        let lock_key = self.config.serialize_by_subject.then(|| subject_lock_key(&job.subject));
        let _guard = match (self.advisory_lock_pool.as_ref(), lock_key) {
            (Some(pool), Some(key)) => Some(AdvisoryLock::acquire(pool, key).await),
            _ => None,
        };

        let context = ExecutionContext { subject: job.subject.clone(), payload: job.payload.clone() };

        let outcome = match self.executors.get(&job.action) {
            Some(executor) => executor.execute(&context).await,
            None => Err(gateway_adapters::executors::ExecutorError::Permanent(format!(
                "no executor registered for action {}",
                job.action
            ))),
        };

        match outcome {
            Ok(result) => {
                self.jobs.complete(job.id.as_str()).await?;
                self.log_outcome(&job, ActionOutcome::Executed, result.to_string()).await;
            }
            Err(err) => {
                let retriable = err.is_retriable() && job.can_retry();
                if retriable {
                    self.backoff_before_retry(job.attempts).await;
                }
                let updated = self.jobs.fail(job.id.as_str(), &err.to_string()).await?;
                if updated.status.is_terminal() {
                    self.log_outcome(&job, ActionOutcome::Failed, err.to_string()).await;
                }
            }
        }
        Ok(())
    }

    /// Logs the outcome without letting a logging failure fail the job
    /// processing itself — audit writes never block the primary operation.
    async fn log_outcome(&self, job: &WorkflowJob, outcome: ActionOutcome, detail: String) {
        let result = self
            .action_log
            .append(NewActionLogEntry {
                rule_name: job.rule_kind.clone(),
                subject: job.subject.clone(),
                action: job.action.clone(),
                outcome,
                actor: self.config.actor.clone(),
                trace_id: job.trace_id.clone(),
                payload: serde_json::json!({ "detail": detail }),
            })
            .await;
        if let Err(err) = result {
            tracing::warn!(error = %err, job_id = %job.id.as_str(), "failed to append action log entry");
        }
    }

    async fn backoff_before_retry(&self, attempts: i32) {
        let exponent = attempts.max(0) as u32;
        let backoff = DEFAULT_BASE_BACKOFF.saturating_mul(1u32 << exponent.min(16)).min(self.config.max_backoff);
        tokio::time::sleep(backoff).await;
    }
}

fn subject_lock_key(subject: &str) -> i64 {
    let mut hasher = DefaultHasher::new();
    subject.hash(&mut hasher);
    hasher.finish() as i64
}

/// Holds a Postgres session-level advisory lock for the lifetime of the
/// guard. Advisory locks are scoped to the session that took them, so the
/// same connection must be held (not just borrowed from the pool per-query)
/// for lock and unlock to talk to the same Postgres backend; `acquire` pins
/// one connection out of the pool for exactly that reason. `pg_advisory_unlock`
/// is best-effort on drop; a connection loss releases the lock automatically
/// at the session level regardless.
struct AdvisoryLock {
    conn: Option<PoolConnection<Postgres>>,
    key: i64,
}

impl AdvisoryLock {
    async fn acquire(pool: &PgPool, key: i64) -> AdvisoryLock {
        match pool.acquire().await {
            Ok(mut conn) => {
                if let Err(err) = sqlx::query("SELECT pg_advisory_lock($1)").bind(key).execute(&mut *conn).await {
                    tracing::warn!(error = %err, key, "failed to acquire advisory lock, proceeding unserialized");
                }
                AdvisoryLock { conn: Some(conn), key }
            }
            Err(err) => {
                tracing::warn!(error = %err, key, "failed to check out a connection for advisory lock, proceeding unserialized");
                AdvisoryLock { conn: None, key }
            }
        }
    }
}

impl Drop for AdvisoryLock {
    fn drop(&mut self) {
        let Some(mut conn) = self.conn.take() else { return };
        let key = self.key;
        tokio::spawn(async move {
            if let Err(err) = sqlx::query("SELECT pg_advisory_unlock($1)").bind(key).execute(&mut *conn).await {
                tracing::warn!(error = %err, key, "failed to release advisory lock");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_lock_key_is_stable() {
        assert_eq!(subject_lock_key("pr:123"), subject_lock_key("pr:123"));
    }

    #[test]
    fn backoff_exponent_is_bounded() {
        let exponent: u32 = 30u32.min(16);
        assert_eq!(exponent, 16);
    }
}

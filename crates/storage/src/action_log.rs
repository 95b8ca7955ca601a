// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Append-only audit trail. Never updated or deleted; the Signal Evaluator's
//! dedup lookback and operator audit views both just query it.

use chrono::{DateTime, Utc};
use gateway_core::{action_log::ActionLogEntryId, ActionLogEntry, ActionOutcome, NewActionLogEntry};
use sqlx::PgPool;

use crate::error::Result;

#[derive(Debug, Clone, sqlx::FromRow)]
struct ActionLogRow {
    id: String,
    rule_name: String,
    subject: String,
    action: String,
    outcome: String,
    actor: String,
    trace_id: String,
    payload: sqlx::types::Json<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl ActionLogRow {
    fn into_domain(self) -> ActionLogEntry {
        ActionLogEntry {
            id: ActionLogEntryId::from_string(self.id),
            rule_name: self.rule_name,
            subject: self.subject,
            action: self.action,
            outcome: parse_outcome(&self.outcome),
            actor: self.actor,
            trace_id: self.trace_id,
            payload: self.payload.0,
            created_at: self.created_at,
        }
    }
}

fn parse_outcome(s: &str) -> ActionOutcome {
    match s {
        "proposed" => ActionOutcome::Proposed,
        "approved" => ActionOutcome::Approved,
        "declined" => ActionOutcome::Declined,
        "executed" => ActionOutcome::Executed,
        "failed" => ActionOutcome::Failed,
        other => unreachable!("invalid action outcome persisted: {other}"),
    }
}

pub struct ActionLogRepo {
    pool: PgPool,
}

impl ActionLogRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn append(&self, entry: NewActionLogEntry) -> Result<ActionLogEntry> {
        let id = ActionLogEntryId::new();
        let row = sqlx::query_as::<_, ActionLogRow>(
            r#"
            INSERT INTO action_log (id, rule_name, subject, action, outcome, actor, trace_id, payload)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, rule_name, subject, action, outcome, actor, trace_id, payload, created_at
            "#,
        )
        .bind(id.as_str())
        .bind(&entry.rule_name)
        .bind(&entry.subject)
        .bind(&entry.action)
        .bind(entry.outcome.to_string())
        .bind(&entry.actor)
        .bind(&entry.trace_id)
        .bind(sqlx::types::Json(&entry.payload))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_domain())
    }

    /// Whether `rule_name` has already produced an `executed` entry for
    /// `subject` within `lookback`, used to suppress duplicate signal-driven
    /// workflow runs on repeated webhook deliveries for the same subject.
    pub async fn has_fired_within(
        &self,
        rule_name: &str,
        subject: &str,
        since: DateTime<Utc>,
    ) -> Result<bool> {
        let row: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM action_log
                WHERE rule_name = $1 AND subject = $2 AND outcome = 'executed' AND created_at >= $3
            )
            "#,
        )
        .bind(rule_name)
        .bind(subject)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    pub async fn list_for_subject(&self, subject: &str) -> Result<Vec<ActionLogEntry>> {
        let rows = sqlx::query_as::<_, ActionLogRow>(
            r#"
            SELECT id, rule_name, subject, action, outcome, actor, trace_id, payload, created_at
            FROM action_log
            WHERE subject = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(subject)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ActionLogRow::into_domain).collect())
    }
}

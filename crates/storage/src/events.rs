// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Event record storage: insert-with-dedup on `delivery_id`, and the
//! retention purge that is the only thing that ever removes a row.

use chrono::{DateTime, Utc};
use gateway_core::{EventRecord, NewEventRecord, Source};
use sqlx::PgPool;
use std::str::FromStr;

use crate::error::Result;

#[derive(Debug, Clone, sqlx::FromRow)]
struct EventRecordRow {
    id: i64,
    source: String,
    event_type: String,
    delivery_id: String,
    signature: Option<String>,
    headers: sqlx::types::Json<std::collections::HashMap<String, String>>,
    payload: String,
    received_at: DateTime<Utc>,
}

impl EventRecordRow {
    fn into_domain(self) -> EventRecord {
        EventRecord {
            id: self.id,
            source: Source::from_str(&self.source).unwrap_or(Source::SelfSource),
            event_type: self.event_type,
            delivery_id: self.delivery_id,
            signature: self.signature,
            headers: self.headers.0,
            payload: self.payload,
            received_at: self.received_at,
        }
    }
}

/// Outcome of [`insert`]: whether a fresh row was created or a prior delivery
/// with the same `delivery_id` was returned unchanged.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    Inserted(EventRecord),
    Duplicate(EventRecord),
}

pub struct EventStore {
    pool: PgPool,
}

impl EventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts the record, or returns the existing row for this
    /// `delivery_id` untouched. The uniqueness check happens in the database
    /// so this is safe under concurrent deliveries of the same event.
    pub async fn insert(&self, new_record: NewEventRecord) -> Result<InsertOutcome> {
        let inserted = sqlx::query_as::<_, EventRecordRow>(
            r#"
            INSERT INTO event_records (source, event_type, delivery_id, signature, headers, payload, received_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (delivery_id) DO NOTHING
            RETURNING id, source, event_type, delivery_id, signature, headers, payload, received_at
            "#,
        )
        .bind(new_record.source.as_str())
        .bind(&new_record.event_type)
        .bind(&new_record.delivery_id)
        .bind(&new_record.signature)
        .bind(sqlx::types::Json(&new_record.headers))
        .bind(&new_record.payload)
        .bind(new_record.received_at)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(row) => Ok(InsertOutcome::Inserted(row.into_domain())),
            None => {
                let existing = sqlx::query_as::<_, EventRecordRow>(
                    r#"
                    SELECT id, source, event_type, delivery_id, signature, headers, payload, received_at
                    FROM event_records
                    WHERE delivery_id = $1
                    "#,
                )
                .bind(&new_record.delivery_id)
                .fetch_one(&self.pool)
                .await?;
                Ok(InsertOutcome::Duplicate(existing.into_domain()))
            }
        }
    }

    /// Deletes rows older than `cutoff`, returning the number purged.
    /// Unlike `approvals`/`workflow_jobs`, event records have no soft delete
    /// — retention is the only thing that ever removes them, and once gone
    /// the row is gone.
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM event_records WHERE received_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Fetches every record received at or after `since`, oldest first. The
    /// Signal Evaluator uses this as the raw feed it derives rule matches
    /// from; there is no materialized view, so each cycle re-scans the
    /// window.
    pub async fn list_since(&self, since: DateTime<Utc>) -> Result<Vec<EventRecord>> {
        let rows = sqlx::query_as::<_, EventRecordRow>(
            r#"
            SELECT id, source, event_type, delivery_id, signature, headers, payload, received_at
            FROM event_records
            WHERE received_at >= $1
            ORDER BY received_at
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(EventRecordRow::into_domain).collect())
    }

    pub async fn get_by_delivery_id(&self, delivery_id: &str) -> Result<Option<EventRecord>> {
        let row = sqlx::query_as::<_, EventRecordRow>(
            r#"
            SELECT id, source, event_type, delivery_id, signature, headers, payload, received_at
            FROM event_records
            WHERE delivery_id = $1
            "#,
        )
        .bind(delivery_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(EventRecordRow::into_domain))
    }
}

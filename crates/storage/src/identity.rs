// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! External-account to internal-user mapping.

use gateway_core::Identity;
use sqlx::PgPool;

use crate::error::Result;

#[derive(Debug, Clone, sqlx::FromRow)]
struct IdentityRow {
    external_type: String,
    external_id: String,
    user_id: String,
    metadata: sqlx::types::Json<serde_json::Value>,
}

impl IdentityRow {
    fn into_domain(self) -> Identity {
        Identity {
            external_type: self.external_type,
            external_id: self.external_id,
            user_id: self.user_id,
            metadata: self.metadata.0,
        }
    }
}

pub struct IdentityRepo {
    pool: PgPool,
}

impl IdentityRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, identity: &Identity) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO identities (external_type, external_id, user_id, metadata)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (external_type, external_id)
            DO UPDATE SET user_id = EXCLUDED.user_id, metadata = EXCLUDED.metadata
            "#,
        )
        .bind(&identity.external_type)
        .bind(&identity.external_id)
        .bind(&identity.user_id)
        .bind(sqlx::types::Json(&identity.metadata))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn resolve(&self, external_type: &str, external_id: &str) -> Result<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT external_type, external_id, user_id, metadata
            FROM identities
            WHERE external_type = $1 AND external_id = $2
            "#,
        )
        .bind(external_type)
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(IdentityRow::into_domain))
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Pool construction and embedded migrations.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::error::Result;

/// Opens a connection pool and runs any pending migrations. Called once at
/// startup by `gateway-server`'s `main` and by `gatewayctl migrate`.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await?;
    Ok(pool)
}

pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

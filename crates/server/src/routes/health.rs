// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! `GET /health` and `GET /ready`. Both probe the database with a trivial
//! round trip rather than trusting the pool's idle-connection count, since
//! a pool can hold stale connections to a database that has since wedged.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::time::Instant;

use crate::context::AppContext;

#[derive(Debug, Serialize)]
pub struct DbHealth {
    ok: bool,
    details: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    db: DbHealth,
}

async fn probe_db(ctx: &AppContext) -> DbHealth {
    match sqlx::query("SELECT 1").execute(&ctx.pool).await {
        Ok(_) => DbHealth { ok: true, details: "reachable".to_string() },
        Err(err) => DbHealth { ok: false, details: err.to_string() },
    }
}

pub async fn health(State(ctx): State<AppContext>) -> (StatusCode, Json<HealthResponse>) {
    let db = probe_db(&ctx).await;
    let status = if db.ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let body = HealthResponse { status: if db.ok { "ok" } else { "degraded" }, db };
    (status, Json(body))
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    ready: bool,
    db_roundtrip_ms: u64,
}

pub async fn ready(State(ctx): State<AppContext>) -> (StatusCode, Json<ReadyResponse>) {
    let started = Instant::now();
    let ok = sqlx::query("SELECT 1").execute(&ctx.pool).await.is_ok();
    let elapsed = started.elapsed().as_millis() as u64;
    let status = if ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(ReadyResponse { ready: ok, db_roundtrip_ms: elapsed }))
}

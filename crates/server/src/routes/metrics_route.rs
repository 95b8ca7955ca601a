// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! `GET /metrics` — Prometheus text exposition, rendered by
//! `crate::metrics::Metrics`.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::context::AppContext;

pub async fn metrics(State(ctx): State<AppContext>) -> impl IntoResponse {
    let body = ctx.metrics.render();
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

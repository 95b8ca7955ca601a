// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Route registration. Handlers are plain async functions over
//! `State<AppContext>` plus request extractors — the "explicit router
//! registration... handlers are plain functions over request/response plus
//! context" replacement for decorator-driven routing (§9).

pub mod approvals;
pub mod dora;
pub mod health;
pub mod metrics_route;
pub mod policy;
pub mod quotas;
pub mod signals;
pub mod webhooks;
pub mod workflows;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::context::AppContext;

/// Builds the full router. Health, readiness, and metrics are registered
/// on their own un-layered sub-router so they stay reachable even when the
/// rate limiter or body-size guard would otherwise reject the caller —
/// an operational necessity a load balancer's health check depends on.
pub fn build_router(ctx: AppContext) -> Router {
    let exempt = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/metrics", get(metrics_route::metrics));

    let cors = cors_layer(&ctx.config.cors_allow_origins);

    let guarded = Router::new()
        .route("/webhooks/{source}", post(webhooks::ingest))
        .route("/v1/approvals/propose", post(approvals::propose))
        .route("/v1/approvals", get(approvals::list))
        .route("/v1/approvals/{id}", get(approvals::get))
        .route("/v1/approvals/{id}/decision", post(approvals::decide))
        .route("/v1/workflows/run", post(workflows::run))
        .route("/v1/workflows/jobs", get(workflows::list_jobs))
        .route("/v1/signals/evaluate", post(signals::evaluate))
        .route("/v1/policy/evaluate", post(policy::evaluate))
        .route("/v1/evals/run", post(signals::run_evals))
        .route("/v1/metrics/dora/{metric}", get(dora::get_metric))
        .route("/v1/metrics/quotas", get(quotas::get_quotas))
        .layer(DefaultBodyLimit::max(ctx.config.max_payload_bytes))
        .layer(crate::ratelimit::layer(&ctx.config))
        .layer(cors);

    exempt
        .merge(guarded)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.iter().any(|origin| origin == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    }
}

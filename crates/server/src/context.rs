// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! The typed application context built once at startup and passed by
//! reference to every handler — the "explicit router registration and a
//! typed application context struct" replacement for decorator-driven
//! routing and implicit dependency wiring (§9).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use gateway_adapters::signature::SignatureVerifier;
use gateway_core::Source;
use gateway_engine::{PolicyEvaluator, SignalEvaluator};
use gateway_storage::{ActionLogRepo, ApprovalsRepo, EventStore, IdentityRepo, JobsRepo};
use sqlx::PgPool;

use crate::config::GatewayConfig;
use crate::eventbus::Publisher;
use crate::metrics::Metrics;

/// Shared, read-only-after-startup state every route handler closes over.
/// Cloning `AppContext` is cheap — every field is an `Arc` or a `PgPool`
/// (itself a cheap-to-clone connection pool handle).
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<GatewayConfig>,
    pub pool: PgPool,
    pub events: Arc<EventStore>,
    pub approvals: Arc<ApprovalsRepo>,
    pub jobs: Arc<JobsRepo>,
    pub action_log: Arc<ActionLogRepo>,
    pub identities: Arc<IdentityRepo>,
    pub policy: Arc<PolicyEvaluator>,
    pub evaluator: Arc<SignalEvaluator>,
    pub quotas: Arc<gateway_adapters::quotas::QuotaTracker>,
    pub metrics: Arc<Metrics>,
    pub publisher: Arc<dyn Publisher>,
    pub verifiers: Arc<HashMap<Source, Arc<dyn SignatureVerifier>>>,
    pub http_client: reqwest::Client,
    pub started_at: Instant,
}

impl AppContext {
    /// Looks up the signature verifier configured for `source`, falling
    /// back to `NoneVerifier` when the source has no scheme of its own
    /// (accept-when-not-configured, per §4.1 step 6).
    pub fn verifier_for(&self, source: Source) -> Arc<dyn SignatureVerifier> {
        self.verifiers
            .get(&source)
            .cloned()
            .unwrap_or_else(|| Arc::new(gateway_adapters::signature::NoneVerifier))
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

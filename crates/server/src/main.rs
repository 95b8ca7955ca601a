// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! `gatewayd`: the engineering-operations telemetry gateway's single
//! binary. Wires config, storage, the background Signal Evaluator and
//! Workflow Runner, and the HTTP surface, then drives graceful shutdown.

mod config;
mod context;
mod error;
mod eventbus;
mod metrics;
mod ratelimit;
mod redact;
mod routes;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gateway_adapters::chat_client::SlackChatClient;
use gateway_adapters::executors::{
    AssignReviewerExecutor, CommentSummaryExecutor, ExecutorRegistry, IssueCreateExecutor,
    LabelExecutor, NudgeChatExecutor,
};
use gateway_adapters::policy_client::PolicyClient;
use gateway_adapters::quotas::QuotaTracker;
use gateway_adapters::signature::{
    CloudwatchVerifier, GithubVerifier, LinearVerifier, PagerdutyVerifier, SharedSecretVerifier,
    SignatureVerifier, SlackVerifier,
};
use gateway_adapters::vcs_client::GithubVcsClient;
use gateway_core::{QuotaKind, Source};
use gateway_engine::{
    PolicyEvaluator, PolicyLoader, RulesLoader, SignalEvaluator, SignalEvaluatorConfig,
    WorkflowRunner, WorkflowRunnerConfig,
};
use gateway_storage::{ActionLogRepo, ApprovalsRepo, EventStore, IdentityRepo, JobsRepo};
use tokio_util::sync::CancellationToken;

use config::GatewayConfig;
use context::AppContext;
use eventbus::BroadcastPublisher;
use metrics::Metrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Arc::new(GatewayConfig::from_env()?);
    tracing::info!(bind_addr = %config.bind_addr, "starting gatewayd");

    let pool = gateway_storage::pool::connect(&config.database_url, config.db_max_connections).await?;
    gateway_storage::pool::migrate(&pool).await?;

    let events = Arc::new(EventStore::new(pool.clone()));
    let approvals = Arc::new(ApprovalsRepo::new(pool.clone()));
    let jobs = Arc::new(JobsRepo::new(pool.clone()));
    let action_log = Arc::new(ActionLogRepo::new(pool.clone()));
    let identities = Arc::new(IdentityRepo::new(pool.clone()));

    let rules_loader = RulesLoader::load(&config.rules_path)?;
    let policy_loader = PolicyLoader::load(&config.policy_path)?;

    let external_policy_client = config.opa_url.as_ref().map(|url| PolicyClient::new(url.clone()));
    let policy = Arc::new(PolicyEvaluator::new(policy_loader, external_policy_client));

    let evaluator = Arc::new(SignalEvaluator::new(
        rules_loader,
        events.clone(),
        action_log.clone(),
        approvals.clone(),
        jobs.clone(),
        policy.clone(),
        SignalEvaluatorConfig { interval: config.evaluator_interval, actor: "signal-evaluator".to_string() },
    ));

    let mut quota_caps = HashMap::new();
    if let Some(cap) = config.max_daily_slack_posts {
        quota_caps.insert(QuotaKind::SlackPosts, cap);
    }
    if let Some(cap) = config.max_daily_rag_searches {
        quota_caps.insert(QuotaKind::RagSearches, cap);
    }
    let quotas = QuotaTracker::shared(quota_caps);

    let executors = build_executor_registry(&config, quotas.clone());
    let runner = Arc::new(WorkflowRunner::new(
        jobs.clone(),
        action_log.clone(),
        Arc::new(executors),
        Some(pool.clone()),
        WorkflowRunnerConfig {
            poll_interval: config.runner_poll_interval,
            max_backoff: config.runner_max_backoff,
            serialize_by_subject: config.runner_serialize_by_subject,
            actor: "workflow-runner".to_string(),
        },
    ));

    let verifiers = build_verifiers(&config);
    let publisher = BroadcastPublisher::shared(1024);
    let http_client = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;

    let ctx = AppContext {
        config: config.clone(),
        pool: pool.clone(),
        events: events.clone(),
        approvals: approvals.clone(),
        jobs: jobs.clone(),
        action_log: action_log.clone(),
        identities,
        policy,
        evaluator: evaluator.clone(),
        quotas,
        metrics: Arc::new(Metrics::new()),
        publisher,
        verifiers: Arc::new(verifiers),
        http_client,
        started_at: Instant::now(),
    };

    let cancel = CancellationToken::new();

    let evaluator_handle = config.evaluator_enabled.then(|| evaluator.spawn(cancel.child_token()));
    let runner_handle = runner.spawn(cancel.child_token());
    let retention_handle = spawn_retention_purge(events, approvals, config.retention_days, cancel.child_token());

    let router = routes::build_router(ctx);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutdown signal received, draining background tasks");
    cancel.cancel();
    tokio::time::timeout(config.drain_timeout, async {
        if let Some(handle) = evaluator_handle {
            let _ = handle.await;
        }
        let _ = runner_handle.await;
        let _ = retention_handle.await;
    })
    .await
    .ok();

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Builds the per-source signature verifier table from configured secrets.
/// A source absent from the map falls back to `NoneVerifier` at the call
/// site in `AppContext::verifier_for`, matching §4.1 step 6's
/// "accept-when-not-configured" rule.
fn build_verifiers(config: &GatewayConfig) -> HashMap<Source, Arc<dyn SignatureVerifier>> {
    let mut verifiers: HashMap<Source, Arc<dyn SignatureVerifier>> = HashMap::new();

    if let Some(secret) = config.integration_secret(Source::Github) {
        verifiers.insert(Source::Github, Arc::new(GithubVerifier::new(secret.to_string())));
    }
    if let Some(secret) = config.integration_secret(Source::Linear) {
        verifiers.insert(Source::Linear, Arc::new(LinearVerifier::new(secret.to_string())));
    }
    if let Some(secret) = config.integration_secret(Source::Pagerduty) {
        verifiers.insert(Source::Pagerduty, Arc::new(PagerdutyVerifier::new(secret.to_string())));
    }
    if let Some(secret) = config.integration_secret(Source::Jira) {
        verifiers.insert(
            Source::Jira,
            Arc::new(SharedSecretVerifier::new("x-atlassian-webhook-secret", secret.to_string())),
        );
    }
    if let Some(secret) = &config.slack_signing_secret {
        verifiers.insert(Source::Slack, Arc::new(SlackVerifier::new(secret.clone())));
    }
    verifiers.insert(Source::Cloudwatch, Arc::new(CloudwatchVerifier::new(config.trusted_cloudwatch_topic_arns.clone())));

    verifiers
}

/// Registers an executor per action the config has the credentials for.
/// An action with no configured client is simply left unregistered; the
/// runner's existing "no executor registered for action" path turns a
/// dispatch to it into a permanent failure rather than a panic.
fn build_executor_registry(config: &GatewayConfig, quotas: Arc<QuotaTracker>) -> ExecutorRegistry {
    let mut registry = ExecutorRegistry::new();

    if let Some(webhook_url) = &config.slack_webhook_url {
        let chat_client = Arc::new(SlackChatClient::new(webhook_url.clone()));
        registry.register("nudge_chat", Arc::new(NudgeChatExecutor::new(chat_client, quotas)));
    }

    if let Some(token) = &config.github_token {
        let vcs_client = Arc::new(GithubVcsClient::new(config.github_api_base_url.clone(), token.clone()));
        registry.register("assign_reviewer", Arc::new(AssignReviewerExecutor::new(vcs_client.clone())));
        registry.register("comment_summary", Arc::new(CommentSummaryExecutor::new(vcs_client.clone())));
        registry.register("issue_create", Arc::new(IssueCreateExecutor::new(vcs_client.clone())));
        registry.register("label", Arc::new(LabelExecutor::new(vcs_client)));
    }

    registry
}

/// Periodic purge of `EventRecord`s past `RETENTION_DAYS` and expiry of
/// approvals whose TTL has lapsed while still `pending` — both run on the
/// same daily cadence since neither is latency-sensitive.
fn spawn_retention_purge(
    events: Arc<EventStore>,
    approvals: Arc<ApprovalsRepo>,
    retention_days: i64,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("retention purge task shutting down");
                    break;
                }
                _ = interval.tick() => {
                    let cutoff = chrono::Utc::now() - chrono::Duration::days(retention_days);
                    match events.purge_older_than(cutoff).await {
                        Ok(purged) if purged > 0 => tracing::info!(purged, "purged expired event records"),
                        Ok(_) => {}
                        Err(err) => tracing::warn!(error = %err, "event retention purge failed"),
                    }
                    match approvals.expire_overdue().await {
                        Ok(expired) if !expired.is_empty() => {
                            tracing::info!(count = expired.len(), "expired overdue pending approvals")
                        }
                        Ok(_) => {}
                        Err(err) => tracing::warn!(error = %err, "approval expiry sweep failed"),
                    }
                }
            }
        }
    })
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! The single immutable `GatewayConfig`, built once from the environment at
//! startup and validated fail-fast — the "Global settings objects" pattern
//! from the system design's Design Notes, generalized from the teacher's
//! `daemon::lifecycle::Config`.

use gateway_core::Source;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_RATE_LIMIT_PER_MIN: u32 = 120;
const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1024 * 1024;
const DEFAULT_RETENTION_DAYS: i64 = 30;
const DEFAULT_EVALUATOR_INTERVAL_SEC: u64 = 60;
const DEFAULT_DRAIN_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RUNNER_MAX_BACKOFF_SECS: u64 = 60;
const DEFAULT_RUNNER_POLL_INTERVAL_MS: u64 = 500;
const MIN_JWT_SECRET_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {detail}")]
    Invalid { name: &'static str, detail: String },
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub database_url: String,
    pub bind_addr: std::net::SocketAddr,
    pub rate_limit_per_min: u32,
    pub max_payload_bytes: usize,
    pub retention_days: i64,
    pub evaluator_enabled: bool,
    pub evaluator_interval: Duration,
    pub rules_path: PathBuf,
    pub policy_path: PathBuf,
    pub opa_url: Option<String>,
    pub max_daily_slack_posts: Option<i64>,
    pub max_daily_rag_searches: Option<i64>,
    pub slack_signing_secret: Option<String>,
    pub slack_signing_required: bool,
    /// `INTEGRATIONS_<NAME>_ENABLED` per source; a source absent from the
    /// map defaults to enabled, matching §4.1 step 3's "look up the
    /// per-source feature flag" with a permissive default.
    pub integration_enabled: HashMap<Source, bool>,
    /// Optional per-source signing secret (`INTEGRATIONS_<NAME>_SECRET`).
    /// Absent means "signing not configured for that source" — §4.1 step 6
    /// accepts the request unsigned in that case.
    pub integration_secrets: HashMap<Source, String>,
    pub trusted_cloudwatch_topic_arns: Vec<String>,
    pub cors_allow_origins: Vec<String>,
    pub auth_enabled: bool,
    pub jwt_secret_key: Option<String>,
    pub jwt_algorithm: String,
    pub otel_enabled: bool,
    pub otel_exporter_otlp_endpoint: Option<String>,
    pub drain_timeout: Duration,
    pub runner_max_backoff: Duration,
    pub runner_poll_interval: Duration,
    /// Admin opt-in resolving the per-subject-ordering Open Question (§9):
    /// default off, since a single runner instance serializing by subject
    /// does not extend across a multi-instance deployment.
    pub runner_serialize_by_subject: bool,
    /// Resolves the `X-Forwarded-For` spoofing Open Question (§9): off by
    /// default, so the rate limiter keys on the observed peer address
    /// unless the operator explicitly trusts an upstream proxy.
    pub trust_forwarded_for: bool,
    pub db_max_connections: u32,
    /// Base URL of the out-of-scope analytics service `/v1/metrics/dora/*`
    /// forwards to. Unset means the DORA routes return 503.
    pub analytics_base_url: Option<String>,
    /// Token the `assign_reviewer`/`comment_summary`/`issue_create`/`label`
    /// executors use against the VCS client. Unset means those executors
    /// fail permanently the first time they're dispatched.
    pub github_token: Option<String>,
    pub github_api_base_url: String,
    /// Incoming webhook URL the `nudge_chat` executor posts to. Unset means
    /// that executor fails permanently.
    pub slack_webhook_url: Option<String>,
}

impl GatewayConfig {
    /// Loads and validates configuration from the process environment.
    /// Invalid values abort startup here rather than surfacing as a panic
    /// deep inside a handler.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = require_env("DATABASE_URL")?;
        let bind_addr = env_or("BIND_ADDR", "0.0.0.0:8080")
            .parse()
            .map_err(|err| ConfigError::Invalid { name: "BIND_ADDR", detail: format!("{err}") })?;

        let rate_limit_per_min = parse_env_or("RATE_LIMIT_PER_MIN", DEFAULT_RATE_LIMIT_PER_MIN)?;
        let max_payload_bytes = parse_env_or("MAX_PAYLOAD_BYTES", DEFAULT_MAX_PAYLOAD_BYTES)?;
        let retention_days = parse_env_or("RETENTION_DAYS", DEFAULT_RETENTION_DAYS)?;
        let evaluator_enabled = parse_bool_env_or("EVALUATOR_ENABLED", true)?;
        let evaluator_interval_sec: u64 =
            parse_env_or("EVALUATOR_INTERVAL_SEC", DEFAULT_EVALUATOR_INTERVAL_SEC)?;

        let rules_path = PathBuf::from(env_or("RULES_PATH", "config/rules.yaml"));
        let policy_path = PathBuf::from(env_or("POLICY_PATH", "config/policy.yaml"));
        let opa_url = std::env::var("OPA_URL").ok().filter(|s| !s.is_empty());

        let max_daily_slack_posts = optional_parse_env("MAX_DAILY_SLACK_POSTS")?;
        let max_daily_rag_searches = optional_parse_env("MAX_DAILY_RAG_SEARCHES")?;

        let slack_signing_secret = std::env::var("SLACK_SIGNING_SECRET").ok().filter(|s| !s.is_empty());
        let slack_signing_required = parse_bool_env_or("SLACK_SIGNING_REQUIRED", false)?;
        if slack_signing_required && slack_signing_secret.is_none() {
            return Err(ConfigError::Invalid {
                name: "SLACK_SIGNING_REQUIRED",
                detail: "set to true but SLACK_SIGNING_SECRET is not configured".to_string(),
            });
        }

        let mut integration_enabled = HashMap::new();
        let mut integration_secrets = HashMap::new();
        for source in Source::ALL {
            let env_name = integration_env_name(*source);
            if let Some(value) = std::env::var(format!("INTEGRATIONS_{env_name}_ENABLED")).ok() {
                let enabled = parse_bool(&value).map_err(|_| ConfigError::Invalid {
                    name: "INTEGRATIONS_*_ENABLED",
                    detail: format!("{value} is not a boolean"),
                })?;
                integration_enabled.insert(*source, enabled);
            }
            if let Ok(secret) = std::env::var(format!("INTEGRATIONS_{env_name}_SECRET")) {
                if !secret.is_empty() {
                    integration_secrets.insert(*source, secret);
                }
            }
        }

        let trusted_cloudwatch_topic_arns = std::env::var("CLOUDWATCH_TRUSTED_TOPIC_ARNS")
            .ok()
            .map(|value| value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
            .unwrap_or_default();

        let cors_allow_origins = std::env::var("CORS_ALLOW_ORIGINS")
            .ok()
            .map(|value| value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
            .unwrap_or_default();

        let auth_enabled = parse_bool_env_or("AUTH_ENABLED", false)?;
        let jwt_secret_key = std::env::var("JWT_SECRET_KEY").ok().filter(|s| !s.is_empty());
        if auth_enabled {
            match &jwt_secret_key {
                Some(key) if key.len() >= MIN_JWT_SECRET_BYTES => {}
                Some(_) => {
                    return Err(ConfigError::Invalid {
                        name: "JWT_SECRET_KEY",
                        detail: format!("must be at least {MIN_JWT_SECRET_BYTES} bytes when AUTH_ENABLED=true"),
                    })
                }
                None => return Err(ConfigError::Missing("JWT_SECRET_KEY")),
            }
        }
        let jwt_algorithm = env_or("JWT_ALGORITHM", "HS256");

        let otel_enabled = parse_bool_env_or("OTEL_ENABLED", false)?;
        let otel_exporter_otlp_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok().filter(|s| !s.is_empty());

        let drain_timeout_secs = parse_env_or("DRAIN_TIMEOUT_SECS", DEFAULT_DRAIN_TIMEOUT_SECS)?;
        let runner_max_backoff_secs = parse_env_or("RUNNER_MAX_BACKOFF_SECS", DEFAULT_RUNNER_MAX_BACKOFF_SECS)?;
        let runner_poll_interval_ms = parse_env_or("RUNNER_POLL_INTERVAL_MS", DEFAULT_RUNNER_POLL_INTERVAL_MS)?;
        let runner_serialize_by_subject = parse_bool_env_or("RUNNER_SERIALIZE_BY_SUBJECT", false)?;
        let trust_forwarded_for = parse_bool_env_or("TRUST_X_FORWARDED_FOR", false)?;
        let db_max_connections = parse_env_or("DATABASE_MAX_CONNECTIONS", 10u32)?;
        let analytics_base_url = std::env::var("ANALYTICS_BASE_URL").ok().filter(|s| !s.is_empty());
        let github_token = std::env::var("GITHUB_TOKEN").ok().filter(|s| !s.is_empty());
        let github_api_base_url = env_or("GITHUB_API_BASE_URL", "https://api.github.com");
        let slack_webhook_url = std::env::var("SLACK_WEBHOOK_URL").ok().filter(|s| !s.is_empty());

        Ok(Self {
            database_url,
            bind_addr,
            rate_limit_per_min,
            max_payload_bytes,
            retention_days,
            evaluator_enabled,
            evaluator_interval: Duration::from_secs(evaluator_interval_sec),
            rules_path,
            policy_path,
            opa_url,
            max_daily_slack_posts,
            max_daily_rag_searches,
            slack_signing_secret,
            slack_signing_required,
            integration_enabled,
            integration_secrets,
            trusted_cloudwatch_topic_arns,
            cors_allow_origins,
            auth_enabled,
            jwt_secret_key,
            jwt_algorithm,
            otel_enabled,
            otel_exporter_otlp_endpoint,
            drain_timeout: Duration::from_secs(drain_timeout_secs),
            runner_max_backoff: Duration::from_secs(runner_max_backoff_secs),
            runner_poll_interval: Duration::from_millis(runner_poll_interval_ms),
            runner_serialize_by_subject,
            trust_forwarded_for,
            db_max_connections,
            analytics_base_url,
            github_token,
            github_api_base_url,
            slack_webhook_url,
        })
    }

    pub fn is_integration_enabled(&self, source: Source) -> bool {
        self.integration_enabled.get(&source).copied().unwrap_or(true)
    }

    pub fn integration_secret(&self, source: Source) -> Option<&str> {
        self.integration_secrets.get(&source).map(String::as_str)
    }
}

/// `github` -> `GITHUB`, matching the `INTEGRATIONS_<NAME>_ENABLED` naming
/// from §6's configuration table.
fn integration_env_name(source: Source) -> String {
    source.as_str().to_uppercase()
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_env_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value.parse().map_err(|err| ConfigError::Invalid { name, detail: format!("{err}") }),
        Err(_) => Ok(default),
    }
}

fn optional_parse_env<T>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => {
            value.parse().map(Some).map_err(|err| ConfigError::Invalid { name, detail: format!("{err}") })
        }
        _ => Ok(None),
    }
}

fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(()),
    }
}

fn parse_bool_env_or(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(value) => parse_bool(&value).map_err(|_| ConfigError::Invalid {
            name,
            detail: format!("{value} is not a boolean"),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for (key, _) in std::env::vars() {
            if key.starts_with("INTEGRATIONS_")
                || matches!(
                    key.as_str(),
                    "DATABASE_URL"
                        | "AUTH_ENABLED"
                        | "JWT_SECRET_KEY"
                        | "SLACK_SIGNING_REQUIRED"
                        | "SLACK_SIGNING_SECRET"
                        | "BIND_ADDR"
                )
            {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn missing_database_url_is_an_error() {
        clear_env();
        assert!(matches!(GatewayConfig::from_env(), Err(ConfigError::Missing("DATABASE_URL"))));
    }

    #[test]
    #[serial]
    fn auth_enabled_requires_long_enough_secret() {
        clear_env();
        std::env::set_var("DATABASE_URL", "postgres://localhost/test");
        std::env::set_var("AUTH_ENABLED", "true");
        std::env::set_var("JWT_SECRET_KEY", "too-short");
        assert!(GatewayConfig::from_env().is_err());
        std::env::set_var("JWT_SECRET_KEY", "a".repeat(32));
        assert!(GatewayConfig::from_env().is_ok());
        clear_env();
    }

    #[test]
    #[serial]
    fn slack_signing_required_without_secret_fails() {
        clear_env();
        std::env::set_var("DATABASE_URL", "postgres://localhost/test");
        std::env::set_var("SLACK_SIGNING_REQUIRED", "true");
        assert!(GatewayConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    fn integration_env_names_are_uppercase_source_names() {
        assert_eq!(integration_env_name(Source::Github), "GITHUB");
        assert_eq!(integration_env_name(Source::Pagerduty), "PAGERDUTY");
    }
}

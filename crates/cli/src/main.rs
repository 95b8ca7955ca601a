// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! `gatewayctl`: the operator's maintenance tool — database migrations,
//! offline rule/policy YAML validation, and replaying a recorded webhook
//! payload against a running `gatewayd` for local testing. Not a general
//! admin UI; that surface is out of scope (§1).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gateway_engine::{PolicyLoader, RulesLoader};

#[derive(Parser)]
#[command(name = "gatewayctl", about = "Operator CLI for the telemetry gateway")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs pending database migrations against DATABASE_URL.
    Migrate,
    /// Loads and validates a rules YAML document without starting the server.
    ValidateRules {
        /// Path to the rules document. Defaults to RULES_PATH.
        path: Option<PathBuf>,
    },
    /// Loads and validates a policy YAML document without starting the server.
    ValidatePolicy {
        /// Path to the policy document. Defaults to POLICY_PATH.
        path: Option<PathBuf>,
    },
    /// Replays a recorded JSON payload against a running gatewayd's
    /// `/webhooks/{source}` endpoint.
    Replay {
        /// Integration name, e.g. `github`.
        source: String,
        /// Path to a file containing the raw request body.
        payload_path: PathBuf,
        /// Base URL of the running gatewayd instance.
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        base_url: String,
        /// Extra headers to forward, `Name: value`, repeatable.
        #[arg(long = "header", value_name = "NAME: VALUE")]
        headers: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Migrate => migrate().await,
        Command::ValidateRules { path } => validate_rules(path),
        Command::ValidatePolicy { path } => validate_policy(path),
        Command::Replay { source, payload_path, base_url, headers } => {
            replay(&source, &payload_path, &base_url, &headers).await
        }
    }
}

async fn migrate() -> anyhow::Result<()> {
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let pool = gateway_storage::pool::connect(&database_url, 5).await?;
    gateway_storage::pool::migrate(&pool).await?;
    println!("migrations applied");
    Ok(())
}

fn validate_rules(path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = path.or_else(|| std::env::var("RULES_PATH").ok().map(PathBuf::from)).ok_or_else(|| {
        anyhow::anyhow!("pass a path or set RULES_PATH")
    })?;
    let loader = RulesLoader::load(&path)?;
    let rule_set = loader.current();
    let unknown: Vec<_> = rule_set
        .rules
        .iter()
        .filter(|rule| rule.kind == gateway_core::RuleKind::Unknown)
        .map(|rule| rule.name.clone())
        .collect();
    println!("{} rule(s) loaded from {}", rule_set.rules.len(), path.display());
    if !unknown.is_empty() {
        println!("warning: unrecognized rule kind for: {}", unknown.join(", "));
    }
    Ok(())
}

fn validate_policy(path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = path.or_else(|| std::env::var("POLICY_PATH").ok().map(PathBuf::from)).ok_or_else(|| {
        anyhow::anyhow!("pass a path or set POLICY_PATH")
    })?;
    let loader = PolicyLoader::load(&path)?;
    let document = loader.current();
    println!("{} policy action entr(ies) loaded from {}", document.actions.len(), path.display());
    Ok(())
}

async fn replay(source: &str, payload_path: &PathBuf, base_url: &str, headers: &[String]) -> anyhow::Result<()> {
    let body = std::fs::read_to_string(payload_path)?;
    let url = format!("{base_url}/webhooks/{source}");

    let client = reqwest::Client::new();
    let mut request = client.post(&url).header("content-type", "application/json").body(body);
    for header in headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("malformed header {header:?}, expected 'Name: value'"))?;
        request = request.header(name.trim(), value.trim());
    }

    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    println!("{status}\n{body}");
    Ok(())
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! External policy backend client. When `OPA_URL` is configured, policy
//! decisions are requested from it; on any network error the caller falls
//! back to the built-in YAML evaluator (`gateway-engine::policy_eval`)
//! rather than failing the request closed.

use gateway_core::PolicyDecision;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyClientError {
    #[error("policy backend unreachable: {0}")]
    Unreachable(String),
    #[error("policy backend returned malformed response: {0}")]
    Malformed(String),
}

pub struct PolicyClient {
    http: reqwest::Client,
    base_url: String,
}

impl PolicyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, base_url: base_url.into() }
    }

    /// Evaluates `kind` against `context` through the external backend.
    /// Callers should treat any `Err` as "fall back to the built-in
    /// evaluator", not as a request failure.
    pub async fn evaluate(&self, kind: &str, context: &Value) -> Result<PolicyDecision, PolicyClientError> {
        let url = format!("{}/v1/policy/evaluate", self.base_url);
        let response = self
            .http
            .post(url)
            .json(&serde_json::json!({ "kind": kind, "context": context }))
            .send()
            .await
            .map_err(|err| PolicyClientError::Unreachable(err.to_string()))?;

        if !response.status().is_success() {
            return Err(PolicyClientError::Unreachable(response.status().to_string()));
        }

        response
            .json::<PolicyDecision>()
            .await
            .map_err(|err| PolicyClientError::Malformed(err.to_string()))
    }
}

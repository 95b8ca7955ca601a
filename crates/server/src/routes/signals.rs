// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! `/v1/signals/evaluate` and `/v1/evals/run`. Both run the Signal
//! Evaluator's matching logic against the current event window without
//! proposing anything (§4.5's dry-run surface): `evaluate` takes an
//! explicit rule document (inline or YAML), `run_evals` runs whatever is
//! currently loaded from `RULES_PATH`.

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use gateway_core::GatewayError;
use gateway_wire::signals::{EvaluateSignalsRequest, EvaluateSignalsResponse, SignalRuleResult};

use crate::context::AppContext;
use crate::error::{ApiError, ApiResult};

/// Takes the body as untyped JSON rather than `Json<EvaluateSignalsRequest>`
/// directly: `EvaluateSignalsRequest` is `#[serde(untagged)]`, and axum's
/// `Json` extractor answers a shape matching neither variant with its own
/// 422 `JsonRejection` — but §4.5/§8 require "unknown input shape returns
/// 400". Resolving the shape ourselves lets that case become an ordinary
/// `GatewayError::Validation`, mapped to 400 like every other bad request.
pub async fn evaluate(
    State(ctx): State<AppContext>,
    Json(body): Json<Value>,
) -> ApiResult<Json<EvaluateSignalsResponse>> {
    let request: EvaluateSignalsRequest = serde_json::from_value(body).map_err(|err| {
        ApiError(GatewayError::Validation(format!(
            "expected {{\"rules\": [...]}} or {{\"yaml\": \"...\"}}: {err}"
        )))
    })?;

    let rule_set = request
        .into_rule_set()
        .map_err(|err| ApiError(GatewayError::from(err)))?;

    let results = ctx.evaluator.dry_run(&rule_set).await.map_err(GatewayError::from)?;
    let results = results
        .into_iter()
        .map(|r| SignalRuleResult {
            rule_name: r.rule_name,
            matches: r.matched,
            error: r.error,
            elapsed_ms: r.elapsed_ms,
        })
        .collect();

    Ok(Json(EvaluateSignalsResponse { results }))
}

#[derive(Debug, serde::Serialize)]
pub struct EvalRunResponse {
    pub rule_count: usize,
    pub matched_count: usize,
    pub elapsed_ms: u64,
    pub results: Vec<SignalRuleResult>,
}

/// Runs every rule currently loaded from `RULES_PATH` and reports timing
/// and match counts for the batch — an operator-facing smoke test for a
/// rule document already deployed, as opposed to `evaluate`'s dry run of a
/// candidate document supplied in the request body.
pub async fn run_evals(State(ctx): State<AppContext>) -> ApiResult<Json<EvalRunResponse>> {
    let started = std::time::Instant::now();
    let rule_set = ctx.evaluator.current_rules();
    let results = ctx.evaluator.dry_run(&rule_set).await.map_err(GatewayError::from)?;
    let matched_count = results.iter().filter(|r| r.matched).count();
    let results = results
        .into_iter()
        .map(|r| SignalRuleResult {
            rule_name: r.rule_name,
            matches: r.matched,
            error: r.error,
            elapsed_ms: r.elapsed_ms,
        })
        .collect();

    Ok(Json(EvalRunResponse {
        rule_count: rule_set.rules.len(),
        matched_count,
        elapsed_ms: started.elapsed().as_millis() as u64,
        results,
    }))
}

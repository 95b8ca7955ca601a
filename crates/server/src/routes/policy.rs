// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! `POST /v1/policy/evaluate`.

use axum::extract::State;
use axum::Json;
use gateway_wire::policy::{PolicyEvaluateRequest, PolicyEvaluateResponse};

use crate::context::AppContext;
use crate::error::ApiResult;

pub async fn evaluate(
    State(ctx): State<AppContext>,
    Json(request): Json<PolicyEvaluateRequest>,
) -> ApiResult<Json<PolicyEvaluateResponse>> {
    request.validate()?;
    let decision = ctx.policy.evaluate(&request.kind, &request.context).await;
    Ok(Json(PolicyEvaluateResponse { kind: request.kind, decision }))
}

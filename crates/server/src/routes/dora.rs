// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! `GET /v1/metrics/dora/{metric}` — a thin pass-through to the analytics
//! transform layer (§1: "explicitly out of scope; only their interfaces are
//! specified here"). This service does not compute DORA metrics itself; it
//! forwards the request to the configured analytics backend and relays the
//! response verbatim, or reports the backend unavailable.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

use crate::context::AppContext;
use crate::error::{ApiError, ApiResult};

const SUPPORTED_METRICS: &[&str] =
    &["lead-time", "deployment-frequency", "change-fail-rate", "mttr"];

pub async fn get_metric(Path(metric): Path<String>, State(ctx): State<AppContext>) -> ApiResult<Json<Value>> {
    if !SUPPORTED_METRICS.contains(&metric.as_str()) {
        return Err(ApiError(gateway_core::GatewayError::NotFound(format!(
            "unknown DORA metric {metric}"
        ))));
    }

    let Some(base_url) = &ctx.config.analytics_base_url else {
        return Err(ApiError(gateway_core::GatewayError::Unavailable(
            "analytics backend not configured".to_string(),
        )));
    };

    let url = format!("{base_url}/dora/{metric}");
    let response = ctx
        .http_client
        .get(url)
        .send()
        .await
        .map_err(|err| ApiError(gateway_core::GatewayError::Unavailable(err.to_string())))?;

    if !response.status().is_success() {
        return Err(ApiError(gateway_core::GatewayError::Unavailable(format!(
            "analytics backend returned {}",
            response.status()
        ))));
    }

    let body = response
        .json::<Value>()
        .await
        .map_err(|err| ApiError(gateway_core::GatewayError::Internal(err.to_string())))?;
    Ok(Json(body))
}

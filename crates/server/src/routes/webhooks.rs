// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! `POST /webhooks/{source}` — the ingestion pipeline from §4.1: derive a
//! per-source idempotency key, short-circuit duplicates, verify the
//! signature, persist, and best-effort publish to the event bus.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::Value;
use std::str::FromStr;

use gateway_core::{GatewayError, NewEventRecord, Source};
use gateway_wire::webhooks::{ChallengeResponse, WebhookIngestResponse};

use crate::context::AppContext;
use crate::error::{ApiError, ApiResult};

/// One source's derivation rule for the idempotency key (§4.1's per-source
/// table) plus its `event_type` extraction. Keeping this as plain functions
/// per source, rather than a trait, matches the scale of the problem — four
/// or five lines each, not enough structure to earn an abstraction.
fn derive_github(headers: &HeaderMap, _body: &Value) -> (String, Option<String>) {
    let delivery_id = header_str(headers, "x-github-delivery").unwrap_or_default();
    let event_type = header_str(headers, "x-github-event");
    (delivery_id, event_type)
}

fn derive_jira(headers: &HeaderMap, body: &Value) -> (String, Option<String>) {
    let delivery_id = header_str(headers, "x-atlassian-webhook-identifier")
        .unwrap_or_else(|| synthetic_id(body));
    let event_type = body.get("webhookEvent").and_then(Value::as_str).map(str::to_string);
    (delivery_id, event_type)
}

fn derive_slack(headers: &HeaderMap, body: &Value) -> (String, Option<String>) {
    let delivery_id = body
        .get("event_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| synthetic_id(body));
    let event_type = body
        .get("event")
        .and_then(|e| e.get("type"))
        .and_then(Value::as_str)
        .or_else(|| body.get("type").and_then(Value::as_str))
        .map(str::to_string);
    let _ = headers;
    (delivery_id, event_type)
}

fn derive_pagerduty(_headers: &HeaderMap, body: &Value) -> (String, Option<String>) {
    let event_id = body
        .get("event")
        .and_then(|e| e.get("id"))
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let delivery_id = format!("pd-{event_id}");
    let event_type = body
        .get("event")
        .and_then(|e| e.get("event_type"))
        .and_then(Value::as_str)
        .map(str::to_string);
    (delivery_id, event_type)
}

fn derive_linear(_headers: &HeaderMap, body: &Value) -> (String, Option<String>) {
    let kind = body.get("type").and_then(Value::as_str).unwrap_or("unknown");
    let action = body.get("action").and_then(Value::as_str).unwrap_or("unknown");
    let id = body
        .get("data")
        .and_then(|d| d.get("id"))
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let delivery_id = format!("{kind}:{action}:{id}");
    (delivery_id, Some(format!("{kind}:{action}")))
}

fn derive_prometheus(_headers: &HeaderMap, body: &Value) -> (String, Option<String>) {
    let status = body.get("status").and_then(Value::as_str).unwrap_or("firing");
    let group_key = body.get("groupKey").and_then(Value::as_str).unwrap_or("unknown");
    let delivery_id = format!("{group_key}:{status}");
    let event_type = Some(if status == "resolved" { "alert_resolved".to_string() } else { "alert_firing".to_string() });
    (delivery_id, event_type)
}

fn derive_cloudwatch(_headers: &HeaderMap, body: &Value) -> (String, Option<String>) {
    let delivery_id = body
        .get("MessageId")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| synthetic_id(body));
    let event_type = body.get("Type").and_then(Value::as_str).map(str::to_string);
    (delivery_id, event_type)
}

fn derive_generic(_headers: &HeaderMap, body: &Value) -> (String, Option<String>) {
    (synthetic_id(body), None)
}

fn synthetic_id(body: &Value) -> String {
    format!("self-{}", sha256_hex(body.to_string().as_bytes()))
}

fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

fn lower_headers(headers: &HeaderMap) -> gateway_adapters::signature::Headers {
    headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_ascii_lowercase(), v.to_string())))
        .collect()
}

/// `POST /webhooks/{source}`. Steps follow §4.1 in order: feature flag,
/// url_verification shortcut, idempotency check, signature verification,
/// persist, best-effort publish.
pub async fn ingest(
    Path(source): Path<String>,
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let source = Source::from_str(&source)
        .map_err(|err| ApiError(GatewayError::NotFound(err.to_string())))?;

    if body.len() > ctx.config.max_payload_bytes {
        return Err(ApiError(GatewayError::PayloadTooLarge));
    }

    if !ctx.config.is_integration_enabled(source) {
        return Err(ApiError(GatewayError::Unavailable(format!("{source} integration is disabled"))));
    }

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|err| ApiError(GatewayError::Validation(format!("body is not valid JSON: {err}"))))?;

    if matches!(source, Source::Slack) {
        if let Some(challenge) = payload.get("challenge").and_then(Value::as_str) {
            if payload.get("type").and_then(Value::as_str) == Some("url_verification") {
                return Ok(Json(ChallengeResponse { challenge: challenge.to_string() }).into_response());
            }
        }
    }

    if matches!(source, Source::Cloudwatch) && header_str(&headers, "x-amz-sns-message-type").as_deref() == Some("SubscriptionConfirmation") {
        handle_cloudwatch_confirmation(&ctx, &payload).await;
    }

    let (delivery_id, event_type) = match source {
        Source::Github => derive_github(&headers, &payload),
        Source::Jira => derive_jira(&headers, &payload),
        Source::Slack => derive_slack(&headers, &payload),
        Source::Pagerduty => derive_pagerduty(&headers, &payload),
        Source::Linear => derive_linear(&headers, &payload),
        Source::Prometheus => derive_prometheus(&headers, &payload),
        Source::Cloudwatch => derive_cloudwatch(&headers, &payload),
        _ => derive_generic(&headers, &payload),
    };
    let event_type = event_type.unwrap_or_else(|| "unknown".to_string());

    if let Some(existing) = ctx.events.get_by_delivery_id(&delivery_id).await.map_err(GatewayError::from)? {
        ctx.metrics.record_webhook_duplicate();
        return Ok(Json(WebhookIngestResponse::Duplicate { id: existing.id }).into_response());
    }

    if let Err(err) = ctx.verifier_for(source).verify(&lower_headers(&headers), &body, Utc::now()) {
        ctx.metrics.record_webhook_rejected();
        return Err(ApiError(GatewayError::Authentication(err.to_string())));
    }

    let signature = header_str(&headers, "x-hub-signature-256")
        .or_else(|| header_str(&headers, "x-slack-signature"))
        .or_else(|| header_str(&headers, "x-pagerduty-signature"))
        .or_else(|| header_str(&headers, "linear-signature"));

    let new_record = NewEventRecord {
        source,
        event_type,
        delivery_id,
        signature,
        headers: lower_headers(&headers),
        payload: String::from_utf8_lossy(&body).to_string(),
        received_at: Utc::now(),
    };

    let outcome = ctx.events.insert(new_record).await.map_err(GatewayError::from)?;
    let record = match outcome {
        gateway_storage::InsertOutcome::Inserted(record) => record,
        gateway_storage::InsertOutcome::Duplicate(record) => {
            ctx.metrics.record_webhook_duplicate();
            return Ok(Json(WebhookIngestResponse::Duplicate { id: record.id }).into_response());
        }
    };

    let notification = crate::eventbus::EventNotification {
        id: record.id,
        source: record.source,
        event_type: record.event_type.clone(),
        received_at: record.received_at,
        payload_digest: crate::eventbus::payload_digest(&record.payload),
    };
    if let Err(err) = ctx.publisher.publish(notification) {
        tracing::warn!(error = %err, source = %source, "failed to publish event to broker");
        ctx.metrics.record_eventbus_publish_failure();
    }
    ctx.metrics.record_webhook_accepted();

    Ok(Json(WebhookIngestResponse::Ok { id: record.id }).into_response())
}

/// Completes the SNS subscription handshake once per topic. Best-effort:
/// a failure here is logged, not returned to the sender — SNS retries the
/// confirmation message on its own schedule.
async fn handle_cloudwatch_confirmation(ctx: &AppContext, body: &Value) {
    let Some(subscribe_url) = body.get("SubscribeURL").and_then(Value::as_str) else {
        tracing::warn!("cloudwatch SubscriptionConfirmation missing SubscribeURL");
        return;
    };
    if let Err(err) = gateway_adapters::signature::confirm_subscription(&ctx.http_client, subscribe_url).await {
        tracing::warn!(error = %err, "failed to confirm cloudwatch sns subscription");
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! `/v1/approvals/*` — propose, list, get, decide. §4.6.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use gateway_core::{
    ActionOutcome, ApprovalStatus, GatewayError, NewActionLogEntry, NewApproval, NewWorkflowJob,
};
use gateway_wire::approvals::{
    ApprovalListResponse, ApprovalView, DecisionRequest, ProposeApprovalRequest,
    ProposeApprovalResponse,
};

use crate::context::AppContext;
use crate::error::{ApiError, ApiResult};

const DEFAULT_APPROVAL_TTL_SECONDS: i64 = 86_400;

/// No auth middleware is wired in yet, so the acting identity comes from a
/// plain header rather than a verified principal. Good enough for the audit
/// trail's `actor`/`decided_by` columns; not a substitute for real auth.
fn actor_from_headers(headers: &HeaderMap) -> String {
    headers
        .get("x-actor")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| "api".to_string())
}

pub async fn propose(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(request): Json<ProposeApprovalRequest>,
) -> ApiResult<Json<ProposeApprovalResponse>> {
    request.validate()?;

    if ctx
        .approvals
        .find_pending_duplicate(&request.subject, &request.action)
        .await
        .map_err(GatewayError::from)?
        .is_some()
    {
        return Err(ApiError(GatewayError::Conflict(format!(
            "a pending approval already exists for {} / {}",
            request.subject, request.action
        ))));
    }

    let actor = actor_from_headers(&headers);
    let trace_id = format!("apr_{}", uuid::Uuid::new_v4());

    let approval = ctx
        .approvals
        .propose(NewApproval {
            subject: request.subject.clone(),
            action: request.action.clone(),
            risk_level: request.risk,
            proposed_payload: request.payload.clone(),
            requester: actor.clone(),
            reason: request.reason.clone(),
            ttl_seconds: DEFAULT_APPROVAL_TTL_SECONDS,
            trace_id: trace_id.clone(),
        })
        .await
        .map_err(GatewayError::from)?;

    ctx.action_log
        .append(NewActionLogEntry {
            rule_name: "manual".to_string(),
            subject: request.subject,
            action: request.action,
            outcome: ActionOutcome::Proposed,
            actor,
            trace_id,
            payload: request.payload,
        })
        .await
        .map_err(GatewayError::from)?;

    ctx.metrics.record_approval_proposed();

    Ok(Json(ProposeApprovalResponse { id: approval.id.to_string(), status: approval.status, blocked: false }))
}

pub async fn list(State(ctx): State<AppContext>) -> ApiResult<Json<ApprovalListResponse>> {
    let approvals = ctx.approvals.list_pending().await.map_err(GatewayError::from)?;
    let approvals = approvals.iter().map(ApprovalView::from).collect();
    Ok(Json(ApprovalListResponse { approvals }))
}

pub async fn get(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApprovalView>> {
    let approval = ctx.approvals.get(&id).await.map_err(GatewayError::from)?;
    Ok(Json(ApprovalView::from(&approval)))
}

/// `POST /v1/approvals/{id}/decision`. A decision on an already-decided
/// approval is not an error (§4.6): the storage layer surfaces that race as
/// `StorageError::Conflict`, which this handler treats as success and
/// answers with the approval's current terminal state. Crucially, that
/// no-op path never enqueues a job — an approval is at-most-once enqueable
/// (§3, §8 invariant 2), so only the transition that actually won the race
/// (the `Ok` branch below) is allowed to create a `WorkflowJob`.
pub async fn decide(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<DecisionRequest>,
) -> ApiResult<Json<ApprovalView>> {
    request.validate()?;
    let actor = actor_from_headers(&headers);

    let (approval, won_transition) = match ctx
        .approvals
        .decide(&id, request.decision, &actor, request.reason.as_deref())
        .await
    {
        Ok(approval) => (approval, true),
        Err(gateway_storage::StorageError::Conflict(_)) => {
            (ctx.approvals.get(&id).await.map_err(GatewayError::from)?, false)
        }
        Err(err) => return Err(GatewayError::from(err).into()),
    };

    let mut job_id = None;
    if won_transition && approval.status.enqueues_job() {
        let trace_id = approval.trace_id.clone();
        let job = ctx
            .jobs
            .enqueue(NewWorkflowJob::new(
                "approval",
                approval.subject.clone(),
                approval.action.clone(),
                approval.proposed_payload.clone(),
                trace_id,
            ))
            .await
            .map_err(GatewayError::from)?;
        job_id = Some(job.id.to_string());
    }

    let outcome = match approval.status {
        ApprovalStatus::Approved | ApprovalStatus::Modified => ActionOutcome::Approved,
        ApprovalStatus::Declined => ActionOutcome::Declined,
        ApprovalStatus::Pending | ApprovalStatus::Expired => ActionOutcome::Proposed,
    };
    if won_transition && !matches!(outcome, ActionOutcome::Proposed) {
        ctx.action_log
            .append(NewActionLogEntry {
                rule_name: "manual".to_string(),
                subject: approval.subject.clone(),
                action: approval.action.clone(),
                outcome,
                actor,
                trace_id: approval.trace_id.clone(),
                payload: approval.proposed_payload.clone(),
            })
            .await
            .map_err(GatewayError::from)?;
    }

    let mut view = ApprovalView::from(&approval);
    view.job_id = job_id;
    Ok(Json(view))
}

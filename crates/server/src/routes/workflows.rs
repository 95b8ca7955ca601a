// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! `/v1/workflows/*`. `run` is the synchronous front door into the policy
//! gate (§4.4/§8 S3): it always calls the Policy Evaluator itself, then
//! either enqueues a job directly (`auto`) or creates an approval
//! (`ask`/`require_approval`), mirroring the branch the Signal Evaluator
//! takes per match in §4.5 step 4.

use axum::extract::State;
use axum::Json;

use gateway_core::{
    ActionOutcome, GatewayError, NewActionLogEntry, NewApproval, NewWorkflowJob, PolicyMode,
};
use gateway_wire::workflows::{JobListResponse, RunWorkflowRequest, RunWorkflowResponse, WorkflowJobView};

use crate::context::AppContext;
use crate::error::{ApiError, ApiResult};

const DEFAULT_APPROVAL_TTL_SECONDS: i64 = 86_400;
const JOB_LIST_LIMIT: i64 = 200;

pub async fn run(
    State(ctx): State<AppContext>,
    Json(request): Json<RunWorkflowRequest>,
) -> ApiResult<Json<RunWorkflowResponse>> {
    request.validate()?;

    let decision = ctx.policy.evaluate(&request.rule_kind, &request.payload).await;
    let action = request.action.clone().unwrap_or_else(|| decision.action.clone());
    let trace_id = format!("wf_{}", uuid::Uuid::new_v4());

    ctx.action_log
        .append(NewActionLogEntry {
            rule_name: request.rule_kind.clone(),
            subject: request.subject.clone(),
            action: action.clone(),
            outcome: ActionOutcome::Proposed,
            actor: "api".to_string(),
            trace_id: trace_id.clone(),
            payload: request.payload.clone(),
        })
        .await
        .map_err(GatewayError::from)?;

    match decision.mode {
        PolicyMode::Auto => {
            let job = ctx
                .jobs
                .enqueue(NewWorkflowJob::new(
                    request.rule_kind.clone(),
                    request.subject.clone(),
                    action,
                    request.payload.clone(),
                    trace_id,
                ))
                .await
                .map_err(GatewayError::from)?;
            let action_id = job.trace_id.clone();
            Ok(Json(RunWorkflowResponse::Queued { action_id, job_id: job.id.to_string() }))
        }
        PolicyMode::Ask | PolicyMode::RequireApproval => {
            let approval = ctx
                .approvals
                .propose(NewApproval {
                    subject: request.subject.clone(),
                    action,
                    risk_level: decision.risk,
                    proposed_payload: request.payload.clone(),
                    requester: "api".to_string(),
                    reason: Some(decision.reason.clone()),
                    ttl_seconds: DEFAULT_APPROVAL_TTL_SECONDS,
                    trace_id,
                })
                .await
                .map_err(GatewayError::from)?;
            Ok(Json(RunWorkflowResponse::AwaitingApproval { action_id: approval.id.to_string() }))
        }
    }
}

pub async fn list_jobs(State(ctx): State<AppContext>) -> ApiResult<Json<JobListResponse>> {
    let jobs = ctx.jobs.list_recent(JOB_LIST_LIMIT).await.map_err(GatewayError::from)?;
    let jobs = jobs.iter().map(WorkflowJobView::from).collect();
    Ok(Json(JobListResponse { jobs }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_rule_kind() {
        let request = RunWorkflowRequest {
            rule_kind: "".to_string(),
            subject: "pr:1".to_string(),
            action: None,
            payload: serde_json::json!({}),
        };
        assert!(request.validate().is_err());
    }
}

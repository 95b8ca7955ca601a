// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! The Signal Evaluator: a periodic task that runs every configured rule
//! against the recent event window, proposes a policy decision for each
//! match, and either enqueues a job directly (`auto` mode) or creates an
//! approval (`ask`/`require_approval`).
//!
//! Dedup is per `(rule_name, subject)`: a match that already produced an
//! `executed` action log entry within the dedup window is skipped, so a
//! flapping condition doesn't re-propose on every cycle.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gateway_core::{
    ActionOutcome, EventRecord, NewActionLogEntry, NewApproval, NewWorkflowJob, PolicyMode, Rule,
    RuleKind, RuleSet,
};
use gateway_storage::{ActionLogRepo, ApprovalsRepo, EventStore, JobsRepo};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::policy_eval::PolicyEvaluator;
use crate::rules_loader::RulesLoader;

/// The window, per rule, the evaluator scans back over to build its view of
/// "currently open" subjects. Generous relative to any `older_than_hours`
/// parameter rules are expected to configure, since a subject's relevant
/// history can predate the staleness threshold itself.
const SCAN_WINDOW_DAYS: i64 = 30;

/// How long a `(rule_name, subject)` pair that already fired suppresses a
/// re-proposal, matching the "at-most-one in-flight proposal per cycle
/// window" guarantee.
const DEDUP_WINDOW_MINUTES: i64 = 60;

const DEFAULT_APPROVAL_TTL_SECONDS: i64 = 24 * 3600;

pub struct SignalEvaluatorConfig {
    pub interval: Duration,
    pub actor: String,
}

/// One rule's outcome from [`SignalEvaluator::dry_run`].
#[derive(Debug, Clone)]
pub struct RuleDryRunResult {
    pub rule_name: String,
    pub matched: bool,
    pub match_count: usize,
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

/// One normalized snapshot of a subject's latest known state, folded from
/// its most recent matching event record. Fields are best-effort: a source
/// that never populates `assignee` simply never matches `wip_limit_exceeded`.
#[derive(Debug, Clone, Default)]
struct SubjectSnapshot {
    status: Option<String>,
    assignee: Option<String>,
    reviewed: Option<bool>,
    ticket_ref: Option<String>,
    title: Option<String>,
    last_seen: DateTime<Utc>,
}

fn fold_snapshots(records: &[EventRecord]) -> HashMap<String, SubjectSnapshot> {
    let mut snapshots: HashMap<String, SubjectSnapshot> = HashMap::new();
    for record in records {
        let Ok(payload) = serde_json::from_str::<Value>(&record.payload) else {
            continue;
        };
        let Some(subject) = subject_of(&payload, record) else {
            continue;
        };
        let entry = snapshots.entry(subject).or_default();
        if let Some(status) = payload.get("status").and_then(Value::as_str) {
            entry.status = Some(status.to_string());
        }
        if let Some(assignee) = payload.get("assignee").and_then(Value::as_str) {
            entry.assignee = Some(assignee.to_string());
        }
        if let Some(reviewed) = payload.get("reviewed").and_then(Value::as_bool) {
            entry.reviewed = Some(reviewed);
        }
        if let Some(ticket_ref) = payload.get("ticket_ref").and_then(Value::as_str) {
            entry.ticket_ref = Some(ticket_ref.to_string());
        }
        if let Some(title) = payload.get("title").and_then(Value::as_str) {
            entry.title = Some(title.to_string());
        }
        entry.last_seen = record.received_at;
    }
    snapshots
}

fn subject_of(payload: &Value, record: &EventRecord) -> Option<String> {
    payload
        .get("subject")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            payload
                .get("number")
                .map(|number| format!("pr:{number}"))
        })
        .or_else(|| Some(format!("{}:{}", record.source, record.delivery_id)))
}

fn parameter_u64(parameters: &Value, key: &str, default: u64) -> u64 {
    parameters.get(key).and_then(Value::as_u64).unwrap_or(default)
}

/// One rule match: the subject it fired on, plus whatever context the
/// matched snapshot carries forward into the policy call and the eventual
/// workflow payload.
struct Match {
    subject: String,
    context: Value,
}

fn evaluate_rule(rule: &Rule, snapshots: &HashMap<String, SubjectSnapshot>, now: DateTime<Utc>) -> Vec<Match> {
    match &rule.kind {
        RuleKind::StalePr => {
            let older_than_hours = parameter_u64(&rule.parameters, "older_than_hours", 48);
            let cutoff = now - chrono::Duration::hours(older_than_hours as i64);
            snapshots
                .iter()
                .filter(|(_, snap)| {
                    !matches!(snap.status.as_deref(), Some("merged") | Some("closed"))
                        && snap.last_seen < cutoff
                })
                .map(|(subject, snap)| Match {
                    subject: subject.clone(),
                    context: serde_json::json!({
                        "rule": "stale_pr",
                        "subject": subject,
                        "last_seen": snap.last_seen,
                        "older_than_hours": older_than_hours,
                    }),
                })
                .collect()
        }
        RuleKind::WipLimitExceeded => {
            let limit = parameter_u64(&rule.parameters, "limit", 3);
            let mut by_assignee: HashMap<String, Vec<&String>> = HashMap::new();
            for (subject, snap) in snapshots {
                if matches!(snap.status.as_deref(), Some("in_progress") | Some("open")) {
                    if let Some(assignee) = &snap.assignee {
                        by_assignee.entry(assignee.clone()).or_default().push(subject);
                    }
                }
            }
            by_assignee
                .into_iter()
                .filter(|(_, subjects)| subjects.len() as u64 > limit)
                .map(|(assignee, subjects)| Match {
                    subject: format!("assignee:{assignee}"),
                    context: serde_json::json!({
                        "rule": "wip_limit_exceeded",
                        "assignee": assignee,
                        "count": subjects.len(),
                        "limit": limit,
                        "subjects": subjects,
                    }),
                })
                .collect()
        }
        RuleKind::PrWithoutReview => {
            let older_than_hours = parameter_u64(&rule.parameters, "older_than_hours", 24);
            let cutoff = now - chrono::Duration::hours(older_than_hours as i64);
            snapshots
                .iter()
                .filter(|(_, snap)| {
                    matches!(snap.status.as_deref(), Some("open"))
                        && snap.reviewed != Some(true)
                        && snap.last_seen < cutoff
                })
                .map(|(subject, snap)| Match {
                    subject: subject.clone(),
                    context: serde_json::json!({
                        "rule": "pr_without_review",
                        "subject": subject,
                        "last_seen": snap.last_seen,
                    }),
                })
                .collect()
        }
        RuleKind::NoTicketLink => {
            let pattern = rule
                .parameters
                .get("ticket_pattern")
                .and_then(Value::as_str)
                .unwrap_or(r"[A-Z]+-\d+");
            let regex = match regex::Regex::new(pattern) {
                Ok(regex) => regex,
                Err(err) => {
                    tracing::warn!(rule = %rule.name, pattern, error = %err, "invalid ticket_pattern, skipping rule");
                    return Vec::new();
                }
            };
            snapshots
                .iter()
                .filter(|(_, snap)| {
                    matches!(snap.status.as_deref(), Some("open"))
                        && snap.ticket_ref.is_none()
                        && !snap
                            .title
                            .as_deref()
                            .map(|title| regex.is_match(title))
                            .unwrap_or(false)
                })
                .map(|(subject, snap)| Match {
                    subject: subject.clone(),
                    context: serde_json::json!({
                        "rule": "no_ticket_link",
                        "subject": subject,
                        "title": snap.title,
                    }),
                })
                .collect()
        }
        RuleKind::Unknown => Vec::new(),
    }
}

pub struct SignalEvaluator {
    rules: RulesLoader,
    events: Arc<EventStore>,
    action_log: Arc<ActionLogRepo>,
    approvals: Arc<ApprovalsRepo>,
    jobs: Arc<JobsRepo>,
    policy: Arc<PolicyEvaluator>,
    config: SignalEvaluatorConfig,
}

impl SignalEvaluator {
    pub fn new(
        rules: RulesLoader,
        events: Arc<EventStore>,
        action_log: Arc<ActionLogRepo>,
        approvals: Arc<ApprovalsRepo>,
        jobs: Arc<JobsRepo>,
        policy: Arc<PolicyEvaluator>,
        config: SignalEvaluatorConfig,
    ) -> Self {
        Self { rules, events, action_log, approvals, jobs, policy, config }
    }

    /// Spawns the evaluator as a background task. Shuts down cleanly when
    /// `cancel` fires; a failing cycle is logged and retried on the next
    /// tick rather than killing the task.
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("signal evaluator shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        if let Err(err) = self.run_cycle().await {
                            tracing::warn!(error = %err, "signal evaluator cycle failed");
                        }
                    }
                }
            }
        })
    }

    /// Runs one full evaluation cycle: reload rules, scan, propose. Returns
    /// the number of matches proposed (useful for the `signals/evaluate`
    /// HTTP endpoint, which runs a cycle synchronously against an
    /// explicitly-supplied rule set instead of the loaded one).
    pub async fn run_cycle(&self) -> Result<usize, gateway_storage::error::StorageError> {
        let rule_set = self.current_rules();
        let now = Utc::now();
        let proposed = self.run_rule_set(&rule_set, now).await?;
        Ok(proposed)
    }

    /// The rule set currently loaded from `RULES_PATH`, reloading first if
    /// the file's mtime has changed. Exposed so `/v1/evals/run` can report
    /// on the same document the background cycle runs, without duplicating
    /// the loader.
    pub fn current_rules(&self) -> Arc<RuleSet> {
        self.rules.reload_if_changed();
        self.rules.current()
    }

    async fn run_rule_set(
        &self,
        rule_set: &RuleSet,
        now: DateTime<Utc>,
    ) -> Result<usize, gateway_storage::error::StorageError> {
        let since = now - chrono::Duration::days(SCAN_WINDOW_DAYS);
        let records = self.events.list_since(since).await?;
        let snapshots = fold_snapshots(&records);

        let mut proposed = 0;
        for rule in &rule_set.rules {
            for m in evaluate_rule(rule, &snapshots, now) {
                let dedup_since = now - chrono::Duration::minutes(DEDUP_WINDOW_MINUTES);
                if self.action_log.has_fired_within(&rule.name, &m.subject, dedup_since).await? {
                    continue;
                }
                self.propose(rule, m, now).await?;
                proposed += 1;
            }
        }
        Ok(proposed)
    }

    /// Evaluates `rule_set` against the current event window without
    /// persisting any action log entries or job/approval rows. Used by the
    /// `/v1/signals/evaluate` dry-run endpoint to let an operator check a
    /// candidate rule document before it's written to `RULES_PATH`.
    pub async fn dry_run(
        &self,
        rule_set: &RuleSet,
    ) -> Result<Vec<RuleDryRunResult>, gateway_storage::error::StorageError> {
        let now = Utc::now();
        let since = now - chrono::Duration::days(SCAN_WINDOW_DAYS);
        let records = self.events.list_since(since).await?;
        let snapshots = fold_snapshots(&records);

        Ok(rule_set
            .rules
            .iter()
            .map(|rule| {
                let started = std::time::Instant::now();
                if rule.kind == RuleKind::Unknown {
                    return RuleDryRunResult {
                        rule_name: rule.name.clone(),
                        matched: false,
                        match_count: 0,
                        error: Some("unrecognized rule kind".to_string()),
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    };
                }
                let matches = evaluate_rule(rule, &snapshots, now);
                RuleDryRunResult {
                    rule_name: rule.name.clone(),
                    matched: !matches.is_empty(),
                    match_count: matches.len(),
                    error: None,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                }
            })
            .collect())
    }

    async fn propose(
        &self,
        rule: &Rule,
        m: Match,
        now: DateTime<Utc>,
    ) -> Result<(), gateway_storage::error::StorageError> {
        let decision = self.policy.evaluate(rule.kind.to_string().as_str(), &m.context).await;
        let trace_id = format!("sig_{}", uuid::Uuid::new_v4());

        self.action_log
            .append(NewActionLogEntry {
                rule_name: rule.name.clone(),
                subject: m.subject.clone(),
                action: decision.action.clone(),
                outcome: ActionOutcome::Proposed,
                actor: self.config.actor.clone(),
                trace_id: trace_id.clone(),
                payload: m.context.clone(),
            })
            .await?;

        match decision.mode {
            PolicyMode::Auto => {
                self.jobs
                    .enqueue(NewWorkflowJob::new(
                        rule.kind.to_string(),
                        m.subject.clone(),
                        decision.action.clone(),
                        m.context.clone(),
                        trace_id,
                    ))
                    .await?;
            }
            PolicyMode::Ask | PolicyMode::RequireApproval => {
                self.approvals
                    .propose(NewApproval {
                        subject: m.subject.clone(),
                        action: decision.action.clone(),
                        risk_level: decision.risk,
                        proposed_payload: m.context.clone(),
                        requester: self.config.actor.clone(),
                        reason: Some(decision.reason.clone()),
                        ttl_seconds: DEFAULT_APPROVAL_TTL_SECONDS,
                        trace_id,
                    })
                    .await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(subject: &str, status: &str, received_at: DateTime<Utc>) -> EventRecord {
        EventRecord {
            id: 0,
            source: gateway_core::Source::Github,
            event_type: "pull_request".to_string(),
            delivery_id: format!("del_{subject}"),
            signature: None,
            headers: HashMap::new(),
            payload: serde_json::json!({ "subject": subject, "status": status }).to_string(),
            received_at,
        }
    }

    #[test]
    fn stale_pr_matches_only_open_subjects_past_cutoff() {
        let now = Utc::now();
        let records = vec![
            record("pr:1", "open", now - chrono::Duration::hours(72)),
            record("pr:2", "merged", now - chrono::Duration::hours(72)),
            record("pr:3", "open", now - chrono::Duration::hours(1)),
        ];
        let snapshots = fold_snapshots(&records);
        let rule = Rule {
            name: "stale".to_string(),
            kind: RuleKind::StalePr,
            parameters: serde_json::json!({ "older_than_hours": 48 }),
        };
        let matches = evaluate_rule(&rule, &snapshots, now);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].subject, "pr:1");
    }

    #[test]
    fn wip_limit_counts_open_items_per_assignee() {
        let now = Utc::now();
        let mut records = Vec::new();
        for i in 0..4 {
            let mut r = record(&format!("pr:{i}"), "open", now);
            r.payload = serde_json::json!({
                "subject": format!("pr:{i}"),
                "status": "open",
                "assignee": "alice",
            })
            .to_string();
            records.push(r);
        }
        let snapshots = fold_snapshots(&records);
        let rule = Rule {
            name: "wip".to_string(),
            kind: RuleKind::WipLimitExceeded,
            parameters: serde_json::json!({ "limit": 3 }),
        };
        let matches = evaluate_rule(&rule, &snapshots, now);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].subject, "assignee:alice");
    }

    #[test]
    fn no_ticket_link_requires_missing_ref_and_title_mismatch() {
        let now = Utc::now();
        let mut r = record("pr:9", "open", now);
        r.payload = serde_json::json!({
            "subject": "pr:9",
            "status": "open",
            "title": "fix the thing",
        })
        .to_string();
        let snapshots = fold_snapshots(&[r]);
        let rule = Rule {
            name: "ticket".to_string(),
            kind: RuleKind::NoTicketLink,
            parameters: serde_json::json!({ "ticket_pattern": r"[A-Z]+-\d+" }),
        };
        let matches = evaluate_rule(&rule, &snapshots, now);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn no_ticket_link_skips_when_title_contains_ticket_ref() {
        let now = Utc::now();
        let mut r = record("pr:10", "open", now);
        r.payload = serde_json::json!({
            "subject": "pr:10",
            "status": "open",
            "title": "ENG-123: fix the thing",
        })
        .to_string();
        let snapshots = fold_snapshots(&[r]);
        let rule = Rule {
            name: "ticket".to_string(),
            kind: RuleKind::NoTicketLink,
            parameters: serde_json::json!({ "ticket_pattern": r"[A-Z]+-\d+" }),
        };
        let matches = evaluate_rule(&rule, &snapshots, now);
        assert!(matches.is_empty());
    }
}

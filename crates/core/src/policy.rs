// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Policy decision types shared between the built-in evaluator
//! (`gateway-engine::policy_eval`) and the external-backend client
//! (`gateway-adapters::policy_client`).

use crate::RiskLevel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    /// Execute without approval.
    Auto,
    /// Propose but allow implicit approval per policy.
    Ask,
    /// Must be explicitly approved by a human.
    RequireApproval,
}

crate::simple_display! {
    PolicyMode {
        Auto => "auto",
        Ask => "ask",
        RequireApproval => "require_approval",
    }
}

/// The result of evaluating `(rule_kind, optional_context)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub allow: bool,
    pub action: String,
    pub risk: RiskLevel,
    pub mode: PolicyMode,
    pub reason: String,
}

impl PolicyDecision {
    /// The fallback used when a `kind` has no entry in the policy document
    /// and no external backend is configured (or the external backend is
    /// unreachable): never fail-closed unless explicitly configured.
    pub fn default_allow() -> Self {
        Self {
            allow: true,
            action: "nudge".to_string(),
            risk: RiskLevel::Low,
            mode: PolicyMode::Ask,
            reason: "no policy entry for this kind; defaulting to nudge/ask".to_string(),
        }
    }
}

/// One entry in the policy YAML document's `actions` map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyActionEntry {
    pub action: String,
    pub mode: PolicyMode,
    pub risk: RiskLevel,
    #[serde(default)]
    pub context: Option<String>,
}

/// Outbound-side-effect caps, the `limits` section of the policy document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyLimits {
    #[serde(default)]
    pub max_daily_slack_posts: Option<i64>,
    #[serde(default)]
    pub max_daily_rag_searches: Option<i64>,
}

/// The full parsed policy document: `{ actions: { kind: {...} }, limits: {...} }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(default)]
    pub actions: std::collections::HashMap<String, PolicyActionEntry>,
    #[serde(default)]
    pub limits: PolicyLimits,
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Built-in policy evaluator: looks `kind` up in the loaded
//! [`PolicyDocument`]'s `actions` map. Falls back to
//! [`PolicyDecision::default_allow`] when `kind` has no entry, per the
//! "never fail-closed unless explicitly configured" design choice.

use crate::policy_loader::PolicyLoader;
use gateway_adapters::policy_client::PolicyClient;
use gateway_core::{PolicyDecision, PolicyDocument};
use serde_json::Value;

/// Wires the two policy backends together: try the external client first
/// when one is configured, fall back to the built-in YAML table on any
/// error or when no external backend is configured at all.
pub struct PolicyEvaluator {
    loader: PolicyLoader,
    external: Option<PolicyClient>,
}

impl PolicyEvaluator {
    pub fn new(loader: PolicyLoader, external: Option<PolicyClient>) -> Self {
        Self { loader, external }
    }

    pub async fn evaluate(&self, kind: &str, context: &Value) -> PolicyDecision {
        if let Some(client) = &self.external {
            match client.evaluate(kind, context).await {
                Ok(decision) => return decision,
                Err(err) => {
                    tracing::warn!(kind, error = %err, "external policy backend unavailable, using built-in table");
                }
            }
        }
        evaluate(&self.loader.current(), kind)
    }
}

pub fn evaluate(document: &PolicyDocument, kind: &str) -> PolicyDecision {
    match document.actions.get(kind) {
        Some(entry) => PolicyDecision {
            allow: true,
            action: entry.action.clone(),
            risk: entry.risk,
            mode: entry.mode,
            reason: format!("matched policy entry for kind {kind}"),
        },
        None => PolicyDecision::default_allow(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::{PolicyActionEntry, PolicyMode, RiskLevel};
    use std::collections::HashMap;

    #[test]
    fn matched_kind_uses_configured_entry() {
        let mut actions = HashMap::new();
        actions.insert(
            "stale_pr".to_string(),
            PolicyActionEntry {
                action: "nudge_chat".to_string(),
                mode: PolicyMode::Auto,
                risk: RiskLevel::Low,
                context: None,
            },
        );
        let document = PolicyDocument { actions, limits: Default::default() };

        let decision = evaluate(&document, "stale_pr");
        assert!(decision.allow);
        assert_eq!(decision.action, "nudge_chat");
        assert_eq!(decision.mode, PolicyMode::Auto);
    }

    #[test]
    fn unmatched_kind_defaults_to_allow() {
        let document = PolicyDocument::default();
        let decision = evaluate(&document, "totally_unknown");
        assert!(decision.allow);
        assert_eq!(decision.mode, gateway_core::PolicyMode::Ask);
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! DTOs for `POST /v1/signals/evaluate`. Accepts either an inline rule list
//! or a raw YAML document, so callers can dry-run a `RULES_PATH` candidate
//! through the same endpoint that serves it.

use crate::validate::ValidationError;
use gateway_core::{Rule, RuleSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EvaluateSignalsRequest {
    Inline { rules: Vec<Rule> },
    Yaml { yaml: String },
}

impl EvaluateSignalsRequest {
    /// Resolves either shape into the `RuleSet` the evaluator runs.
    pub fn into_rule_set(self) -> Result<RuleSet, ValidationError> {
        match self {
            EvaluateSignalsRequest::Inline { rules } => Ok(RuleSet { rules }),
            EvaluateSignalsRequest::Yaml { yaml } => serde_yaml::from_str(&yaml)
                .map_err(|err| ValidationError::new("yaml", err.to_string())),
        }
    }
}

/// Outcome of running a single rule against current signal state.
#[derive(Debug, Clone, Serialize)]
pub struct SignalRuleResult {
    pub rule_name: String,
    pub matches: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluateSignalsResponse {
    pub results: Vec<SignalRuleResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_shape_parses_into_rule_set() {
        let request = EvaluateSignalsRequest::Yaml {
            yaml: "rules:\n  - name: stale\n    kind: stale_pr\n    parameters: {}\n"
                .to_string(),
        };
        let rule_set = request.into_rule_set().unwrap();
        assert_eq!(rule_set.rules.len(), 1);
        assert_eq!(rule_set.rules[0].name, "stale");
    }

    #[test]
    fn inline_shape_passes_through() {
        let request = EvaluateSignalsRequest::Inline {
            rules: vec![Rule {
                name: "n".to_string(),
                kind: gateway_core::RuleKind::NoTicketLink,
                parameters: serde_json::json!({}),
            }],
        };
        let rule_set = request.into_rule_set().unwrap();
        assert_eq!(rule_set.rules.len(), 1);
    }

    /// A body matching neither the `{rules: [...]}` nor `{yaml: "..."}`
    /// shape must fail to deserialize so the route handler can turn it into
    /// a 400 rather than letting an untagged-enum mismatch surface as a 422.
    #[test]
    fn unknown_shape_fails_to_deserialize() {
        let body = serde_json::json!({ "nonsense": true });
        let result: Result<EvaluateSignalsRequest, _> = serde_json::from_value(body);
        assert!(result.is_err());
    }
}

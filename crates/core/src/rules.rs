// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Signal Evaluator rule configuration: the closed set of rule `kind`s and
//! the ordered list loaded from `RULES_PATH`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed set of rule kinds the Signal Evaluator knows how to run.
///
/// An unrecognized `kind` in a rules document is *not* a parse error — it is
/// recorded as a per-rule error in the evaluation result (§4.10), so this
/// type keeps an `Unknown` escape hatch rather than failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    StalePr,
    WipLimitExceeded,
    PrWithoutReview,
    NoTicketLink,
    #[serde(other)]
    Unknown,
}

crate::simple_display! {
    RuleKind {
        StalePr => "stale_pr",
        WipLimitExceeded => "wip_limit_exceeded",
        PrWithoutReview => "pr_without_review",
        NoTicketLink => "no_ticket_link",
        Unknown => "unknown",
    }
}

/// One entry in the rules document: `{name, kind, parameters}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub kind: RuleKind,
    #[serde(default)]
    pub parameters: Value,
}

/// The ordered list of rules loaded from `RULES_PATH`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<Rule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_deserializes_without_error() {
        let rule: Rule = serde_json::from_str(
            r#"{"name":"n","kind":"totally_made_up","parameters":{}}"#,
        )
        .unwrap();
        assert_eq!(rule.kind, RuleKind::Unknown);
    }

    #[test]
    fn known_kind_round_trips() {
        let rule = Rule {
            name: "stale".to_string(),
            kind: RuleKind::StalePr,
            parameters: serde_json::json!({"older_than_hours": 48}),
        };
        let json = serde_json::to_string(&rule).unwrap();
        let back: Rule = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, RuleKind::StalePr);
    }
}

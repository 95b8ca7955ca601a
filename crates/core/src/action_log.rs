// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! The append-only audit trail of every propose/decide/execute outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    pub struct ActionLogEntryId("act_");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Proposed,
    Approved,
    Declined,
    Executed,
    Failed,
}

crate::simple_display! {
    ActionOutcome {
        Proposed => "proposed",
        Approved => "approved",
        Declined => "declined",
        Executed => "executed",
        Failed => "failed",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub id: ActionLogEntryId,
    pub rule_name: String,
    pub subject: String,
    pub action: String,
    pub outcome: ActionOutcome,
    pub actor: String,
    pub trace_id: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActionLogEntry {
    pub rule_name: String,
    pub subject: String,
    pub action: String,
    pub outcome: ActionOutcome,
    pub actor: String,
    pub trace_id: String,
    pub payload: Value,
}

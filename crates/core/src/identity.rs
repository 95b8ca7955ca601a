// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Mapping from an external account to an internal user, used by Signal
//! Evaluator queries that need to attribute events to a person (e.g.
//! `wip_limit_exceeded` assignee counts) rather than a raw external id.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub external_type: String,
    pub external_id: String,
    pub user_id: String,
    pub metadata: Value,
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! DTOs for `POST /v1/policy/evaluate`.

use crate::validate::{non_empty, ValidationError};
use gateway_core::PolicyDecision;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyEvaluateRequest {
    pub kind: String,
    #[serde(default = "default_context")]
    pub context: Value,
}

fn default_context() -> Value {
    Value::Object(Default::default())
}

impl PolicyEvaluateRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_empty("kind", &self.kind)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PolicyEvaluateResponse {
    pub kind: String,
    #[serde(flatten)]
    pub decision: PolicyDecision,
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! DTO for `GET /v1/metrics/quotas`.

use gateway_core::QuotaKind;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct QuotaCounter {
    pub kind: QuotaKind,
    pub count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuotasResponse {
    pub quotas: Vec<QuotaCounter>,
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! `GET /v1/metrics/quotas`.

use axum::extract::State;
use axum::Json;
use gateway_core::QuotaKind;
use gateway_wire::quotas::{QuotaCounter, QuotasResponse};

use crate::context::AppContext;

pub async fn get_quotas(State(ctx): State<AppContext>) -> Json<QuotasResponse> {
    let snapshot = ctx.quotas.snapshot();
    let mut quotas: Vec<QuotaCounter> = QuotaKind::ALL
        .iter()
        .filter_map(|kind| snapshot.get(kind).map(|&(count, cap)| QuotaCounter { kind: *kind, count, cap }))
        .collect();
    quotas.sort_by_key(|q| q.kind.to_string());
    Json(QuotasResponse { quotas })
}

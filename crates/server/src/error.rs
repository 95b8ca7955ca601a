// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! The only place `GatewayError` becomes an HTTP response. Everything
//! upstream of this module just propagates `Result<_, GatewayError>`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gateway_core::GatewayError;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

fn status_for(err: &GatewayError) -> StatusCode {
    match err {
        GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
        GatewayError::Authentication(_) => StatusCode::UNAUTHORIZED,
        GatewayError::Authorization(_) => StatusCode::FORBIDDEN,
        GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
        GatewayError::Conflict(_) => StatusCode::CONFLICT,
        GatewayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        GatewayError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        GatewayError::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
        GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Wrapper so handlers can return `Result<T, ApiError>` and get `?`
/// conversion from any error that already maps onto `GatewayError`.
pub struct ApiError(pub GatewayError);

impl<E> From<E> for ApiError
where
    E: Into<GatewayError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "internal error");
        }
        let body = ErrorBody { code: self.0.code(), message: self.0.detail() };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

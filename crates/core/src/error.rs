// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! The error taxonomy from the system design: a fixed set of *kinds*, not
//! types, so every layer above `gateway-core` maps its own failures onto one
//! of these variants instead of inventing new status-code semantics.
//!
//! The HTTP layer (`gateway-server`) is the only place these convert to a
//! status code; everywhere else they propagate as `Result<_, GatewayError>`.

use thiserror::Error;

/// A stable, user-visible failure. Never carries a stack trace or `Debug`
/// output of an internal error — `detail` is always a short, safe string.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("not authorized: {0}")]
    Authorization(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("rate limited")]
    RateLimited,

    #[error("payload too large")]
    PayloadTooLarge,

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("gateway timeout")]
    GatewayTimeout,

    #[error("internal error")]
    Internal(String),
}

impl GatewayError {
    /// A stable machine-readable code, independent of the `Display` message.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "validation_error",
            GatewayError::Authentication(_) => "authentication_error",
            GatewayError::Authorization(_) => "authorization_error",
            GatewayError::NotFound(_) => "not_found",
            GatewayError::Conflict(_) => "conflict",
            GatewayError::RateLimited => "rate_limited",
            GatewayError::PayloadTooLarge => "payload_too_large",
            GatewayError::Unavailable(_) => "unavailable",
            GatewayError::GatewayTimeout => "gateway_timeout",
            GatewayError::Internal(_) => "internal_error",
        }
    }

    /// User-facing detail string. Never a `Debug`-formatted source error.
    pub fn detail(&self) -> String {
        match self {
            GatewayError::Validation(d)
            | GatewayError::Authentication(d)
            | GatewayError::Authorization(d)
            | GatewayError::NotFound(d)
            | GatewayError::Conflict(d)
            | GatewayError::Unavailable(d)
            | GatewayError::Internal(d) => d.clone(),
            GatewayError::RateLimited => "too many requests".to_string(),
            GatewayError::PayloadTooLarge => "payload exceeds the configured limit".to_string(),
            GatewayError::GatewayTimeout => "upstream call exceeded its deadline".to_string(),
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gateway-wire: request/response DTOs and validation for the HTTP surface.
//!
//! Every handler in `gateway-server` takes one of these structs in, produces
//! one of these structs (or a `gateway_core::GatewayError`) out. Validation
//! happens here so handlers stay thin dispatch over already-checked data —
//! the "compile-time request/response structs with explicit validation
//! functions" pattern from the system design's Design Notes.

pub mod approvals;
pub mod policy;
pub mod quotas;
pub mod signals;
pub mod validate;
pub mod webhooks;
pub mod workflows;

pub use validate::ValidationError;

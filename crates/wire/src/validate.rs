// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Explicit validation functions returning a [`ValidationError`] — no
//! derive-macro magic, no implicit coercion. Each function validates one
//! field's constraint so call sites read as a checklist.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

impl From<ValidationError> for gateway_core::GatewayError {
    fn from(err: ValidationError) -> Self {
        gateway_core::GatewayError::Validation(format!("{}: {}", err.field, err.message))
    }
}

pub fn max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

pub fn non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn max_len_rejects_over_limit() {
        assert!(max_len("subject", &"a".repeat(256), 255).is_err());
        assert!(max_len("subject", &"a".repeat(255), 255).is_ok());
    }

    #[test]
    fn non_empty_rejects_blank() {
        assert!(non_empty("action", "   ").is_err());
        assert!(non_empty("action", "nudge").is_ok());
    }

    proptest! {
        /// §8 boundary case: a body exactly at the limit is accepted, one
        /// character over is rejected — for any limit and any ASCII string,
        /// not just the subject/action/reason field sizes used in practice.
        #[test]
        fn max_len_boundary_holds_for_any_length(max in 0usize..2000, len in 0usize..2000) {
            let value = "a".repeat(len);
            let result = max_len("field", &value, max);
            prop_assert_eq!(result.is_ok(), len <= max);
        }

        #[test]
        fn non_empty_accepts_iff_trimmed_is_non_empty(value in "[ \t]{0,5}[a-zA-Z0-9]{0,5}[ \t]{0,5}") {
            let expected_ok = !value.trim().is_empty();
            prop_assert_eq!(non_empty("field", &value).is_ok(), expected_ok);
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

use super::{Headers, SignatureError, SignatureVerifier};
use chrono::{DateTime, Utc};

/// Used when no signing secret is configured for a source, or for sources
/// whose webhook scheme has no signature at all (e.g. `prometheus` token
/// auth handled upstream by a reverse proxy). Always accepts.
pub struct NoneVerifier;

impl SignatureVerifier for NoneVerifier {
    fn verify(&self, _headers: &Headers, _body: &[u8], _now: DateTime<Utc>) -> Result<(), SignatureError> {
        Ok(())
    }
}

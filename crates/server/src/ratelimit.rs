// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Per-IP request throttling at the HTTP edge, built on `tower_governor`'s
//! GCRA limiter rather than a hand-rolled counter — the ecosystem crate
//! already implements the sliding-window behavior §4.8 asks for (burst
//! capacity `N` over the configured window, replenishing gradually rather
//! than resetting on a clock boundary).
//!
//! `X-Forwarded-For` is only honored when `TRUST_FORWARDED_FOR=true`;
//! unconditionally trusting a client-supplied header is a spoofing vector
//! (recorded as a resolved Open Question in DESIGN.md).

use std::sync::Arc;
use tower_governor::governor::GovernorConfig;
use tower_governor::key_extractor::{PeerIpKeyExtractor, SmartIpKeyExtractor};
use tower_governor::GovernorLayer;

use crate::config::GatewayConfig;

/// Builds the `tower_governor` layer applied to every route except
/// health/readiness/metrics (registered ahead of this layer in
/// `routes::build_router`).
///
/// `rate_limit_per_min` requests are allowed as an initial burst; after that
/// the bucket refills at `rate_limit_per_min` per 60 seconds. Two requests
/// landing back-to-back on a window sized for `N=rate_limit_per_min` consume
/// the whole burst in the boundary cases §8 describes.
#[allow(clippy::expect_used)]
pub fn layer(config: &GatewayConfig) -> GovernorLayer {
    let per_second = (config.rate_limit_per_min.max(1) as u64).div_ceil(60);
    let burst_size = config.rate_limit_per_min.max(1);

    if config.trust_forwarded_for {
        let governor_config: GovernorConfig<SmartIpKeyExtractor, _> = GovernorConfig::builder()
            .key_extractor(SmartIpKeyExtractor)
            .per_second(per_second)
            .burst_size(burst_size)
            .finish()
            .expect("static governor configuration is always valid");
        GovernorLayer::new(Arc::new(governor_config))
    } else {
        let governor_config: GovernorConfig<PeerIpKeyExtractor, _> = GovernorConfig::builder()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(per_second)
            .burst_size(burst_size)
            .finish()
            .expect("static governor configuration is always valid");
        GovernorLayer::new(Arc::new(governor_config))
    }
}

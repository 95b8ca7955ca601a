// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Black-box specs for the `gatewayctl` operator CLI. These run the built
//! binary directly — no database required — exercising the offline
//! validate/replay paths a reviewer would otherwise have to check by hand.

mod prelude;

mod cli;

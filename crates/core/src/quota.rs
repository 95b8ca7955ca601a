// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Daily-reset counters guarding outbound side effects.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaKind {
    SlackPosts,
    RagSearches,
}

crate::simple_display! {
    QuotaKind {
        SlackPosts => "slack_posts",
        RagSearches => "rag_searches",
    }
}

impl QuotaKind {
    pub const ALL: &'static [QuotaKind] = &[QuotaKind::SlackPosts, QuotaKind::RagSearches];
}

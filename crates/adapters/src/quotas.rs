// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Process-wide daily quota counters guarding outbound side effects.
//!
//! Counters live in memory only — per §5 "no cross-process shared mutable
//! state other than the database and broker" — so a multi-instance
//! deployment enforces the cap per instance, not globally. That tradeoff is
//! recorded in the design notes rather than hidden.

use chrono::{NaiveDate, Utc};
use gateway_core::QuotaKind;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
#[error("daily quota exceeded for {kind}")]
pub struct QuotaExceeded {
    pub kind: QuotaKind,
}

struct Counter {
    day: NaiveDate,
    count: AtomicI64,
}

/// Tracks one `AtomicI64` per [`QuotaKind`], resetting to zero whenever the
/// wall-clock day changes. `check_and_increment` is the only mutating entry
/// point executors call.
pub struct QuotaTracker {
    caps: HashMap<QuotaKind, i64>,
    counters: Mutex<HashMap<QuotaKind, Counter>>,
}

impl QuotaTracker {
    pub fn new(caps: HashMap<QuotaKind, i64>) -> Self {
        Self { caps, counters: Mutex::new(HashMap::new()) }
    }

    pub fn shared(caps: HashMap<QuotaKind, i64>) -> Arc<Self> {
        Arc::new(Self::new(caps))
    }

    /// Increments the counter for `kind` if doing so would not exceed its
    /// configured cap, returning the new count. A `kind` with no configured
    /// cap is treated as unlimited.
    pub fn check_and_increment(&self, kind: QuotaKind) -> Result<i64, QuotaExceeded> {
        let Some(&cap) = self.caps.get(&kind) else {
            return Ok(0);
        };
        let today = Utc::now().date_naive();
        let mut counters = self.counters.lock();
        let counter = counters.entry(kind).or_insert_with(|| Counter {
            day: today,
            count: AtomicI64::new(0),
        });

        if counter.day != today {
            counter.day = today;
            counter.count.store(0, Ordering::SeqCst);
        }

        let next = counter.count.fetch_add(1, Ordering::SeqCst) + 1;
        if next > cap {
            counter.count.fetch_sub(1, Ordering::SeqCst);
            return Err(QuotaExceeded { kind });
        }
        Ok(next)
    }

    pub fn current_count(&self, kind: QuotaKind) -> i64 {
        let today = Utc::now().date_naive();
        let counters = self.counters.lock();
        match counters.get(&kind) {
            Some(counter) if counter.day == today => counter.count.load(Ordering::SeqCst),
            _ => 0,
        }
    }

    pub fn snapshot(&self) -> HashMap<QuotaKind, (i64, Option<i64>)> {
        let today = Utc::now().date_naive();
        let counters = self.counters.lock();
        QuotaKind::ALL
            .iter()
            .map(|&kind| {
                let count = match counters.get(&kind) {
                    Some(counter) if counter.day == today => counter.count.load(Ordering::SeqCst),
                    _ => 0,
                };
                (kind, (count, self.caps.get(&kind).copied()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_once_cap_reached() {
        let mut caps = HashMap::new();
        caps.insert(QuotaKind::SlackPosts, 2);
        let tracker = QuotaTracker::new(caps);

        assert_eq!(tracker.check_and_increment(QuotaKind::SlackPosts).unwrap(), 1);
        assert_eq!(tracker.check_and_increment(QuotaKind::SlackPosts).unwrap(), 2);
        assert!(tracker.check_and_increment(QuotaKind::SlackPosts).is_err());
    }

    #[test]
    fn unconfigured_kind_is_unlimited() {
        let tracker = QuotaTracker::new(HashMap::new());
        for _ in 0..10 {
            assert!(tracker.check_and_increment(QuotaKind::RagSearches).is_ok());
        }
    }
}

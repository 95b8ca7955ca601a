// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Clock abstraction for testable time handling.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// A clock that provides the current time.
///
/// Evaluator ticks, quota day-boundaries, and approval TTL expiry all read
/// the clock through this trait so tests can advance time deterministically
/// instead of sleeping.
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Real system clock.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fake clock for testing with controllable time.
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self { current: Arc::new(Mutex::new(Utc::now())) }
    }

    pub fn at(when: DateTime<Utc>) -> Self {
        Self { current: Arc::new(Mutex::new(when)) }
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, duration: Duration) {
        let delta = chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::zero());
        *self.current.lock() += delta;
    }

    /// Set the clock to a specific instant.
    pub fn set(&self, when: DateTime<Utc>) {
        *self.current.lock() = when;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_clock_advances() {
        let clock = FakeClock::at(Utc::now());
        let first = clock.now();
        clock.advance(Duration::from_secs(60));
        assert!(clock.now() > first);
    }

    #[test]
    fn fake_clock_set_is_absolute() {
        let clock = FakeClock::new();
        let target = Utc::now() + chrono::Duration::days(1);
        clock.set(target);
        assert_eq!(clock.now(), target);
    }
}

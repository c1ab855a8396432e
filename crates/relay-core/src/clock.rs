// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time abstraction so retry/TTL logic can be tested without real sleeps.

use std::time::{Duration, Instant};

/// Source of monotonic time.
///
/// The router and the TTL map both read `now()` rather than calling
/// `Instant::now()` directly, so tests can drive deterministic time
/// without sleeping for the real duration of a backoff or TTL window.
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// Real wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests.
#[derive(Clone)]
pub struct FakeClock {
    inner: std::sync::Arc<parking_lot::Mutex<Instant>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            inner: std::sync::Arc::new(parking_lot::Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, d: Duration) {
        let mut t = self.inner.lock();
        *t += d;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        *self.inner.lock()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;

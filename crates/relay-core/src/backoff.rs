// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential backoff with jitter, shared by the router's retry path
//! and exercised directly in tests for precision that would be awkward
//! to assert on through a live `tokio::time::sleep`.

use rand::Rng;
use std::time::Duration;

/// Compute the pre-jitter delay for retry attempt `attempt` (1-indexed):
/// `min(initial * 2^(attempt-1), max)`.
pub fn base_delay(attempt: u32, initial: Duration, max: Duration) -> Duration {
    let attempt = attempt.max(1);
    let shift = attempt.saturating_sub(1).min(31);
    let scaled = initial.as_millis().saturating_mul(1u128 << shift);
    let capped = scaled.min(max.as_millis());
    Duration::from_millis(capped.min(u128::from(u64::MAX)) as u64)
}

/// Compute the final scheduled delay: base delay with symmetric ±10%
/// jitter, clamped back into `[initial, max]`.
///
/// `rng` is injected so callers can hold it behind a single
/// router-owned mutex without this function needing to know about that
/// lock.
pub fn compute_delay(
    attempt: u32,
    initial: Duration,
    max: Duration,
    rng: &mut impl Rng,
) -> Duration {
    let base = base_delay(attempt, initial, max);
    let jitter_frac = rng.random_range(-0.10..=0.10);
    let base_ms = base.as_millis() as f64;
    let jittered_ms = (base_ms + base_ms * jitter_frac).max(0.0);
    let jittered = Duration::from_millis(jittered_ms.round() as u64);
    jittered.clamp(initial, max)
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;

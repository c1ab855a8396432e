// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The idempotency table: `idempotency_key -> expiry`.
//!
//! Held behind the router's single lock, so this type itself does no
//! locking of its own — it's a plain `HashMap` wrapper the router
//! mutates under its write guard.

use std::collections::HashMap;
use std::time::Instant;

#[derive(Debug, Default)]
pub(crate) struct IdempotencyTable {
    entries: HashMap<String, Instant>,
}

impl IdempotencyTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// True if `key` has an unexpired entry as of `now`.
    pub(crate) fn is_duplicate(&self, key: &str, now: Instant) -> bool {
        matches!(self.entries.get(key), Some(expiry) if *expiry > now)
    }

    /// Record `key` as dispatched until `now + ttl`. Never refreshed on
    /// retry and never deleted on success: it expires naturally so that
    /// duplicates during the window are dropped regardless of how the
    /// original dispatch resolved.
    pub(crate) fn insert(&mut self, key: String, expires_at: Instant) {
        self.entries.insert(key, expires_at);
    }

    /// Remove every entry whose expiry has passed.
    pub(crate) fn reap_expired(&mut self, now: Instant) {
        self.entries.retain(|_, expiry| *expiry > now);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
#[path = "idempotency_tests.rs"]
mod tests;

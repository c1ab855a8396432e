// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The 5-second avatar-change debounce window: repeat sightings of the
//! same `(scope, subject, new_value)` triple within the window are
//! dropped.
//!
//! A thin wrapper over C1 rather than a bespoke structure: the ingest
//! layer only needs "have I seen this triple recently", which is
//! exactly a TTL-map membership check.

use relay_cache::{TtlMap, TtlMapConfig};
use std::time::Duration;

pub const AVATAR_DEBOUNCE_WINDOW: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct AvatarDebounce {
    seen: TtlMap<String, ()>,
}

impl AvatarDebounce {
    pub fn new() -> Self {
        Self {
            seen: TtlMap::new(TtlMapConfig {
                default_ttl: AVATAR_DEBOUNCE_WINDOW,
                max_size: None,
                cleanup_interval: Duration::from_secs(10),
            }),
        }
    }

    fn key(scope: &str, subject: &str, new_value: &str) -> String {
        format!("{scope}:{subject}:{new_value}")
    }

    /// Returns `true` if `(scope, subject, new_value)` was seen within
    /// the debounce window and should be dropped. Otherwise records it
    /// and returns `false`.
    pub fn check_and_record(&self, scope: &str, subject: &str, new_value: &str) -> bool {
        let key = Self::key(scope, subject, new_value);
        if self.seen.has(&key) {
            return true;
        }
        self.seen.set(key, (), Duration::ZERO);
        false
    }

    pub fn close(&self) {
        self.seen.close();
    }
}

impl Default for AvatarDebounce {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "debounce_tests.rs"]
mod tests;

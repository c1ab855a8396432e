// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `message_events` TTL map (C1) used by the edit/delete services
//! to recover a message's original content.
//!
//! Entries are keyed by the composite `"<scope>:<message_id>"` form,
//! never by the bare message id — deleting by the bare id against a map
//! populated under the composite key would silently never find the
//! entry. Every path here goes through [`MessageEventsStore::key`] so a
//! bare-id lookup can't be written by accident.

use relay_cache::{TtlMap, TtlMapConfig};
use relay_core::scope::scoped_key;
use relay_tasks::MessageSnapshot;
use std::time::Duration;

pub const DEFAULT_MESSAGE_EVENTS_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone)]
pub struct MessageEventsStore {
    map: TtlMap<String, MessageSnapshot>,
}

impl MessageEventsStore {
    pub fn new() -> Self {
        Self {
            map: TtlMap::new(TtlMapConfig {
                default_ttl: DEFAULT_MESSAGE_EVENTS_TTL,
                max_size: None,
                cleanup_interval: Duration::from_secs(60),
            }),
        }
    }

    fn key(scope: &str, message_id: &str) -> String {
        // Malformed scope/message-id pairs (containing `:`) can't round
        // trip through `scoped_key`; fall back to a raw join so a
        // record still lands under a stable, if unsplittable, key
        // rather than being silently dropped.
        scoped_key(scope, message_id).unwrap_or_else(|_| format!("{scope}:{message_id}"))
    }

    /// Remember a freshly-posted message so a later edit/delete can
    /// recover its original content.
    pub fn record(&self, scope: &str, snapshot: MessageSnapshot) {
        let key = Self::key(scope, &snapshot.message_id);
        self.map.set(key, snapshot, Duration::ZERO);
    }

    /// Fetch the original snapshot for `(scope, message_id)`, if still
    /// live.
    pub fn get(&self, scope: &str, message_id: &str) -> Option<MessageSnapshot> {
        self.map.get(&Self::key(scope, message_id))
    }

    /// Remove the snapshot for `(scope, message_id)`. Intentionally
    /// takes both halves rather than a bare message id so callers can't
    /// reproduce the composite-key defect described above.
    pub fn delete(&self, scope: &str, message_id: &str) {
        self.map.delete(&Self::key(scope, message_id));
    }

    pub fn close(&self) {
        self.map.close();
    }
}

impl Default for MessageEventsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "message_store_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The work unit dispatched into the router.

use std::time::Duration;

/// Per-task dispatch options. A zero/empty field means "use the router
/// default", resolved fresh both at enqueue time and at each retry so a
/// handler re-registration or a default change in between takes effect.
#[derive(Debug, Clone, Default)]
pub struct TaskOptions {
    /// Tasks sharing a `group_key` execute serialized, FIFO, never
    /// concurrently (subject to `group_max_parallel`). Empty maps to the
    /// sentinel `_global` group at the router boundary.
    pub group_key: String,
    /// Dedup token. Empty skips the idempotency check entirely.
    pub idempotency_key: String,
    /// Zero means "router default".
    pub idempotency_ttl: Duration,
    /// Zero means "router default".
    pub max_attempts: u32,
    /// Zero means "router default".
    pub initial_backoff: Duration,
    /// Zero means "router default".
    pub max_backoff: Duration,
}

impl TaskOptions {
    pub fn with_group(mut self, group_key: impl Into<String>) -> Self {
        self.group_key = group_key.into();
        self
    }

    pub fn with_idempotency(mut self, key: impl Into<String>, ttl: Duration) -> Self {
        self.idempotency_key = key.into();
        self.idempotency_ttl = ttl;
        self
    }
}

/// A unit of work dispatched into the router.
///
/// `payload` is opaque to the router: it is interpreted only by the
/// handler registered for `task_type`. Constructed by a producer (C4),
/// lives until final success or exhausted retries, and is never
/// persisted — a crash drops in-flight work rather than replaying it.
#[derive(Debug, Clone)]
pub struct Task {
    pub task_type: String,
    pub payload: serde_json::Value,
    pub options: TaskOptions,
}

impl Task {
    pub fn new(task_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            task_type: task_type.into(),
            payload,
            options: TaskOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TaskOptions) -> Self {
        self.options = options;
        self
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;

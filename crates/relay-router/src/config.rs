// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Router-wide configuration knobs and per-dispatch option resolution.

use relay_core::task::TaskOptions;
use std::time::Duration;

/// Construction-time router defaults. A zero-valued field (other than
/// `global_max_workers`, where `0` legitimately means unlimited) is
/// replaced with a sensible default by [`RouterConfig::resolve`].
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub default_max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub idempotency_ttl: Duration,
    pub group_buffer: usize,
    pub group_idle_ttl: Duration,
    pub cleanup_interval: Duration,
    /// `0` means unlimited — no global semaphore is created.
    pub global_max_workers: usize,
    pub group_max_parallel: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(30),
            idempotency_ttl: Duration::from_secs(60),
            group_buffer: 64,
            group_idle_ttl: Duration::from_secs(300),
            cleanup_interval: Duration::from_secs(30),
            global_max_workers: 0,
            group_max_parallel: 1,
        }
    }
}

impl RouterConfig {
    /// Replaces zero-valued fields with the built-in defaults. Called
    /// once at [`crate::Router::new`].
    pub fn resolve(self) -> Self {
        let default = Self::default();
        Self {
            default_max_attempts: if self.default_max_attempts == 0 {
                default.default_max_attempts
            } else {
                self.default_max_attempts
            },
            initial_backoff: if self.initial_backoff.is_zero() {
                default.initial_backoff
            } else {
                self.initial_backoff
            },
            max_backoff: if self.max_backoff.is_zero() {
                default.max_backoff
            } else {
                self.max_backoff
            },
            idempotency_ttl: if self.idempotency_ttl.is_zero() {
                default.idempotency_ttl
            } else {
                self.idempotency_ttl
            },
            group_buffer: if self.group_buffer == 0 {
                default.group_buffer
            } else {
                self.group_buffer
            },
            group_idle_ttl: if self.group_idle_ttl.is_zero() {
                default.group_idle_ttl
            } else {
                self.group_idle_ttl
            },
            cleanup_interval: if self.cleanup_interval.is_zero() {
                default.cleanup_interval
            } else {
                self.cleanup_interval
            },
            global_max_workers: self.global_max_workers,
            group_max_parallel: if self.group_max_parallel == 0 {
                default.group_max_parallel
            } else {
                self.group_max_parallel
            },
        }
    }
}

/// The sentinel group used when `TaskOptions::group_key` is empty.
pub(crate) const GLOBAL_GROUP: &str = "_global";

/// Per-dispatch options after merging task-level overrides with router
/// defaults. Recomputed at enqueue and at every retry, so a handler
/// re-registration or config change between attempts is observed.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedOptions {
    pub group_key: String,
    pub idempotency_key: String,
    pub idempotency_ttl: Duration,
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

pub(crate) fn resolve_options(opts: &TaskOptions, config: &RouterConfig) -> ResolvedOptions {
    ResolvedOptions {
        group_key: if opts.group_key.is_empty() {
            GLOBAL_GROUP.to_string()
        } else {
            opts.group_key.clone()
        },
        idempotency_key: opts.idempotency_key.clone(),
        idempotency_ttl: if opts.idempotency_ttl.is_zero() {
            config.idempotency_ttl
        } else {
            opts.idempotency_ttl
        },
        max_attempts: if opts.max_attempts == 0 {
            config.default_max_attempts
        } else {
            opts.max_attempts
        },
        initial_backoff: if opts.initial_backoff.is_zero() {
            config.initial_backoff
        } else {
            opts.initial_backoff
        },
        max_backoff: if opts.max_backoff.is_zero() {
            config.max_backoff
        } else {
            opts.max_backoff
        },
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

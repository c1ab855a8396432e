// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron jobs: periodic tasks injected by the router's own sweep tick.

use relay_core::task::Task;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How a cron job produces the `Task` it dispatches on each due tick.
///
/// Most jobs dispatch the same `Task` every time (`Fixed`). A job whose
/// idempotency key is derived from the dispatch time itself — the
/// avatar-flush cron's bucketed key, for instance — needs the task
/// rebuilt fresh on every tick instead of cloning a stale one, so it's
/// registered with `Rebuild`.
pub(crate) enum CronSource {
    Fixed(Task),
    Rebuild(Arc<dyn Fn() -> Task + Send + Sync>),
}

pub(crate) struct CronJob {
    pub(crate) interval: Duration,
    pub(crate) source: CronSource,
    pub(crate) last_run: Option<Instant>,
    pub(crate) stopped: bool,
}

impl CronJob {
    pub(crate) fn new(interval: Duration, task: Task) -> Self {
        Self {
            interval,
            source: CronSource::Fixed(task),
            last_run: None,
            stopped: false,
        }
    }

    pub(crate) fn with_builder(
        interval: Duration,
        builder: Arc<dyn Fn() -> Task + Send + Sync>,
    ) -> Self {
        Self {
            interval,
            source: CronSource::Rebuild(builder),
            last_run: None,
            stopped: false,
        }
    }

    /// Due when never run, or `now - last_run >= interval`.
    pub(crate) fn is_due(&self, now: Instant) -> bool {
        if self.stopped {
            return false;
        }
        match self.last_run {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    /// The task to dispatch for this tick: cloned if fixed, rebuilt
    /// fresh if the job needs tick-time state (e.g. a bucketed
    /// idempotency key).
    pub(crate) fn build_task(&self) -> Task {
        match &self.source {
            CronSource::Fixed(task) => task.clone(),
            CronSource::Rebuild(builder) => builder(),
        }
    }
}

#[cfg(test)]
#[path = "cron_tests.rs"]
mod tests;

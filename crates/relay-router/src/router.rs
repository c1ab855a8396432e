// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The task router itself (C3) — registry, idempotency, grouping,
//! retries, idle reclamation, cron, and shutdown.

use crate::config::{resolve_options, RouterConfig};
use crate::cron::CronJob;
use crate::error::RouterError;
use crate::group::{GroupWorker, QueuedTask};
use crate::handler::{HandlerError, HandlerFn};
use crate::idempotency::IdempotencyTable;
use rand::rngs::StdRng;
use rand::SeedableRng;
use relay_core::backoff::compute_delay;
use relay_core::clock::{Clock, SystemClock};
use relay_core::task::Task;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Read-only snapshot of live router state, useful for introspection
/// and exercised directly by the idle-GC test below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterStats {
    pub groups_count: usize,
    pub idempotency_entries: usize,
    pub in_flight: usize,
}

struct RouterState<Ctx> {
    handlers: HashMap<String, HandlerFn<Ctx>>,
    groups: HashMap<String, Arc<GroupWorker<Task>>>,
    idempotency: IdempotencyTable,
    closed: bool,
}

struct Shared<Ctx, C: Clock> {
    state: parking_lot::RwLock<RouterState<Ctx>>,
    crons: parking_lot::Mutex<Vec<CronJob>>,
    rng: parking_lot::Mutex<StdRng>,
    semaphore: Option<Arc<Semaphore>>,
    config: RouterConfig,
    ctx: Arc<Ctx>,
    clock: C,
    in_flight: AtomicUsize,
    sweep_cancel: CancellationToken,
    sweep_handle: parking_lot::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

/// The task-dispatch subsystem.
///
/// Cloning shares the same underlying runtime state (cheap `Arc`
/// handle); the daemon keeps one clone per registered ingest/cron
/// producer.
pub struct Router<Ctx, C: Clock = SystemClock> {
    shared: Arc<Shared<Ctx, C>>,
}

impl<Ctx, C: Clock> Clone for Router<Ctx, C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<Ctx> Router<Ctx, SystemClock>
where
    Ctx: Send + Sync + 'static,
{
    /// Build a router using the real system clock, bound to `ctx` for
    /// the lifetime of every handler call. Spawns the background sweep
    /// task; must be called from within a Tokio runtime.
    pub fn new(config: RouterConfig, ctx: Arc<Ctx>) -> Self {
        Self::with_clock(config, ctx, SystemClock)
    }
}

impl<Ctx, C> Router<Ctx, C>
where
    Ctx: Send + Sync + 'static,
    C: Clock,
{
    pub fn with_clock(config: RouterConfig, ctx: Arc<Ctx>, clock: C) -> Self {
        let config = config.resolve();
        let semaphore = if config.global_max_workers > 0 {
            Some(Arc::new(Semaphore::new(config.global_max_workers)))
        } else {
            None
        };

        let shared = Arc::new(Shared {
            state: parking_lot::RwLock::new(RouterState {
                handlers: HashMap::new(),
                groups: HashMap::new(),
                idempotency: IdempotencyTable::new(),
                closed: false,
            }),
            crons: parking_lot::Mutex::new(Vec::new()),
            rng: parking_lot::Mutex::new(StdRng::from_os_rng()),
            semaphore,
            config,
            ctx,
            clock,
            in_flight: AtomicUsize::new(0),
            sweep_cancel: CancellationToken::new(),
            sweep_handle: parking_lot::Mutex::new(None),
        });

        let router = Self { shared };
        let handle = spawn_sweep(router.clone());
        *router.shared.sweep_handle.lock() = Some(handle);
        router
    }

    /// Register the handler invoked for tasks of `task_type`. Re-
    /// registering a type replaces its handler; in-flight tasks already
    /// dispatched under the old handler still resolve the handler fresh
    /// at execution time, so a replacement takes effect on the very next
    /// dequeue.
    pub fn register_handler<F, Fut>(&self, task_type: impl Into<String>, handler: F)
    where
        F: Fn(Arc<Ctx>, serde_json::Value) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let boxed: HandlerFn<Ctx> = Arc::new(move |ctx, payload| Box::pin(handler(ctx, payload)));
        self.shared
            .state
            .write()
            .handlers
            .insert(task_type.into(), boxed);
    }

    /// Register a cron job: dispatches `task` through the normal
    /// dispatch path every time the sweep observes `interval` elapsed
    /// since the last run. Cron precision is therefore bounded below by
    /// `cleanup_interval` — a deliberate trade-off, not a defect.
    ///
    /// `task` is cloned unchanged on every tick. For a task whose
    /// idempotency key must be derived from the dispatch time itself,
    /// use [`Router::register_cron_with`] instead so the key is
    /// recomputed on each firing rather than frozen at registration.
    pub fn register_cron(&self, interval: std::time::Duration, task: Task) {
        self.shared.crons.lock().push(CronJob::new(interval, task));
    }

    /// Register a cron job whose task is rebuilt fresh on every due
    /// tick via `builder`, rather than cloned from a task fixed at
    /// registration time.
    pub fn register_cron_with<F>(&self, interval: std::time::Duration, builder: F)
    where
        F: Fn() -> Task + Send + Sync + 'static,
    {
        self.shared
            .crons
            .lock()
            .push(CronJob::with_builder(interval, std::sync::Arc::new(builder)));
    }

    /// Dispatch a task: resolve idempotency and grouping synchronously,
    /// then hand off to the group's queue. Returns once the task is
    /// enqueued (or rejected) — execution happens asynchronously.
    pub async fn dispatch(&self, task: Task) -> Result<(), RouterError> {
        self.dispatch_cancellable(task, None).await
    }

    /// As [`Router::dispatch`], but honors a caller-supplied
    /// cancellation token: if cancelled before the task is fully
    /// enqueued, returns [`RouterError::EnqueueCancelled`].
    pub async fn dispatch_cancellable(
        &self,
        task: Task,
        cancel: Option<CancellationToken>,
    ) -> Result<(), RouterError> {
        let now = self.shared.clock.now();

        let group = {
            let mut state = self.shared.state.write();
            if state.closed {
                return Err(RouterError::Closed);
            }
            if !state.handlers.contains_key(&task.task_type) {
                return Err(RouterError::UnknownType(task.task_type.clone()));
            }

            let resolved = resolve_options(&task.options, &self.shared.config);

            if !resolved.idempotency_key.is_empty() {
                if state
                    .idempotency
                    .is_duplicate(&resolved.idempotency_key, now)
                {
                    return Err(RouterError::Duplicate(resolved.idempotency_key));
                }
                state
                    .idempotency
                    .insert(resolved.idempotency_key.clone(), now + resolved.idempotency_ttl);
            }

            self.get_or_create_group_locked(&mut state, &resolved.group_key, now)
        };

        let queued = QueuedTask { task, attempt: 1 };
        let enqueue = group.enqueue(queued, now);

        let result = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => return Err(RouterError::EnqueueCancelled),
                r = enqueue => r,
            },
            None => enqueue.await,
        };

        // Send only fails if every consumer task for this group has
        // already exited (the group was GC'd mid-enqueue); that can
        // only happen if the router is shutting down.
        result.map_err(|_| RouterError::Closed)
    }

    fn get_or_create_group_locked(
        &self,
        state: &mut RouterState<Ctx>,
        group_key: &str,
        now: std::time::Instant,
    ) -> Arc<GroupWorker<Task>> {
        if let Some(existing) = state.groups.get(group_key) {
            return Arc::clone(existing);
        }

        let router = self.clone();
        let buffer = self.shared.config.group_buffer;
        let parallel = self.shared.config.group_max_parallel;
        let worker = GroupWorker::spawn(
            group_key.to_string(),
            buffer,
            parallel,
            now,
            move |queued| {
                let router = router.clone();
                async move { router.run_task(queued).await }
            },
        );
        state.groups.insert(group_key.to_string(), Arc::clone(&worker));
        worker
    }

    async fn run_task(&self, queued: QueuedTask<Task>) {
        let QueuedTask { task, attempt } = queued;

        let (handler, resolved) = {
            let state = self.shared.state.read();
            let handler = state.handlers.get(&task.task_type).cloned();
            (handler, resolve_options(&task.options, &self.shared.config))
        };

        let Some(handler) = handler else {
            tracing::warn!(
                task_type = %task.task_type,
                group = %resolved.group_key,
                "handler deregistered since enqueue, dropping task"
            );
            return;
        };

        let _permit = match &self.shared.semaphore {
            Some(sem) => match sem.clone().acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(_) => return, // semaphore closed: router shutting down
            },
            None => None,
        };

        self.shared.in_flight.fetch_add(1, Ordering::SeqCst);
        let outcome = handler(Arc::clone(&self.shared.ctx), task.payload.clone()).await;
        self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);

        match outcome {
            Ok(()) => {
                tracing::info!(
                    task_type = %task.task_type,
                    group = %resolved.group_key,
                    attempt,
                    "task completed"
                );
            }
            Err(err) => {
                if attempt < resolved.max_attempts {
                    self.schedule_retry(task, attempt, &resolved, err);
                } else {
                    tracing::warn!(
                        task_type = %task.task_type,
                        group = %resolved.group_key,
                        attempt,
                        error = %err,
                        "task reached max attempts, terminal failure"
                    );
                }
            }
        }
    }

    fn schedule_retry(
        &self,
        task: Task,
        attempt: u32,
        resolved: &crate::config::ResolvedOptions,
        err: HandlerError,
    ) {
        let delay = {
            let mut rng = self.shared.rng.lock();
            compute_delay(attempt, resolved.initial_backoff, resolved.max_backoff, &mut *rng)
        };

        tracing::warn!(
            task_type = %task.task_type,
            group = %resolved.group_key,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "task failed, scheduling retry"
        );

        let router = self.clone();
        let group_key = resolved.group_key.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let now = router.shared.clock.now();
            let group = {
                let mut state = router.shared.state.write();
                if state.closed {
                    tracing::debug!(task_type = %task.task_type, "router closed, dropping scheduled retry");
                    return;
                }
                router.get_or_create_group_locked(&mut state, &group_key, now)
            };

            let queued = QueuedTask {
                task,
                attempt: attempt + 1,
            };
            let _ = group.enqueue(queued, now).await;
        });
    }

    /// Point-in-time stats snapshot.
    pub fn stats(&self) -> RouterStats {
        let state = self.shared.state.read();
        RouterStats {
            groups_count: state.groups.len(),
            idempotency_entries: state.idempotency.len(),
            in_flight: self.shared.in_flight.load(Ordering::SeqCst),
        }
    }

    /// Idempotent shutdown: marks every group stopping, closes every
    /// group channel, and waits for in-flight handler calls and the
    /// sweep task to finish. After `close()`, `dispatch` fails with
    /// [`RouterError::Closed`].
    pub async fn close(&self) {
        let groups = {
            let mut state = self.shared.state.write();
            if state.closed {
                return;
            }
            state.closed = true;
            for group in state.groups.values() {
                group.mark_stopping();
            }
            state.groups.drain().map(|(_, v)| v).collect::<Vec<_>>()
        };

        // Dropping the last Arc to each group drops its `GroupWorker`,
        // which drops the channel sender, which closes the channel and
        // lets every consumer task finish its current pop and exit.
        drop(groups);

        self.shared.sweep_cancel.cancel();
        if let Some(handle) = self.shared.sweep_handle.lock().take() {
            let _ = handle.await;
        }
    }
}

fn spawn_sweep<Ctx, C>(router: Router<Ctx, C>) -> tokio::task::JoinHandle<()>
where
    Ctx: Send + Sync + 'static,
    C: Clock,
{
    let interval = router.shared.config.cleanup_interval;
    let cancel = router.shared.sweep_cancel.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("router sweep task stopping");
                    break;
                }
                _ = ticker.tick() => {
                    router.sweep_tick().await;
                }
            }
        }
    })
}

impl<Ctx, C> Router<Ctx, C>
where
    Ctx: Send + Sync + 'static,
    C: Clock,
{
    async fn sweep_tick(&self) {
        let now = self.shared.clock.now();
        let group_idle_ttl = self.shared.config.group_idle_ttl;

        {
            let mut state = self.shared.state.write();
            state.idempotency.reap_expired(now);

            let idle_keys: Vec<String> = state
                .groups
                .iter()
                .filter(|(_, group)| {
                    !group.is_stopping()
                        && now.saturating_duration_since(group.last_active()) >= group_idle_ttl
                        && group.queue_is_empty()
                })
                .map(|(key, _)| key.clone())
                .collect();

            for key in idle_keys {
                if let Some(group) = state.groups.remove(&key) {
                    group.mark_stopping();
                    tracing::info!(group = %key, "group idle, reclaiming");
                }
            }
        }

        let due: Vec<Task> = {
            let mut crons = self.shared.crons.lock();
            crons
                .iter_mut()
                .filter(|job| job.is_due(now))
                .map(|job| {
                    job.last_run = Some(now);
                    job.build_task()
                })
                .collect()
        };

        for task in due {
            if let Err(err) = self.dispatch(task.clone()).await {
                tracing::debug!(task_type = %task.task_type, error = %err, "cron dispatch skipped");
            }
        }
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;

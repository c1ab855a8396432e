// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Group workers: one bounded FIFO queue per `group_key`, consumed by
//! `group_max_parallel` worker tasks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

pub(crate) struct QueuedTask<T> {
    pub(crate) task: T,
    pub(crate) attempt: u32,
}

/// A single group's runtime state: its queue sender and bookkeeping.
///
/// The receiving half is moved into the worker task(s) spawned at
/// creation; `GroupWorker` itself only ever sends.
pub(crate) struct GroupWorker<T> {
    pub(crate) key: String,
    sender: mpsc::Sender<QueuedTask<T>>,
    pub(crate) last_active: parking_lot::Mutex<Instant>,
    pub(crate) stopping: AtomicBool,
}

impl<T: Send + 'static> GroupWorker<T> {
    /// Spawn `parallel` consumer tasks draining a fresh bounded channel
    /// of capacity `buffer`, each invoking `run_one` for every item
    /// popped. Returns the worker handle; dropping the returned sender
    /// (via [`GroupWorker::close`]) lets every consumer task finish its
    /// current pop and exit.
    pub(crate) fn spawn<F, Fut>(
        key: String,
        buffer: usize,
        parallel: usize,
        now: Instant,
        run_one: F,
    ) -> Arc<Self>
    where
        F: Fn(QueuedTask<T>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let worker = Arc::new(Self {
            key,
            sender: tx,
            last_active: parking_lot::Mutex::new(now),
            stopping: AtomicBool::new(false),
        });

        // `group_max_parallel > 1` relaxes strict execution order but
        // every consumer pulls from the same channel, so enqueue order
        // into the channel is always preserved.
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let run_one = Arc::new(run_one);
        for _ in 0..parallel.max(1) {
            let rx = Arc::clone(&rx);
            let run_one = Arc::clone(&run_one);
            tokio::spawn(async move {
                loop {
                    let item = { rx.lock().await.recv().await };
                    match item {
                        Some(item) => run_one(item).await,
                        None => break,
                    }
                }
            });
        }

        worker
    }

    /// Enqueue `item`, stamping `last_active`. Fails only if every
    /// consumer task has already exited (channel closed).
    pub(crate) async fn enqueue(
        &self,
        item: QueuedTask<T>,
        now: Instant,
    ) -> Result<(), QueuedTask<T>> {
        *self.last_active.lock() = now;
        self.sender.send(item).await.map_err(|e| e.0)
    }

    pub(crate) fn mark_stopping(&self) {
        self.stopping.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    /// Closing happens implicitly: once every clone of `sender` is
    /// dropped the channel closes and consumer tasks exit. The router
    /// drops its own map entry for the group to release its clone; this
    /// method exists so the intent reads at the call site.
    pub(crate) fn last_active(&self) -> Instant {
        *self.last_active.lock()
    }

    /// Queue is considered idle-eligible when no sender-side work is
    /// outstanding. `mpsc::Sender` exposes no "is empty" probe directly,
    /// so callers combine this with `last_active` (idle for
    /// `group_idle_ttl` *and* queue empty). We approximate "queue empty"
    /// via the channel's capacity: a bounded channel with no in-flight
    /// sends has `capacity() == max_capacity()`.
    pub(crate) fn queue_is_empty(&self) -> bool {
        self.sender.capacity() == self.sender.max_capacity()
    }
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;

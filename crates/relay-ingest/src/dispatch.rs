// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decouples the ingest services from the router's `HandlerCtx` type
//! parameters: a service only needs to hand a [`Task`] off to *something*
//! that dispatches it. Ingest services never call a notifier directly —
//! they build a task via one of C4's producers and hand it off here.

use async_trait::async_trait;
use relay_core::clock::Clock;
use relay_core::task::Task;
use relay_router::Router;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("dispatch rejected: {0}")]
pub struct DispatchRejected(pub String);

#[async_trait]
pub trait Dispatcher: Send + Sync + 'static {
    async fn dispatch_task(&self, task: Task) -> Result<(), DispatchRejected>;
}

#[async_trait]
impl<Ctx, C> Dispatcher for Router<Ctx, C>
where
    Ctx: Send + Sync + 'static,
    C: Clock,
{
    async fn dispatch_task(&self, task: Task) -> Result<(), DispatchRejected> {
        self.dispatch(task)
            .await
            .map_err(|e| DispatchRejected(e.to_string()))
    }
}

/// Records every dispatched task instead of running it, for ingest
/// service tests (gated behind `test-support`).
#[cfg(any(test, feature = "test-support"))]
#[derive(Clone, Default)]
pub struct FakeDispatcher {
    tasks: std::sync::Arc<parking_lot::Mutex<Vec<Task>>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl Dispatcher for FakeDispatcher {
    async fn dispatch_task(&self, task: Task) -> Result<(), DispatchRejected> {
        self.tasks.lock().push(task);
        Ok(())
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The handler function shape registered per task type.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Opaque failure from a handler. Handlers surface whatever error type
/// fits their own work (an HTTP error, a serialization error, ...); the
/// router only needs to know that the attempt failed.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Type-erased handler stored in the router's registry.
pub(crate) type HandlerFn<Ctx> =
    Arc<dyn Fn(Arc<Ctx>, serde_json::Value) -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync>;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("router is closed")]
    Closed,

    #[error("no handler registered for task type {0:?}")]
    UnknownType(String),

    #[error("duplicate idempotency key {0:?}")]
    Duplicate(String),

    #[error("dispatch cancelled before enqueue")]
    EnqueueCancelled,
}

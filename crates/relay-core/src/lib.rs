// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relay-core: shared types for the chat automation runtime.
//!
//! Holds the pieces every other `relay-*` crate needs and that don't
//! belong to any single component: the `Task`/`TaskOptions` wire types,
//! the `Clock` abstraction used to make time-dependent tests
//! deterministic, the `scope:subject` composite-key helpers, and the
//! backoff math shared by the router's retry path.

pub mod backoff;
pub mod clock;
pub mod scope;
pub mod task;

pub use backoff::compute_delay;
pub use clock::{Clock, SystemClock};
pub use scope::{scoped_key, split_scoped_key, ScopeKeyError};
pub use task::{Task, TaskOptions};

#[cfg(any(test, feature = "test-support"))]
pub use clock::FakeClock;

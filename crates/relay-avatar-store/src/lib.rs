// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relay-avatar-store: the scope-partitioned, persistent avatar-hash
//! cache.
//!
//! Keyed by composite `(scope, subject)`, persisted as JSON via a
//! write-temp-then-rename sequence so the file is never observed
//! partially written, with transparent migration from a legacy
//! single-scope shape.

mod cache;
mod error;
mod schema;

pub use cache::{ScopeStats, ScopedCache, ScopedCacheStats};
pub use error::AvatarStoreError;
pub use schema::CURRENT_SCHEMA_VERSION;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The notifier collaborator contract: posting notification embeds to a
//! chat-platform destination. The chat-platform API client itself is
//! external; the core consumes it only through this trait.

use async_trait::async_trait;
use thiserror::Error;

/// A simple notification embed: a title, a body, and an ordered list of
/// `(name, value)` fields. Rendering into the platform's actual embed
/// format is the concrete adapter's job, not the core's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub fields: Vec<(String, String)>,
}

impl Embed {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }
}

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("notifier request failed: {0}")]
    RequestFailed(String),
}

/// Posts notification embeds to a resolved destination channel.
///
/// Assumed thread-safe by contract — the platform client backing a
/// concrete adapter is expected to handle its own internal
/// synchronization. Object-safe so `HandlerCtx` can hold it as
/// `Arc<dyn Notifier>`.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn send_embed(&self, destination: &str, embed: Embed) -> Result<(), NotifierError>;
}

/// In-memory [`Notifier`] that records every call, for tests in
/// dependent crates (gated behind `test-support` so it never ships in
/// release builds).
#[cfg(feature = "test-support")]
#[derive(Clone, Default)]
pub struct FakeNotifier {
    calls: std::sync::Arc<parking_lot::Mutex<Vec<(String, Embed)>>>,
}

#[cfg(feature = "test-support")]
impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(String, Embed)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[cfg(feature = "test-support")]
#[async_trait]
impl Notifier for FakeNotifier {
    async fn send_embed(&self, destination: &str, embed: Embed) -> Result<(), NotifierError> {
        self.calls.lock().push((destination.to_string(), embed));
        Ok(())
    }
}

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The configuration collaborator contract: resolving a scope to its
//! notification destination. The on-disk configuration file schema is
//! external; the core consumes it only through this trait.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;

/// Resolves a scope (e.g. a guild id) to the destination the notifier
/// should post to, and reports whether a scope is configured at all.
///
/// Missing configuration or missing destination is not an error at
/// this layer; this trait just reports `None` and lets the caller
/// decide.
pub trait ConfigLookup: Send + Sync + 'static {
    /// Destination (e.g. webhook URL) to post notifications for `scope`,
    /// or `None` if unconfigured.
    fn notify_destination(&self, scope: &str) -> Option<String>;

    /// Whether `scope` has any configuration at all. Event ingest
    /// services use this to filter out unconfigured scopes before doing
    /// any further work.
    fn is_configured(&self, scope: &str) -> bool {
        self.notify_destination(scope).is_some()
    }
}

/// In-memory [`ConfigLookup`], mainly for tests and for embedding a
/// small fixed scope set.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigLookup {
    destinations: HashMap<String, String>,
}

impl StaticConfigLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(mut self, scope: impl Into<String>, destination: impl Into<String>) -> Self {
        self.destinations.insert(scope.into(), destination.into());
        self
    }
}

impl ConfigLookup for StaticConfigLookup {
    fn notify_destination(&self, scope: &str) -> Option<String> {
        self.destinations.get(scope).cloned()
    }
}

#[derive(Debug, Deserialize, Default)]
struct TomlDocument {
    #[serde(default)]
    scopes: HashMap<String, ScopeEntry>,
}

#[derive(Debug, Deserialize, Default)]
struct ScopeEntry {
    #[serde(default)]
    notify_webhook: Option<String>,
}

/// TOML-backed [`ConfigLookup`], reloadable at runtime.
///
/// Shape (one table per scope):
///
/// ```toml
/// [scopes."guild-1"]
/// notify_webhook = "https://example.invalid/webhooks/abc"
/// ```
///
/// A missing or unparseable file is treated as "nothing configured"
/// rather than a startup failure — same poison-prevention stance as the
/// avatar store.
#[derive(Clone)]
pub struct TomlConfigLookup {
    destinations: Arc<RwLock<HashMap<String, String>>>,
}

impl TomlConfigLookup {
    /// Load from `path`, starting empty if the file is absent or
    /// malformed.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let lookup = Self {
            destinations: Arc::new(RwLock::new(HashMap::new())),
        };
        lookup.reload(path);
        lookup
    }

    /// Re-read `path`, replacing the in-memory table. Leaves the prior
    /// table untouched if the file can't be read or parsed.
    pub fn reload(&self, path: impl AsRef<Path>) {
        let Ok(raw) = std::fs::read_to_string(path.as_ref()) else {
            tracing::debug!(path = %path.as_ref().display(), "config file absent, leaving scope table as-is");
            return;
        };
        let Ok(doc) = toml::from_str::<TomlDocument>(&raw) else {
            tracing::warn!(path = %path.as_ref().display(), "config file unparseable, leaving scope table as-is");
            return;
        };
        let resolved: HashMap<String, String> = doc
            .scopes
            .into_iter()
            .filter_map(|(scope, entry)| entry.notify_webhook.map(|dest| (scope, dest)))
            .collect();
        *self.destinations.write() = resolved;
    }
}

impl ConfigLookup for TomlConfigLookup {
    fn notify_destination(&self, scope: &str) -> Option<String> {
        self.destinations.read().get(scope).cloned()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

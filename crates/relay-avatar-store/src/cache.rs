// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The scoped, persistent avatar-hash cache itself.

use crate::error::AvatarStoreError;
use crate::schema::{self, CanonicalSchema, ScopeSchema, CURRENT_SCHEMA_VERSION};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use relay_core::scope::scoped_key;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
struct ScopeState {
    entries: HashMap<String, String>,
    last_updated: String,
}

#[derive(Default)]
struct State {
    scopes: HashMap<String, ScopeState>,
    last_updated: String,
}

struct Shared {
    path: PathBuf,
    state: RwLock<State>,
    // Guards both the last-save timestamp and the write itself, so
    // concurrent `save_throttled` callers collapse to a single write.
    save_lock: Mutex<Option<Instant>>,
}

/// Point-in-time totals across every scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopedCacheStats {
    pub total_entries: usize,
    pub scopes_count: usize,
}

/// Point-in-time totals for a single scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeStats {
    pub entries_count: usize,
}

/// The scope-partitioned, persistent avatar-hash cache.
///
/// Cloning shares the same underlying store (cheap `Arc` handle),
/// matching the other relay caches.
#[derive(Clone)]
pub struct ScopedCache {
    shared: Arc<Shared>,
}

impl ScopedCache {
    /// Builds an empty, in-memory cache backed by `path`. Call
    /// [`ScopedCache::load`] to populate it from disk.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            shared: Arc::new(Shared {
                path: path.as_ref().to_path_buf(),
                state: RwLock::new(State::default()),
                save_lock: Mutex::new(None),
            }),
        }
    }

    /// Insert or overwrite the avatar hash for `(scope, subject)`.
    /// Validates the pair forms a well-formed composite key without
    /// actually needing the formatted string.
    pub fn set(
        &self,
        scope: &str,
        subject: &str,
        value: impl Into<String>,
    ) -> Result<(), AvatarStoreError> {
        scoped_key(scope, subject)?;
        let now = Utc::now().to_rfc3339();
        let mut state = self.shared.state.write();
        let entry = state.scopes.entry(scope.to_string()).or_default();
        entry.entries.insert(subject.to_string(), value.into());
        entry.last_updated = now.clone();
        state.last_updated = now;
        Ok(())
    }

    pub fn get(&self, scope: &str, subject: &str) -> Option<String> {
        self.shared
            .state
            .read()
            .scopes
            .get(scope)
            .and_then(|s| s.entries.get(subject))
            .cloned()
    }

    pub fn has(&self, scope: &str, subject: &str) -> bool {
        self.shared
            .state
            .read()
            .scopes
            .get(scope)
            .is_some_and(|s| s.entries.contains_key(subject))
    }

    /// Removes `(scope, subject)`, returning whether it was present.
    pub fn delete(&self, scope: &str, subject: &str) -> bool {
        let mut state = self.shared.state.write();
        match state.scopes.get_mut(scope) {
            Some(s) => s.entries.remove(subject).is_some(),
            None => false,
        }
    }

    pub fn clear(&self) {
        self.shared.state.write().scopes.clear();
    }

    pub fn clear_scope(&self, scope: &str) {
        self.shared.state.write().scopes.remove(scope);
    }

    /// Total entry count across every scope.
    pub fn size(&self) -> usize {
        self.shared
            .state
            .read()
            .scopes
            .values()
            .map(|s| s.entries.len())
            .sum()
    }

    /// All composite `"<scope>:<subject>"` keys currently stored.
    pub fn keys(&self) -> Vec<String> {
        self.shared
            .state
            .read()
            .scopes
            .iter()
            .flat_map(|(scope, s)| {
                s.entries
                    .keys()
                    .filter_map(move |subject| scoped_key(scope, subject).ok())
            })
            .collect()
    }

    /// Subject keys within a single scope.
    pub fn keys_in_scope(&self, scope: &str) -> Vec<String> {
        self.shared
            .state
            .read()
            .scopes
            .get(scope)
            .map(|s| s.entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> ScopedCacheStats {
        let state = self.shared.state.read();
        ScopedCacheStats {
            total_entries: state.scopes.values().map(|s| s.entries.len()).sum(),
            scopes_count: state.scopes.len(),
        }
    }

    pub fn stats_for_scope(&self, scope: &str) -> Option<ScopeStats> {
        self.shared
            .state
            .read()
            .scopes
            .get(scope)
            .map(|s| ScopeStats {
                entries_count: s.entries.len(),
            })
    }

    /// Loads from disk, replacing in-memory state. A missing file leaves
    /// the cache empty rather than erroring; an unrecognized or corrupt
    /// file is logged and also treated as empty, so a bad cache file
    /// never blocks startup.
    pub fn load(&self) -> Result<(), AvatarStoreError> {
        let bytes = match std::fs::read(&self.shared.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.shared.path.display(), "avatar store file absent, starting empty");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let canonical = match schema::parse(&bytes) {
            Some(canonical) => canonical,
            None => {
                tracing::warn!(path = %self.shared.path.display(), "avatar store file unreadable, starting empty");
                return Ok(());
            }
        };

        let mut state = self.shared.state.write();
        state.scopes = canonical
            .scopes
            .into_iter()
            .map(|(scope, schema)| {
                (
                    scope,
                    ScopeState {
                        entries: schema.entries,
                        last_updated: schema.last_updated,
                    },
                )
            })
            .collect();
        state.last_updated = canonical.last_updated;
        Ok(())
    }

    /// Atomically persists the current in-memory state: write to a
    /// temporary sibling, fsync it, then rename over the target, so the
    /// file is never observed partially written.
    pub fn save(&self) -> Result<(), AvatarStoreError> {
        let mut last_save = self.shared.save_lock.lock();
        self.save_locked(&mut last_save)
    }

    /// Like [`ScopedCache::save`], but a no-op if the last successful
    /// save happened less than `min_interval` ago. Does not update the
    /// throttle clock on error.
    /// Holding the same lock across the check and the write means
    /// concurrent `save_throttled` callers collapse to a single write.
    pub fn save_throttled(&self, min_interval: Duration) -> Result<(), AvatarStoreError> {
        let mut last_save = self.shared.save_lock.lock();
        let due = match *last_save {
            Some(at) => at.elapsed() >= min_interval,
            None => true,
        };
        if !due {
            return Ok(());
        }
        self.save_locked(&mut last_save)
    }

    fn save_locked(&self, last_save: &mut Option<Instant>) -> Result<(), AvatarStoreError> {
        let bytes = {
            let state = self.shared.state.read();
            let canonical = CanonicalSchema {
                scopes: state
                    .scopes
                    .iter()
                    .map(|(scope, s)| {
                        (
                            scope.clone(),
                            ScopeSchema {
                                entries: s.entries.clone(),
                                last_updated: s.last_updated.clone(),
                                scope_id: scope.clone(),
                            },
                        )
                    })
                    .collect(),
                last_updated: if state.last_updated.is_empty() {
                    Utc::now().to_rfc3339()
                } else {
                    state.last_updated.clone()
                },
                version: CURRENT_SCHEMA_VERSION.to_string(),
            };
            serde_json::to_vec_pretty(&canonical)?
        };

        write_atomic(&self.shared.path, &bytes)?;
        *last_save = Some(Instant::now());
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), AvatarStoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp_path, path)?;

    if let Some(parent) = path.parent() {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;

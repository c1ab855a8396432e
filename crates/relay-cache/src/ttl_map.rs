// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The concurrent TTL map itself.

use crate::stats::TtlMapStats;
use parking_lot::RwLock;
use relay_core::clock::{Clock, SystemClock};
use std::collections::HashMap;
use std::hash::Hash;
use std::mem::size_of;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

struct Entry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

/// Construction-time configuration for a [`TtlMap`].
#[derive(Debug, Clone)]
pub struct TtlMapConfig {
    /// Used when `set`'s per-call `ttl` is `Duration::ZERO`. A `Duration::ZERO`
    /// default makes entries immortal unless a positive TTL is given at
    /// `set` time — if both are non-positive the entry never expires.
    pub default_ttl: Duration,
    /// Soft cap. Exceeding it makes `set` synchronously sweep expired
    /// entries; live entries are never evicted to enforce the cap.
    pub max_size: Option<usize>,
    /// `Duration::ZERO` disables the background sweep task entirely.
    pub cleanup_interval: Duration,
}

impl Default for TtlMapConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::ZERO,
            max_size: None,
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

struct Shared<K, V, C> {
    map: RwLock<HashMap<K, Entry<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    last_cleanup: RwLock<Option<Instant>>,
    config: TtlMapConfig,
    clock: C,
    sweep_cancel: CancellationToken,
}

/// A concurrent key→value store with per-entry expiry.
///
/// Cloning a `TtlMap` is cheap and shares the same underlying store (it
/// holds an `Arc` internally).
pub struct TtlMap<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    shared: Arc<Shared<K, V, C>>,
}

impl<K, V, C> Clone for TtlMap<K, V, C>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K, V> TtlMap<K, V, SystemClock>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Build a map using the real system clock, spawning the background
    /// sweep task if `config.cleanup_interval` is positive. Must be
    /// called from within a Tokio runtime when the sweep is enabled.
    pub fn new(config: TtlMapConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<K, V, C> TtlMap<K, V, C>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    pub fn with_clock(config: TtlMapConfig, clock: C) -> Self {
        let shared = Arc::new(Shared {
            map: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            last_cleanup: RwLock::new(None),
            config,
            clock,
            sweep_cancel: CancellationToken::new(),
        });

        if shared.config.cleanup_interval > Duration::ZERO {
            spawn_sweep(Arc::clone(&shared));
        }

        Self { shared }
    }

    fn resolve_ttl(&self, ttl: Duration) -> Duration {
        if ttl > Duration::ZERO {
            ttl
        } else {
            self.shared.config.default_ttl
        }
    }

    /// Insert or overwrite `key`. `ttl <= 0` uses the map-level default;
    /// if both are zero the entry is immortal.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let effective_ttl = self.resolve_ttl(ttl);
        let now = self.shared.clock.now();
        let expires_at = if effective_ttl > Duration::ZERO {
            Some(now + effective_ttl)
        } else {
            None
        };

        {
            let mut map = self.shared.map.write();
            map.insert(key, Entry { value, expires_at });

            if let Some(max_size) = self.shared.config.max_size {
                if map.len() > max_size {
                    sweep_locked(&mut map, now, &self.shared.last_cleanup);
                }
            }
        }
    }

    /// Returns the live value for `key`, or `None` on miss or on read of
    /// an expired entry. Updates hit/miss counters; may opportunistically
    /// delete an expired entry under the write lock (double-checked).
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.shared.clock.now();
        {
            let map = self.shared.map.read();
            if let Some(entry) = map.get(key) {
                if !entry.is_expired(now) {
                    self.shared.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(entry.value.clone());
                }
            } else {
                self.shared.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        }

        // Entry looked expired under the read lock; recheck under the
        // write lock before deleting, since a concurrent `set` may have
        // refreshed it in between.
        let mut map = self.shared.map.write();
        match map.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                self.shared.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            Some(_) => {
                map.remove(key);
                self.shared.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.shared.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Returns true iff an immediate `get` would hit. Does not affect
    /// hit/miss counters.
    pub fn has(&self, key: &K) -> bool {
        let now = self.shared.clock.now();
        let live = {
            let map = self.shared.map.read();
            match map.get(key) {
                Some(entry) => !entry.is_expired(now),
                None => return false,
            }
        };
        if !live {
            let mut map = self.shared.map.write();
            if let Some(entry) = map.get(key) {
                if entry.is_expired(now) {
                    map.remove(key);
                }
            }
        }
        live
    }

    pub fn delete(&self, key: &K) {
        self.shared.map.write().remove(key);
    }

    /// Raw stored-entry count, including entries that have expired but
    /// have not yet been swept.
    pub fn size(&self) -> usize {
        self.shared.map.read().len()
    }

    /// Snapshot of keys whose entries are currently live.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        let now = self.shared.clock.now();
        self.shared
            .map
            .read()
            .iter()
            .filter(|(_, e)| !e.is_expired(now))
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.shared.map.write().clear();
    }

    /// Purge all currently-expired entries and stamp `last_cleanup`.
    pub fn cleanup(&self) {
        let now = self.shared.clock.now();
        let mut map = self.shared.map.write();
        sweep_locked(&mut map, now, &self.shared.last_cleanup);
    }

    /// Update (`ttl > 0`) or remove (`ttl == 0`, making the entry
    /// immortal) a key's expiry in place. No-op if the key is absent.
    pub fn set_ttl(&self, key: &K, ttl: Duration) {
        let now = self.shared.clock.now();
        let mut map = self.shared.map.write();
        if let Some(entry) = map.get_mut(key) {
            entry.expires_at = if ttl > Duration::ZERO {
                Some(now + ttl)
            } else {
                None
            };
        }
    }

    /// Remaining lifetime, or `None` if absent, expired, or immortal.
    pub fn get_ttl(&self, key: &K) -> Option<Duration> {
        let now = self.shared.clock.now();
        let map = self.shared.map.read();
        let entry = map.get(key)?;
        match entry.expires_at {
            Some(at) if at > now => Some(at - now),
            _ => None,
        }
    }

    /// Absolute expiry deadline, or `None` if absent, expired, or immortal.
    pub fn get_expiration(&self, key: &K) -> Option<Instant> {
        let now = self.shared.clock.now();
        let map = self.shared.map.read();
        let entry = map.get(key)?;
        match entry.expires_at {
            Some(at) if at > now => Some(at),
            _ => None,
        }
    }

    pub fn stats(&self) -> TtlMapStats {
        let total_entries = self.shared.map.read().len();
        let per_entry = size_of::<K>() + size_of::<V>() + size_of::<Option<Instant>>();
        TtlMapStats {
            total_entries,
            hits: self.shared.hits.load(Ordering::Relaxed),
            misses: self.shared.misses.load(Ordering::Relaxed),
            estimated_memory_bytes: total_entries * per_entry,
            last_cleanup: *self.shared.last_cleanup.read(),
        }
    }

    /// Stop the background sweep task, if one is running. Idempotent.
    /// Further operations remain valid; periodic eviction simply stops.
    pub fn close(&self) {
        self.shared.sweep_cancel.cancel();
    }
}

fn sweep_locked<K: Eq + Hash, V>(
    map: &mut HashMap<K, Entry<V>>,
    now: Instant,
    last_cleanup: &RwLock<Option<Instant>>,
) {
    map.retain(|_, entry| !entry.is_expired(now));
    *last_cleanup.write() = Some(now);
}

fn spawn_sweep<K, V, C>(shared: Arc<Shared<K, V, C>>)
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    let interval = shared.config.cleanup_interval;
    let cancel = shared.sweep_cancel.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("ttl map sweep task stopping");
                    break;
                }
                _ = ticker.tick() => {
                    let now = shared.clock.now();
                    let mut map = shared.map.write();
                    sweep_locked(&mut map, now, &shared.last_cleanup);
                }
            }
        }
    });
}

impl<K, V, C> Drop for Shared<K, V, C> {
    fn drop(&mut self) {
        self.sweep_cancel.cancel();
    }
}

#[cfg(test)]
#[path = "ttl_map_tests.rs"]
mod tests;

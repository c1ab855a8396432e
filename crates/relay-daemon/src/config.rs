// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: resolves state-directory paths and loads the
//! router/avatar-maintenance knobs from the same TOML file the scope
//! notification table lives in.

use std::path::PathBuf;
use std::time::Duration;

use relay_router::RouterConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::env::state_dir;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a state directory (set RELAY_STATE_DIR or HOME)")]
    NoStateDir,
    #[error("failed to create state directory: {0}")]
    CreateStateDir(#[source] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    /// Path to `scopes.*` + `[router]` TOML config.
    pub config_path: PathBuf,
    pub avatar_cache_path: PathBuf,
    pub log_path: PathBuf,
    pub router: RouterConfig,
    pub avatar_save_interval: Duration,
    pub avatar_flush_interval: Duration,
}

#[derive(Debug, Deserialize, Default)]
struct DaemonToml {
    #[serde(default)]
    router: RouterToml,
}

#[derive(Debug, Deserialize, Default)]
struct RouterToml {
    default_max_attempts: Option<u32>,
    initial_backoff_ms: Option<u64>,
    max_backoff_ms: Option<u64>,
    idempotency_ttl_secs: Option<u64>,
    group_buffer: Option<usize>,
    group_idle_ttl_secs: Option<u64>,
    cleanup_interval_secs: Option<u64>,
    global_max_workers: Option<usize>,
    group_max_parallel: Option<usize>,
    avatar_save_interval_secs: Option<u64>,
    avatar_flush_interval_secs: Option<u64>,
}

const DEFAULT_AVATAR_SAVE_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_AVATAR_FLUSH_INTERVAL: Duration = Duration::from_secs(300);

impl Config {
    /// Load daemon configuration. Uses fixed paths under
    /// `~/.local/state/relay/` (or `$RELAY_STATE_DIR`/`$XDG_STATE_HOME`).
    /// A missing or unparseable config file falls back to router
    /// defaults rather than failing startup — same poison-prevention
    /// stance as the avatar cache.
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = state_dir()?;
        std::fs::create_dir_all(&state_dir).map_err(ConfigError::CreateStateDir)?;

        let config_path = state_dir.join("config.toml");
        let parsed = std::fs::read_to_string(&config_path)
            .ok()
            .and_then(|raw| toml::from_str::<DaemonToml>(&raw).ok())
            .unwrap_or_default();
        let r = parsed.router;

        let router = RouterConfig {
            default_max_attempts: r.default_max_attempts.unwrap_or(0),
            initial_backoff: r.initial_backoff_ms.map(Duration::from_millis).unwrap_or_default(),
            max_backoff: r.max_backoff_ms.map(Duration::from_millis).unwrap_or_default(),
            idempotency_ttl: r.idempotency_ttl_secs.map(Duration::from_secs).unwrap_or_default(),
            group_buffer: r.group_buffer.unwrap_or(0),
            group_idle_ttl: r.group_idle_ttl_secs.map(Duration::from_secs).unwrap_or_default(),
            cleanup_interval: r.cleanup_interval_secs.map(Duration::from_secs).unwrap_or_default(),
            global_max_workers: r.global_max_workers.unwrap_or(0),
            group_max_parallel: r.group_max_parallel.unwrap_or(0),
        };

        Ok(Self {
            avatar_cache_path: state_dir.join("avatar_cache.json"),
            log_path: state_dir.join("relayd.log"),
            avatar_save_interval: r
                .avatar_save_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_AVATAR_SAVE_INTERVAL),
            avatar_flush_interval: r
                .avatar_flush_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_AVATAR_FLUSH_INTERVAL),
            config_path,
            router,
            state_dir,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

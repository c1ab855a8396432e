// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::time::Duration;
use tempfile::tempdir;

#[test]
#[serial]
fn missing_config_file_falls_back_to_router_defaults() {
    let dir = tempdir().unwrap();
    std::env::set_var("RELAY_STATE_DIR", dir.path());

    let config = Config::load().unwrap();
    assert_eq!(config.router.default_max_attempts, RouterConfig::default().default_max_attempts);
    assert_eq!(config.avatar_save_interval, DEFAULT_AVATAR_SAVE_INTERVAL);

    std::env::remove_var("RELAY_STATE_DIR");
}

#[test]
#[serial]
fn malformed_config_file_falls_back_to_router_defaults() {
    let dir = tempdir().unwrap();
    std::env::set_var("RELAY_STATE_DIR", dir.path());
    std::fs::write(dir.path().join("config.toml"), b"not valid toml {{{").unwrap();

    let config = Config::load().unwrap();
    assert_eq!(config.router.group_max_parallel, RouterConfig::default().group_max_parallel);

    std::env::remove_var("RELAY_STATE_DIR");
}

#[test]
#[serial]
fn router_overrides_are_read_from_config_file() {
    let dir = tempdir().unwrap();
    std::env::set_var("RELAY_STATE_DIR", dir.path());
    std::fs::write(
        dir.path().join("config.toml"),
        br#"
            [router]
            default_max_attempts = 7
            initial_backoff_ms = 50
            avatar_save_interval_secs = 15
        "#,
    )
    .unwrap();

    let config = Config::load().unwrap();
    assert_eq!(config.router.default_max_attempts, 7);
    assert_eq!(config.router.initial_backoff, Duration::from_millis(50));
    assert_eq!(config.avatar_save_interval, Duration::from_secs(15));

    std::env::remove_var("RELAY_STATE_DIR");
}

#[test]
#[serial]
fn paths_are_rooted_under_the_state_dir() {
    let dir = tempdir().unwrap();
    std::env::set_var("RELAY_STATE_DIR", dir.path());

    let config = Config::load().unwrap();
    assert_eq!(config.avatar_cache_path, dir.path().join("avatar_cache.json"));
    assert_eq!(config.config_path, dir.path().join("config.toml"));

    std::env::remove_var("RELAY_STATE_DIR");
}

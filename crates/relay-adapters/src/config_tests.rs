// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn static_lookup_reports_configured_scopes() {
    let lookup = StaticConfigLookup::new().with_scope("guild-1", "https://hook/1");
    assert_eq!(
        lookup.notify_destination("guild-1"),
        Some("https://hook/1".to_string())
    );
    assert!(lookup.is_configured("guild-1"));
    assert!(!lookup.is_configured("guild-2"));
}

#[test]
fn toml_lookup_reads_scope_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("relay.toml");
    std::fs::write(
        &path,
        r#"
        [scopes."guild-1"]
        notify_webhook = "https://hook/1"

        [scopes."guild-2"]
        notify_webhook = "https://hook/2"
        "#,
    )
    .unwrap();

    let lookup = TomlConfigLookup::load(&path);
    assert_eq!(
        lookup.notify_destination("guild-1"),
        Some("https://hook/1".to_string())
    );
    assert_eq!(
        lookup.notify_destination("guild-2"),
        Some("https://hook/2".to_string())
    );
    assert!(!lookup.is_configured("guild-3"));
}

#[test]
fn toml_lookup_missing_file_starts_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.toml");
    let lookup = TomlConfigLookup::load(&path);
    assert!(!lookup.is_configured("guild-1"));
}

#[test]
fn toml_lookup_malformed_file_starts_empty_without_panicking() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("relay.toml");
    std::fs::write(&path, "not valid toml {{{").unwrap();
    let lookup = TomlConfigLookup::load(&path);
    assert!(!lookup.is_configured("guild-1"));
}

#[test]
fn reload_picks_up_changes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("relay.toml");
    std::fs::write(
        &path,
        r#"[scopes."guild-1"]
        notify_webhook = "https://hook/1""#,
    )
    .unwrap();
    let lookup = TomlConfigLookup::load(&path);
    assert!(lookup.is_configured("guild-1"));

    std::fs::write(
        &path,
        r#"[scopes."guild-2"]
        notify_webhook = "https://hook/2""#,
    )
    .unwrap();
    lookup.reload(&path);
    assert!(!lookup.is_configured("guild-1"));
    assert!(lookup.is_configured("guild-2"));
}

#[test]
fn reload_on_unreadable_file_keeps_previous_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("relay.toml");
    std::fs::write(
        &path,
        r#"[scopes."guild-1"]
        notify_webhook = "https://hook/1""#,
    )
    .unwrap();
    let lookup = TomlConfigLookup::load(&path);
    assert!(lookup.is_configured("guild-1"));

    lookup.reload(dir.path().join("does-not-exist.toml"));
    assert!(lookup.is_configured("guild-1"));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

fn store_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("avatars.json")
}

#[test]
fn set_then_get_hits() {
    let dir = tempdir().unwrap();
    let cache = ScopedCache::new(store_path(&dir));
    cache.set("guild-1", "user-1", "hash-a").unwrap();
    assert_eq!(cache.get("guild-1", "user-1"), Some("hash-a".to_string()));
}

#[test]
fn rejects_malformed_scope_or_subject() {
    let dir = tempdir().unwrap();
    let cache = ScopedCache::new(store_path(&dir));
    assert!(cache.set("", "user-1", "hash-a").is_err());
    assert!(cache.set("guild-1", "", "hash-a").is_err());
    assert!(cache.set("guild:1", "user-1", "hash-a").is_err());
}

#[test]
fn delete_reports_whether_entry_existed() {
    let dir = tempdir().unwrap();
    let cache = ScopedCache::new(store_path(&dir));
    cache.set("guild-1", "user-1", "hash-a").unwrap();
    assert!(cache.delete("guild-1", "user-1"));
    assert!(!cache.delete("guild-1", "user-1"));
    assert_eq!(cache.get("guild-1", "user-1"), None);
}

#[test]
fn clear_scope_only_removes_that_scope() {
    let dir = tempdir().unwrap();
    let cache = ScopedCache::new(store_path(&dir));
    cache.set("guild-1", "user-1", "hash-a").unwrap();
    cache.set("guild-2", "user-1", "hash-b").unwrap();
    cache.clear_scope("guild-1");
    assert_eq!(cache.get("guild-1", "user-1"), None);
    assert_eq!(cache.get("guild-2", "user-1"), Some("hash-b".to_string()));
}

#[test]
fn keys_returns_composite_forms() {
    let dir = tempdir().unwrap();
    let cache = ScopedCache::new(store_path(&dir));
    cache.set("guild-1", "user-1", "hash-a").unwrap();
    let keys = cache.keys();
    assert_eq!(keys, vec!["guild-1:user-1".to_string()]);
    assert_eq!(cache.keys_in_scope("guild-1"), vec!["user-1".to_string()]);
}

#[test]
fn stats_and_stats_for_scope_report_counts() {
    let dir = tempdir().unwrap();
    let cache = ScopedCache::new(store_path(&dir));
    cache.set("guild-1", "user-1", "hash-a").unwrap();
    cache.set("guild-1", "user-2", "hash-b").unwrap();
    cache.set("guild-2", "user-1", "hash-c").unwrap();

    let totals = cache.stats();
    assert_eq!(totals.total_entries, 3);
    assert_eq!(totals.scopes_count, 2);

    let scoped = cache.stats_for_scope("guild-1").unwrap();
    assert_eq!(scoped.entries_count, 2);
    assert!(cache.stats_for_scope("missing").is_none());
}

#[test]
fn load_on_missing_file_leaves_cache_empty() {
    let dir = tempdir().unwrap();
    let cache = ScopedCache::new(store_path(&dir));
    cache.load().unwrap();
    assert_eq!(cache.size(), 0);
}

#[test]
fn load_on_corrupt_file_resets_to_empty_without_erroring() {
    let dir = tempdir().unwrap();
    let path = store_path(&dir);
    std::fs::write(&path, b"not json at all").unwrap();
    let cache = ScopedCache::new(&path);
    cache.load().unwrap();
    assert_eq!(cache.size(), 0);
}

#[test]
fn save_then_load_round_trips_three_scopes_two_subjects_each() {
    let dir = tempdir().unwrap();
    let path = store_path(&dir);
    let cache = ScopedCache::new(&path);

    for scope in ["guild-1", "guild-2", "guild-3"] {
        for subject in ["user-1", "user-2"] {
            cache
                .set(scope, subject, format!("{scope}-{subject}-hash"))
                .unwrap();
        }
    }
    cache.save().unwrap();

    let reloaded = ScopedCache::new(&path);
    reloaded.load().unwrap();

    assert_eq!(reloaded.stats().total_entries, 6);
    for scope in ["guild-1", "guild-2", "guild-3"] {
        for subject in ["user-1", "user-2"] {
            assert_eq!(
                reloaded.get(scope, subject),
                Some(format!("{scope}-{subject}-hash"))
            );
        }
    }
}

#[test]
fn save_produces_a_file_that_reloads_to_an_equal_map() {
    let dir = tempdir().unwrap();
    let path = store_path(&dir);
    let cache = ScopedCache::new(&path);
    cache.set("guild-1", "user-1", "hash-a").unwrap();
    cache.set("guild-1", "user-2", "hash-b").unwrap();
    cache.save().unwrap();

    let raw = std::fs::read(&path).unwrap();
    let canonical = schema::parse(&raw).unwrap();
    for (scope, schema) in &canonical.scopes {
        assert_eq!(&schema.scope_id, scope);
    }

    let reloaded = ScopedCache::new(&path);
    reloaded.load().unwrap();
    assert_eq!(reloaded.keys().len(), cache.keys().len());
    for key in cache.keys() {
        let (scope, subject) = relay_core::scope::split_scoped_key(&key).unwrap();
        assert_eq!(reloaded.get(scope, subject), cache.get(scope, subject));
    }
}

#[test]
fn save_atomic_write_never_leaves_a_tmp_file_behind() {
    let dir = tempdir().unwrap();
    let path = store_path(&dir);
    let cache = ScopedCache::new(&path);
    cache.set("guild-1", "user-1", "hash-a").unwrap();
    cache.save().unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn save_throttled_skips_within_the_interval() {
    let dir = tempdir().unwrap();
    let path = store_path(&dir);
    let cache = ScopedCache::new(&path);
    cache.set("guild-1", "user-1", "hash-a").unwrap();

    cache.save_throttled(Duration::from_secs(60)).unwrap();
    let first_modified = std::fs::metadata(&path).unwrap().modified().unwrap();

    cache.set("guild-1", "user-1", "hash-b").unwrap();
    cache.save_throttled(Duration::from_secs(60)).unwrap();
    let second_modified = std::fs::metadata(&path).unwrap().modified().unwrap();

    assert_eq!(first_modified, second_modified);

    let reloaded = ScopedCache::new(&path);
    reloaded.load().unwrap();
    assert_eq!(reloaded.get("guild-1", "user-1"), Some("hash-a".to_string()));
}

#[test]
fn save_throttled_writes_again_once_interval_elapses() {
    let dir = tempdir().unwrap();
    let path = store_path(&dir);
    let cache = ScopedCache::new(&path);
    cache.set("guild-1", "user-1", "hash-a").unwrap();
    cache.save_throttled(Duration::from_millis(10)).unwrap();

    std::thread::sleep(Duration::from_millis(20));
    cache.set("guild-1", "user-1", "hash-b").unwrap();
    cache.save_throttled(Duration::from_millis(10)).unwrap();

    let reloaded = ScopedCache::new(&path);
    reloaded.load().unwrap();
    assert_eq!(reloaded.get("guild-1", "user-1"), Some("hash-b".to_string()));
}

#[test]
fn load_transparently_lifts_legacy_single_scope_file() {
    let dir = tempdir().unwrap();
    let path = store_path(&dir);
    let legacy = serde_json::json!({
        "entries": {"user-1": "hash-a"},
        "last_updated": "2025-01-01T00:00:00Z",
        "scope_id": "guild-legacy",
    });
    std::fs::write(&path, legacy.to_string()).unwrap();

    let cache = ScopedCache::new(&path);
    cache.load().unwrap();
    assert_eq!(cache.get("guild-legacy", "user-1"), Some("hash-a".to_string()));
    assert_eq!(cache.stats().scopes_count, 1);
}

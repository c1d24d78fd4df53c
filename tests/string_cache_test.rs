//! Integration tests for the string cache through the public API.
//!
//! A `MemoryBackend` behind an `Arc` doubles as a spy on load and write
//! counts; the file-backed tests run against a temporary directory.

use langstore::backends::{FileBackend, MemoryBackend};
use langstore::contexts::{CacheError, StringCache};
use langstore::data::{Backend, Entry};
use std::collections::BTreeMap;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

fn seeded() -> (Arc<MemoryBackend>, StringCache<Arc<MemoryBackend>>) {
    let backend = Arc::new(MemoryBackend::with_entries(vec![
        Entry::new("greet", "Hello, {name}!"),
        Entry::new("title", "Welcome"),
        Entry::new("pattern", "{a}-{b}-{a}"),
    ]));
    let cache = StringCache::new(backend.clone());
    (backend, cache)
}

#[test]
fn stored_values_win_over_defaults() {
    let (_, cache) = seeded();
    for default in [None, Some(""), Some("something else")] {
        assert_eq!(cache.get("title", default).unwrap(), Some("Welcome".to_string()));
    }
}

#[test]
fn missing_key_without_default_stays_missing() {
    let (backend, cache) = seeded();
    assert_eq!(cache.get("absent", None).unwrap(), None);
    assert_eq!(cache.get("absent", None).unwrap(), None);
    assert!(!cache.get_all().unwrap().contains_key("absent"));
    assert!(backend.entries().iter().all(|e| e.key != "absent"));
}

#[test]
fn default_insert_is_persisted() {
    let (backend, cache) = seeded();
    assert_eq!(cache.get("farewell", Some("Bye")).unwrap(), Some("Bye".to_string()));
    assert_eq!(cache.get("farewell", None).unwrap(), Some("Bye".to_string()));
    assert!(backend.entries().contains(&Entry::new("farewell", "Bye")));

    // A fresh cache over the same backend sees the inserted default
    let reloaded = StringCache::new(backend.clone());
    assert_eq!(reloaded.get("farewell", None).unwrap(), Some("Bye".to_string()));
}

#[test]
fn set_then_get() {
    let (_, cache) = seeded();
    cache.set("title", "Welcome back").unwrap();
    cache.set("new", "Fresh").unwrap();
    assert_eq!(cache.get("title", None).unwrap(), Some("Welcome back".to_string()));
    assert_eq!(cache.get("new", None).unwrap(), Some("Fresh".to_string()));
}

#[test]
fn assign_greeting() {
    let (_, cache) = seeded();
    let rendered = cache.assign("greet", &[("name", "John")], None).unwrap();
    assert_eq!(rendered.as_deref(), Some("Hello, John!"));
}

#[test]
fn assign_replaces_every_occurrence() {
    let (_, cache) = seeded();
    let rendered = cache.assign("pattern", &[("a", "X"), ("b", "Y")], None).unwrap();
    assert_eq!(rendered.as_deref(), Some("X-Y-X"));
}

#[test]
fn assign_rejects_bad_variable_names() {
    let (_, cache) = seeded();
    let err = cache.assign("greet", &[("na.me", "John")], None).unwrap_err();
    assert!(matches!(err, CacheError::InvalidSubstitutionPattern(name) if name == "na.me"));
}

#[test]
fn get_all_is_backend_plus_writes() {
    let (_, cache) = seeded();
    cache.set("title", "Hi").unwrap();
    cache.get("extra", Some("Extra")).unwrap();
    cache.get("ignored", None).unwrap();

    let expected: BTreeMap<String, String> = [
        ("extra", "Extra"),
        ("greet", "Hello, {name}!"),
        ("pattern", "{a}-{b}-{a}"),
        ("title", "Hi"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    assert_eq!(cache.get_all().unwrap(), expected);
}

#[test]
fn backend_is_loaded_once() {
    let (backend, cache) = seeded();
    cache.init().unwrap();
    cache.init().unwrap();
    cache.get("title", None).unwrap();
    cache.set("title", "x").unwrap();
    cache.get_all().unwrap();
    assert_eq!(backend.load_count(), 1);
}

#[test]
fn concurrent_init_loads_once() {
    let (backend, cache) = seeded();
    let cache = Arc::new(cache);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let cache = cache.clone();
            thread::spawn(move || {
                cache.init().unwrap();
                cache.set(&format!("key{}", i), "v").unwrap();
                cache.get("title", None).unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some("Welcome".to_string()));
    }

    assert_eq!(backend.load_count(), 1);
    assert_eq!(cache.len().unwrap(), 11);
    assert_eq!(backend.entries().len(), 11);
}

#[test]
fn default_insert_never_overwrites_a_concurrent_set() {
    for _ in 0..500 {
        let backend = Arc::new(MemoryBackend::new());
        let cache = Arc::new(StringCache::new(backend.clone()));
        cache.init().unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let reader = {
            let (cache, barrier) = (cache.clone(), barrier.clone());
            thread::spawn(move || {
                barrier.wait();
                cache.get("k", Some("default")).unwrap()
            })
        };
        let writer = {
            let (cache, barrier) = (cache.clone(), barrier.clone());
            thread::spawn(move || {
                barrier.wait();
                cache.set("k", "real").unwrap();
            })
        };

        let seen = reader.join().unwrap();
        writer.join().unwrap();

        // Whichever thread goes first, the explicit write is the last one
        assert!(matches!(seen.as_deref(), Some("default") | Some("real")));
        assert_eq!(cache.get("k", None).unwrap().as_deref(), Some("real"));
        assert_eq!(backend.entries(), vec![Entry::new("k", "real")]);
    }
}

#[test]
fn backend_failure_is_an_error() {
    let (backend, cache) = seeded();
    backend.set_fail_loads(true);
    assert!(matches!(cache.get_all(), Err(CacheError::Backend(_))));

    backend.set_fail_loads(false);
    backend.set_fail_writes(true);
    assert!(matches!(cache.set("title", "x"), Err(CacheError::Backend(_))));
    assert_eq!(cache.get("title", None).unwrap(), Some("Welcome".to_string()));
}

#[test]
fn file_store_survives_a_new_cache() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("strings.json");

    let cache = StringCache::new(FileBackend::new(Some(path.clone())));
    assert_eq!(cache.get("greet", Some("Hello, {name}!")).unwrap().as_deref(), Some("Hello, {name}!"));
    cache.set("title", "Welcome").unwrap();

    let reopened = StringCache::new(FileBackend::new(Some(path.clone())));
    assert_eq!(
        reopened.assign("greet", &[("NAME", "Ann")], None).unwrap().as_deref(),
        Some("Hello, Ann!")
    );
    assert_eq!(reopened.len().unwrap(), 2);
    assert_eq!(FileBackend::new(Some(path)).load_all().unwrap().len(), 2);
}

#[test]
fn yaml_store_is_supported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("strings.yml");

    let cache = StringCache::new(FileBackend::new(Some(path.clone())));
    cache.set("count", "{n} items").unwrap();

    let reopened = StringCache::new(FileBackend::new(Some(path)));
    assert_eq!(
        reopened.assign("count", &[("n", "4")], None).unwrap().as_deref(),
        Some("4 items")
    );
}

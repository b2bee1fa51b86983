//! Everyday behaviour of a single storage object on real timers

use super::test_utils::{initial_values, instant, stored_json, KEY};
use serde_json::json;
use std::thread;
use std::time::Duration;
use storage_object::{MemoryStore, ShutdownHooks, StorageObject, Value};

fn open(store: &MemoryStore, hooks: &ShutdownHooks) -> StorageObject {
    StorageObject::builder(KEY, store.clone())
        .initial_values(initial_values())
        .shutdown_hooks(hooks)
        .open()
        .unwrap()
}

#[test]
fn test_initial_values_read_back_intact() {
    let store = MemoryStore::new();
    let hooks = ShutdownHooks::new();
    let object = open(&store, &hooks);

    for (key, expected) in initial_values() {
        assert_eq!(object.get(key.as_str()).unwrap(), Some(expected), "key {}", key);
    }
    assert_eq!(object.get("h").unwrap().and_then(|v| v.as_date()), Some(instant()));
    // Normalized on open, date as a marker.
    assert_eq!(
        stored_json(&store, KEY)["h"],
        json!({ "__SO_date": 1_714_564_800_123_i64 })
    );
}

#[test]
fn test_assign_is_debounced_then_persisted() {
    let store = MemoryStore::new();
    let hooks = ShutdownHooks::new();
    let object = open(&store, &hooks);

    object
        .assign([
            ("a", json!(42)),
            ("b", json!("string")),
            ("c", json!(23)),
            ("d", json!({ "val": "new prop as obj" })),
        ])
        .unwrap();

    // Not immediate.
    assert_eq!(stored_json(&store, KEY)["a"], json!(2));

    thread::sleep(Duration::from_millis(200));
    let stored = stored_json(&store, KEY);
    assert_eq!(stored["a"], json!(42));
    assert_eq!(stored["d"], json!({ "val": "new prop as obj" }));
    assert!(!object.is_pending());
}

#[test]
fn test_clear_restores_initial_values() {
    let store = MemoryStore::new();
    let hooks = ShutdownHooks::new();
    let object = open(&store, &hooks);

    object.set("a", 42).unwrap();
    object.set("extra", true).unwrap();
    object.clear().unwrap();

    assert_eq!(object.snapshot(), initial_values());
    assert!(!object.is_pending());
    assert_eq!(stored_json(&store, KEY)["a"], json!(2));
    assert!(stored_json(&store, KEY).get("extra").is_none());

    // Idempotent.
    let before = store.raw(KEY);
    object.clear().unwrap();
    assert_eq!(store.raw(KEY), before);
}

#[test]
fn test_shutdown_flushes_pending_write() {
    let store = MemoryStore::new();
    let hooks = ShutdownHooks::new();
    let object = open(&store, &hooks);

    object.set("test", "before").unwrap();
    object.write().unwrap();
    object.set("test", "after").unwrap();
    assert_eq!(stored_json(&store, KEY)["test"], json!("before"));

    assert_eq!(hooks.fire(), 1);
    assert_eq!(stored_json(&store, KEY)["test"], json!("after"));
    assert!(!object.is_pending());
}

#[test]
fn test_new_subtree_is_observed_after_attach() {
    let store = MemoryStore::new();
    let hooks = ShutdownHooks::new();
    let object = open(&store, &hooks);

    object.set_serialized("n", &json!({ "deep": { "x": 1 } })).unwrap();
    object.at("n").at("deep").set("x", 2).unwrap();
    object.write().unwrap();

    assert_eq!(stored_json(&store, KEY)["n"], json!({ "deep": { "x": 2 } }));
    assert_eq!(
        object.at_path(["n", "deep"]).get("x").unwrap(),
        Some(Value::from(2))
    );
}

//! Flush-on-shutdown through the hook registry

use super::test_utils::{stored_json, KEY};
use serde_json::json;
use storage_object::{MemoryStore, ShutdownHooks, StorageObject};

#[test]
fn test_hook_writes_only_when_pending() {
    let store = MemoryStore::new();
    let hooks = ShutdownHooks::new();
    let object = StorageObject::builder(KEY, store.clone())
        .shutdown_hooks(&hooks)
        .open()
        .unwrap();

    object.set("a", 1).unwrap();
    object.write().unwrap();
    // Something else rewrites the entry; with nothing pending the hook must not clobber it.
    store.insert_raw(KEY, r#"{"external":true}"#);

    hooks.fire();
    assert_eq!(stored_json(&store, KEY), json!({ "external": true }));
}

#[test]
fn test_hooks_flush_every_object() {
    let store = MemoryStore::new();
    let hooks = ShutdownHooks::new();
    let objects: Vec<StorageObject> = ["one", "two", "three"]
        .iter()
        .map(|key| {
            StorageObject::builder(*key, store.clone())
                .debounce_ms(10_000)
                .shutdown_hooks(&hooks)
                .open()
                .unwrap()
        })
        .collect();

    for (i, object) in objects.iter().enumerate() {
        object.set("i", i as i64).unwrap();
    }
    assert_eq!(hooks.fire(), 3);
    for (i, key) in ["one", "two", "three"].iter().enumerate() {
        assert_eq!(stored_json(&store, key), json!({ "i": i }));
    }
    assert!(objects.iter().all(|o| !o.is_pending()));
}

#[test]
fn test_hook_outlives_dropped_object() {
    let store = MemoryStore::new();
    let hooks = ShutdownHooks::new();
    {
        let _scoped = StorageObject::builder("scoped", store.clone())
            .shutdown_hooks(&hooks)
            .open()
            .unwrap();
    }
    assert_eq!(hooks.fire(), 1);
    assert_eq!(hooks.fire(), 0);
    assert!(!hooks.register(Box::new(|| {})));
}

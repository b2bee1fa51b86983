//! Debounce timing on a virtual clock and on real timer hosts

use super::test_utils::{manual_object, ms, stored_json, CountingStore, KEY};
use serde_json::json;
use std::sync::Arc;
use storage_object::{MemoryStore, StorageObject, ThreadTimers, TokioTimers};

#[test]
fn test_sliding_window_writes_after_quiet_period() {
    let store = MemoryStore::new();
    let (object, timers) = manual_object(&store, 100, false);

    for i in 0..5 {
        object.set("n", i).unwrap();
        timers.advance(ms(60));
        assert_eq!(stored_json(&store, KEY), json!({}), "write {} came early", i);
    }

    timers.advance(ms(39));
    assert_eq!(stored_json(&store, KEY), json!({}));
    timers.advance(ms(1));
    assert_eq!(stored_json(&store, KEY), json!({ "n": 4 }));
    assert_eq!(timers.pending(), 0);
}

#[test]
fn test_fixed_window_writes_once_per_window() {
    let store = MemoryStore::new();
    let (object, timers) = manual_object(&store, 100, true);

    object.set("a", 1).unwrap();
    timers.advance(ms(50));
    object.set("b", 2).unwrap();
    timers.advance(ms(49));
    assert_eq!(stored_json(&store, KEY), json!({}));

    // The window opened by the first change closes at t=100 with both changes.
    timers.advance(ms(1));
    assert_eq!(stored_json(&store, KEY), json!({ "a": 1, "b": 2 }));

    object.set("c", 3).unwrap();
    assert!(object.is_pending());
    timers.advance(ms(100));
    assert_eq!(stored_json(&store, KEY), json!({ "a": 1, "b": 2, "c": 3 }));
}

#[test]
fn test_fixed_window_survives_continuous_changes() {
    let store = MemoryStore::new();
    let (object, timers) = manual_object(&store, 100, true);

    let mut writes = 0;
    let mut last = store.raw(KEY);
    for i in 0..50 {
        object.set("n", i).unwrap();
        timers.advance(ms(10));
        if store.raw(KEY) != last {
            writes += 1;
            last = store.raw(KEY);
        }
    }
    // 500ms of changes every 10ms: one write per 100ms window.
    assert_eq!(writes, 5);
}

#[test]
fn test_zero_debounce_is_synchronous() {
    let store = MemoryStore::new();
    let (object, timers) = manual_object(&store, 0, false);

    object.set("a", 1).unwrap();
    assert_eq!(stored_json(&store, KEY), json!({ "a": 1 }));
    object.delete("a").unwrap();
    assert_eq!(stored_json(&store, KEY), json!({}));
    assert_eq!(timers.pending(), 0);
    assert!(!object.is_pending());
}

#[test]
fn test_explicit_write_resets_window() {
    let store = MemoryStore::new();
    let (object, timers) = manual_object(&store, 100, false);

    object.set("a", 1).unwrap();
    timers.advance(ms(50));
    object.write().unwrap();
    assert_eq!(stored_json(&store, KEY), json!({ "a": 1 }));
    assert_eq!(timers.pending(), 0);

    object.set("a", 2).unwrap();
    timers.advance(ms(99));
    assert_eq!(stored_json(&store, KEY), json!({ "a": 1 }));
    timers.advance(ms(1));
    assert_eq!(stored_json(&store, KEY), json!({ "a": 2 }));
}

#[test]
fn test_thread_timers_write_in_background() {
    let store = MemoryStore::new();
    let timers = Arc::new(ThreadTimers::new());
    let object = StorageObject::builder(KEY, store.clone())
        .debounce_ms(30)
        .timers(timers.clone())
        .open()
        .unwrap();

    object.set("a", 1).unwrap();
    object.set("a", 2).unwrap();
    assert_eq!(timers.pending(), 1);

    std::thread::sleep(std::time::Duration::from_millis(150));
    assert_eq!(stored_json(&store, KEY), json!({ "a": 2 }));
    assert_eq!(timers.pending(), 0);
}

#[test]
fn test_thread_timers_burst_keeps_one_timer_and_writes_once() {
    let store = CountingStore::default();
    let timers = Arc::new(ThreadTimers::new());
    let object = StorageObject::builder(KEY, store.clone())
        .debounce_ms(200)
        .timers(timers.clone())
        .open()
        .unwrap();
    let opened = store.writes();

    for i in 0..2_000 {
        object.set("n", i).unwrap();
        assert!(timers.pending() <= 1, "timers piled up at change {}", i);
    }
    assert_eq!(store.writes(), opened);

    std::thread::sleep(std::time::Duration::from_millis(600));
    assert_eq!(store.writes(), opened + 1);
    assert_eq!(stored_json(&store.inner, KEY), json!({ "n": 1999 }));
    assert_eq!(timers.pending(), 0);
}

#[test]
fn test_fixed_burst_on_thread_timers_writes_once() {
    let store = CountingStore::default();
    let timers = Arc::new(ThreadTimers::new());
    let object = StorageObject::builder(KEY, store.clone())
        .debounce_ms(200)
        .debounce_fixed(true)
        .timers(timers.clone())
        .open()
        .unwrap();
    let opened = store.writes();

    for i in 0..2_000 {
        object.set("n", i).unwrap();
    }
    assert_eq!(timers.pending(), 1);

    std::thread::sleep(std::time::Duration::from_millis(600));
    assert_eq!(store.writes(), opened + 1);
    assert_eq!(stored_json(&store.inner, KEY), json!({ "n": 1999 }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_timers_write_in_background() {
    let store = MemoryStore::new();
    let timers = Arc::new(TokioTimers::current().expect("inside a runtime"));
    let object = StorageObject::builder(KEY, store.clone())
        .debounce_ms(30)
        .debounce_fixed(true)
        .timers(timers.clone())
        .open()
        .unwrap();

    object.set("a", 1).unwrap();
    object.set("b", 2).unwrap();
    assert_eq!(timers.pending(), 1);

    tokio::time::sleep(std::time::Duration::from_millis(150)).await;
    assert_eq!(stored_json(&store, KEY), json!({ "a": 1, "b": 2 }));
}

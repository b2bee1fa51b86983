//! Write counts under arbitrary change timings

use proptest::collection::vec;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storage_object::{
    KeyValueStore, ManualTimers, MemoryStore, StorageObject, StoreError,
};

const DELAY_MS: u64 = 100;

/// Memory store that counts writes.
#[derive(Clone, Default)]
struct CountingStore {
    inner: MemoryStore,
    writes: Arc<AtomicUsize>,
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value)
    }
}

/// Apply one change per gap, advancing the clock by the gap after each,
/// then let any trailing timer fire. Returns writes after open.
fn run(gaps: &[u64], fixed: bool) -> usize {
    let store = CountingStore::default();
    let timers = Arc::new(ManualTimers::new());
    let object = StorageObject::builder("k", store.clone())
        .debounce_ms(DELAY_MS)
        .debounce_fixed(fixed)
        .timers(timers.clone())
        .open()
        .unwrap();
    let opened = store.writes.load(Ordering::SeqCst);

    for (i, gap) in gaps.iter().enumerate() {
        object.set("n", i as i64).unwrap();
        timers.advance(Duration::from_millis(*gap));
    }
    timers.advance(Duration::from_millis(DELAY_MS));
    store.writes.load(Ordering::SeqCst) - opened
}

/// Sliding: one write per quiet period of at least the delay
#[test]
fn test_sliding_write_count_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&vec(0u64..250, 1..40), |gaps| {
            let quiet = gaps.iter().filter(|g| **g >= DELAY_MS).count();
            let trailing = usize::from(gaps.last().map_or(false, |g| *g < DELAY_MS));
            prop_assert_eq!(run(&gaps, false), quiet + trailing);
            Ok(())
        })
        .unwrap();
}

/// Fixed: one write per window opened by the first change after the last write
#[test]
fn test_fixed_write_count_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&vec(0u64..250, 1..40), |gaps| {
            let mut now = 0;
            let mut due: Option<u64> = None;
            let mut expected = 0;
            for gap in &gaps {
                due.get_or_insert(now + DELAY_MS);
                now += gap;
                if due.map_or(false, |d| d <= now) {
                    expected += 1;
                    due = None;
                }
            }
            if due.is_some() {
                expected += 1;
            }
            prop_assert_eq!(run(&gaps, true), expected);
            Ok(())
        })
        .unwrap();
}

//! Codec round trip over arbitrary trees

use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use storage_object::codec::{decode, encode};
use storage_object::{Map, MemoryStore, ObjectOptions, StorageObject, Value};

/// Roughly 250,000 years either side of the epoch.
const MAX_DATE_MILLIS: i64 = 8_000_000_000_000_000;

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        // Quarter steps print and parse back exactly.
        (any::<i32>(), 0u8..4).prop_map(|(n, q)| Value::from(n as f64 + q as f64 * 0.25)),
        "\\PC{0,12}".prop_map(Value::from),
        (-MAX_DATE_MILLIS..MAX_DATE_MILLIS)
            .prop_map(|ms| Value::date_from_millis(ms).expect("millis in range")),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..6).prop_map(Value::Array),
            btree_map("[a-z]{1,6}", inner, 0..6).prop_map(Value::Object),
        ]
    })
}

fn tree() -> impl Strategy<Value = Map> {
    btree_map("[a-z]{1,6}", value(), 0..6)
}

/// decode(encode(tree)) gives the tree back, dates included
#[test]
fn test_codec_roundtrip_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&tree(), |tree| {
            let raw = encode(&tree).unwrap();
            prop_assert_eq!(decode(&raw), Some(tree));
            Ok(())
        })
        .unwrap();
}

/// A tree written by one handle reads back identically in the next
#[test]
fn test_reopen_roundtrip_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&tree(), |tree| {
            let store = MemoryStore::new();
            let options = ObjectOptions::new().with_debounce_ms(0);
            {
                let object = StorageObject::open("k", store.clone(), options.clone()).unwrap();
                object.update_tree(|root| *root = tree.clone()).unwrap();
            }
            let reopened = StorageObject::open("k", store, options).unwrap();
            prop_assert_eq!(reopened.snapshot(), tree);
            Ok(())
        })
        .unwrap();
}

/// Encoding is deterministic: equal trees give equal strings
#[test]
fn test_encoding_determinism_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&tree(), |tree| {
            let copy = tree.clone();
            prop_assert_eq!(encode(&tree).unwrap(), encode(&copy).unwrap());
            Ok(())
        })
        .unwrap();
}

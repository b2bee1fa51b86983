//! Objects on distinct keys never share state

use storage_object::{MemoryStore, StorageObject, Value};

#[test]
fn test_objects_not_interfering() {
    let store1 = MemoryStore::new();
    let store2 = MemoryStore::new();
    let a = StorageObject::open("A", store1.clone(), Default::default()).unwrap();
    let b = StorageObject::open("B", store2.clone(), Default::default()).unwrap();
    let c = StorageObject::open("C", store2.clone(), Default::default()).unwrap();

    a.set("test", "test").unwrap();
    a.write().unwrap();
    b.set("test", "lala").unwrap();
    b.write().unwrap();
    c.set("test", "hoho").unwrap();
    c.write().unwrap();

    assert_eq!(a.get("test").unwrap(), Some(Value::from("test")));
    assert_eq!(b.get("test").unwrap(), Some(Value::from("lala")));
    assert_eq!(c.get("test").unwrap(), Some(Value::from("hoho")));

    assert_eq!(store1.keys(), vec!["A".to_string()]);
    assert_eq!(store2.raw("B").as_deref(), Some(r#"{"test":"lala"}"#));
    assert_eq!(store2.raw("C").as_deref(), Some(r#"{"test":"hoho"}"#));
}

#[test]
fn test_clones_share_one_tree() {
    let store = MemoryStore::new();
    let a = StorageObject::builder("shared", store.clone())
        .debounce_ms(0)
        .open()
        .unwrap();
    let alias = a.clone();
    alias.set("x", 1).unwrap();
    assert_eq!(a.get("x").unwrap(), Some(Value::from(1)));
    assert_eq!(store.raw("shared").as_deref(), Some(r#"{"x":1}"#));
}

//! Storage Object: persistent, debounced object trees over key-value stores
//!
//! A storage object binds one key of a string key-value store to a live,
//! mutable object tree. Mutations at any depth are observed and written back
//! as one JSON string per key, coalesced by a sliding or fixed debounce
//! window. Dates survive the round trip through a reserved marker object.

pub mod cli;
pub mod codec;
pub mod config;
pub mod debounce;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod object;
pub mod store;
pub mod timer;
pub mod value;

pub use debounce::DebounceMode;
pub use error::StoreError;
pub use lifecycle::ShutdownHooks;
pub use object::{Node, ObjectOptions, PathSegment, StorageObject, DEFAULT_DEBOUNCE_MS};
pub use store::{FileStore, KeyValueStore, MemoryStore, SledStore};
pub use timer::{ManualTimers, ThreadTimers, TimerHost, TimerId, TokioTimers};
pub use value::{Map, Value};

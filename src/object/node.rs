//! Node handles into the live tree

use super::path::{self, display_path, Container, ContainerMut, PathSegment};
use super::Inner;
use crate::error::StoreError;
use crate::value::{from_value, to_value, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// A position in a storage object's tree.
///
/// A node is only a path; it is resolved against the tree on every call, so
/// it stays valid across replacements of the subtree it points at. Every
/// mutation through a node schedules a write of the whole object.
#[derive(Clone)]
pub struct Node {
    inner: Arc<Inner>,
    path: Vec<PathSegment>,
}

impl Node {
    pub(crate) fn new(inner: Arc<Inner>, path: Vec<PathSegment>) -> Self {
        Self { inner, path }
    }

    pub(crate) fn inner(&self) -> &Arc<Inner> {
        &self.inner
    }

    /// Segments from the root to this node.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Child node under `segment`. Resolution is deferred until the node is used.
    pub fn at(&self, segment: impl Into<PathSegment>) -> Node {
        let mut path = self.path.clone();
        path.push(segment.into());
        Node::new(Arc::clone(&self.inner), path)
    }

    /// Child node at a sequence of segments.
    pub fn at_path<I, S>(&self, segments: I) -> Node
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        let mut path = self.path.clone();
        path.extend(segments.into_iter().map(Into::into));
        Node::new(Arc::clone(&self.inner), path)
    }

    /// Copy of the value stored under `segment`.
    pub fn get(&self, segment: impl Into<PathSegment>) -> Result<Option<Value>, StoreError> {
        let segment = segment.into();
        self.inner
            .read(&self.path, |container| container.get(&segment).cloned())
    }

    /// Value under `segment`, deserialized into `T`.
    pub fn get_as<T: DeserializeOwned>(
        &self,
        segment: impl Into<PathSegment>,
    ) -> Result<Option<T>, StoreError> {
        self.get(segment)?.map(from_value).transpose()
    }

    /// Copy of the whole subtree at this node.
    pub fn value(&self) -> Result<Value, StoreError> {
        self.inner.read(&self.path, |container| container.to_value())
    }

    pub fn contains_key(&self, segment: impl Into<PathSegment>) -> Result<bool, StoreError> {
        let segment = segment.into();
        self.inner
            .read(&self.path, |container| container.get(&segment).is_some())
    }

    /// Enumerable keys of this node: field names, or array indexes as strings.
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.inner.read(&self.path, |container| container.keys())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        self.inner.read(&self.path, |container| container.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        self.inner.read(&self.path, |container| container.is_empty())
    }

    /// True when this node currently resolves to an array.
    pub fn is_array(&self) -> Result<bool, StoreError> {
        self.inner
            .read(&self.path, |container| matches!(container, Container::Array(_)))
    }

    /// Store `value` under `segment` and schedule a write.
    pub fn set(
        &self,
        segment: impl Into<PathSegment>,
        value: impl Into<Value>,
    ) -> Result<(), StoreError> {
        let segment = segment.into();
        let value = value.into();
        let path = &self.path;
        self.inner
            .mutate(path, |container| container.set(&segment, value, path))
    }

    /// Store any serializable value under `segment`.
    ///
    /// Values without a JSON form fail with [`StoreError::UnsupportedType`]
    /// and leave the tree untouched.
    pub fn set_serialized<T: Serialize + ?Sized>(
        &self,
        segment: impl Into<PathSegment>,
        value: &T,
    ) -> Result<(), StoreError> {
        let value = to_value(value)?;
        self.set(segment, value)
    }

    /// Remove `segment` and schedule a write. Array slots become `Null`.
    pub fn delete(&self, segment: impl Into<PathSegment>) -> Result<Option<Value>, StoreError> {
        let segment = segment.into();
        self.inner
            .mutate(&self.path, |container| Ok(container.delete(&segment)))
    }

    /// Set several entries in order.
    ///
    /// Stops at the first entry that cannot be converted; entries before it
    /// stay assigned.
    pub fn assign<I, K, V>(&self, entries: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<PathSegment>,
        V: Serialize,
    {
        for (key, value) in entries {
            self.set_serialized(key, &value)?;
        }
        Ok(())
    }

    /// Append to the array at this node. Returns the new length.
    pub fn push(&self, value: impl Into<Value>) -> Result<usize, StoreError> {
        let value = value.into();
        let path = &self.path;
        self.inner.mutate(path, |container| match container {
            ContainerMut::Array(items) => {
                items.push(value);
                Ok(items.len())
            }
            ContainerMut::Object(_) => Err(not_an_array(path)),
        })
    }

    /// Truncate or pad (with `Null`) the array at this node.
    ///
    /// Padding stops at [`MAX_ARRAY_LEN`](path::MAX_ARRAY_LEN) slots.
    pub fn set_len(&self, len: usize) -> Result<(), StoreError> {
        let path = &self.path;
        self.inner.mutate(path, |container| match container {
            ContainerMut::Array(items) => {
                if len > items.len() {
                    path::check_array_len(Some(len), len, path)?;
                }
                items.resize(len, Value::Null);
                Ok(())
            }
            ContainerMut::Object(_) => Err(not_an_array(path)),
        })
    }

    /// Mutate the value at this node in place and schedule one write.
    ///
    /// The root has no enclosing value; use
    /// [`StorageObject::update_tree`](super::StorageObject::update_tree) there.
    ///
    /// The object stays locked while `f` runs. Calling back into the same
    /// object (or any node of it) from inside `f` deadlocks.
    pub fn update<R>(&self, f: impl FnOnce(&mut Value) -> R) -> Result<R, StoreError> {
        let Some((last, parent)) = self.path.split_last() else {
            return Err(StoreError::NotAContainer {
                path: display_path(&self.path),
                found: "tree root",
            });
        };
        self.inner.mutate(parent, |container| {
            let slot = container
                .child_mut(last)
                .ok_or_else(|| StoreError::PathNotFound(display_path(&self.path)))?;
            Ok(f(slot))
        })
    }
}

fn not_an_array(at: &[PathSegment]) -> StoreError {
    StoreError::NotAContainer {
        path: display_path(at),
        found: "object (expected array)",
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.inner.key)
            .field("path", &path::display_path(&self.path))
            .finish()
    }
}

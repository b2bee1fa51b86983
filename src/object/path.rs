//! Paths into the live tree
//!
//! A path is a list of segments from the root. Key segments address object
//! fields, index segments address array slots. Following the usual JSON
//! object conventions, an index addresses an object by its decimal string
//! and a canonical decimal key addresses an array slot.

use crate::error::StoreError;
use crate::value::{Map, Value};
use std::fmt;

/// Largest length an array may be grown to by a write past its end.
///
/// Writes to existing slots are never limited; only padding is.
pub const MAX_ARRAY_LEN: usize = 1 << 20;

/// One step into the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    /// The segment as an object key.
    pub fn as_key(&self) -> String {
        match self {
            PathSegment::Key(k) => k.clone(),
            PathSegment::Index(i) => i.to_string(),
        }
    }

    /// The segment as an array index, if it is one.
    ///
    /// Keys count only in canonical form, so `"01"` is not an index.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Index(i) => Some(*i),
            PathSegment::Key(k) => k.parse::<usize>().ok().filter(|i| i.to_string() == *k),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<&String> for PathSegment {
    fn from(key: &String) -> Self {
        PathSegment::Key(key.clone())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{}", k),
            PathSegment::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Parse a dotted path such as `d.e` or `f.0.g`. All-digit parts become indexes.
pub fn parse_path(dotted: &str) -> Vec<PathSegment> {
    if dotted.is_empty() {
        return Vec::new();
    }
    dotted
        .split('.')
        .map(|part| match part.parse::<usize>() {
            Ok(i) if i.to_string() == part => PathSegment::Index(i),
            _ => PathSegment::Key(part.to_string()),
        })
        .collect()
}

/// Dotted rendering used in error messages; the root renders as `(root)`.
pub fn display_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return "(root)".to_string();
    }
    path.iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// Read-only view of an object or array node.
#[derive(Debug, Clone, Copy)]
pub enum Container<'a> {
    Object(&'a Map),
    Array(&'a [Value]),
}

impl<'a> Container<'a> {
    pub fn get(&self, segment: &PathSegment) -> Option<&'a Value> {
        match *self {
            Container::Object(map) => map.get(&segment.as_key()),
            Container::Array(items) => segment.as_index().and_then(|i| items.get(i)),
        }
    }

    /// Enumerable keys: field names, or slot indexes as strings.
    pub fn keys(&self) -> Vec<String> {
        match *self {
            Container::Object(map) => map.keys().cloned().collect(),
            Container::Array(items) => (0..items.len()).map(|i| i.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match *self {
            Container::Object(map) => map.len(),
            Container::Array(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_value(&self) -> Value {
        match *self {
            Container::Object(map) => Value::Object(map.clone()),
            Container::Array(items) => Value::Array(items.to_vec()),
        }
    }
}

/// Mutable view of an object or array node.
#[derive(Debug)]
pub enum ContainerMut<'a> {
    Object(&'a mut Map),
    Array(&'a mut Vec<Value>),
}

impl<'a> ContainerMut<'a> {
    pub fn child_mut(self, segment: &PathSegment) -> Option<&'a mut Value> {
        match self {
            ContainerMut::Object(map) => map.get_mut(&segment.as_key()),
            ContainerMut::Array(items) => segment.as_index().and_then(|i| items.get_mut(i)),
        }
    }

    /// Store `value` under `segment`. Array writes past the end pad with `Null`,
    /// up to [`MAX_ARRAY_LEN`] slots.
    pub fn set(self, segment: &PathSegment, value: Value, at: &[PathSegment]) -> Result<(), StoreError> {
        match self {
            ContainerMut::Object(map) => {
                map.insert(segment.as_key(), value);
                Ok(())
            }
            ContainerMut::Array(items) => {
                let index = segment.as_index().ok_or_else(|| invalid_index(at, segment))?;
                if let Some(slot) = items.get_mut(index) {
                    *slot = value;
                    return Ok(());
                }
                let len = check_array_len(index.checked_add(1), index, at)?;
                items.resize(len - 1, Value::Null);
                items.push(value);
                Ok(())
            }
        }
    }

    /// Remove `segment`. Array slots are left as `Null` holes, keeping later indexes stable.
    pub fn delete(self, segment: &PathSegment) -> Option<Value> {
        match self {
            ContainerMut::Object(map) => map.remove(&segment.as_key()),
            ContainerMut::Array(items) => segment
                .as_index()
                .and_then(|i| items.get_mut(i))
                .map(|slot| std::mem::replace(slot, Value::Null)),
        }
    }
}

/// Reject a grown array length over [`MAX_ARRAY_LEN`]. `None` means the length overflowed.
pub(crate) fn check_array_len(
    len: Option<usize>,
    index: usize,
    at: &[PathSegment],
) -> Result<usize, StoreError> {
    match len {
        Some(len) if len <= MAX_ARRAY_LEN => Ok(len),
        _ => Err(StoreError::IndexTooLarge {
            path: display_path(at),
            index,
            limit: MAX_ARRAY_LEN,
        }),
    }
}

fn invalid_index(at: &[PathSegment], segment: &PathSegment) -> StoreError {
    StoreError::InvalidIndex {
        path: display_path(at),
        segment: segment.to_string(),
    }
}

fn as_container<'a>(value: &'a Value, at: &[PathSegment]) -> Result<Container<'a>, StoreError> {
    match value {
        Value::Object(map) => Ok(Container::Object(map)),
        Value::Array(items) => Ok(Container::Array(items)),
        other => Err(StoreError::NotAContainer {
            path: display_path(at),
            found: other.kind(),
        }),
    }
}

/// Walk from the root to the container at `path`.
pub fn resolve<'a>(root: &'a Map, path: &[PathSegment]) -> Result<Container<'a>, StoreError> {
    let mut current = Container::Object(root);
    for (depth, segment) in path.iter().enumerate() {
        let here = &path[..=depth];
        let child = current
            .get(segment)
            .ok_or_else(|| StoreError::PathNotFound(display_path(here)))?;
        current = as_container(child, here)?;
    }
    Ok(current)
}

/// Walk from the root to the container at `path`, mutably.
pub fn resolve_mut<'a>(
    root: &'a mut Map,
    path: &[PathSegment],
) -> Result<ContainerMut<'a>, StoreError> {
    let mut current = ContainerMut::Object(root);
    for (depth, segment) in path.iter().enumerate() {
        let here = &path[..=depth];
        let child = current
            .child_mut(segment)
            .ok_or_else(|| StoreError::PathNotFound(display_path(here)))?;
        current = match child {
            Value::Object(map) => ContainerMut::Object(map),
            Value::Array(items) => ContainerMut::Array(items),
            other => {
                return Err(StoreError::NotAContainer {
                    path: display_path(here),
                    found: other.kind(),
                })
            }
        };
    }
    Ok(current)
}

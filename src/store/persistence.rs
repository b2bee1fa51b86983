//! Sled-backed key-value store

use crate::error::StoreError;
use crate::store::KeyValueStore;
use std::path::Path;
use tracing::warn;

/// Sled-based implementation of KeyValueStore
///
/// Each storage object key maps to one sled key holding the UTF-8 JSON string.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Open (or create) a sled database at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)
            .map_err(|e| StoreError::Backend(format!("Failed to open sled database: {}", e)))?;
        Ok(Self { db })
    }

    /// Wrap an already opened database, e.g. one shared with other stores
    pub fn from_db(db: sled::Db) -> Self {
        Self { db }
    }

    /// Get the underlying sled database (for advanced operations)
    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    /// List every key currently held
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        for item in self.db.iter() {
            let (key, _) = item
                .map_err(|e| StoreError::Backend(format!("Failed to iterate store: {}", e)))?;
            keys.push(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(keys)
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map_err(|e| StoreError::Backend(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self
            .db
            .get(key.as_bytes())
            .map_err(|e| StoreError::Backend(format!("Failed to get entry '{}': {}", key, e)))?
        {
            Some(value) => {
                let raw = String::from_utf8(value.to_vec()).map_err(|e| {
                    StoreError::Io(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("Entry '{}' is not valid UTF-8: {}", key, e),
                    ))
                })?;
                Ok(Some(raw))
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.db
            .insert(key.as_bytes(), value.into_bytes())
            .map_err(|e| StoreError::Backend(format!("Failed to put entry '{}': {}", key, e)))?;
        Ok(())
    }
}

impl Drop for SledStore {
    fn drop(&mut self) {
        if let Err(e) = self.db.flush() {
            warn!(error = %e, "Failed to flush sled database on drop");
        }
    }
}

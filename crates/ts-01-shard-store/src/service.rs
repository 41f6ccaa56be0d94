//! # Shard Store Service
//!
//! Implements `ShardStoreApi` over any `BlobStore`.
//!
//! The inventory is the only shared mutable state in a store node. Readers
//! (`retrieve`, `list_keys`) take the read lock; writers take the write lock
//! for the duration of one blob mutation.

use crate::domain::{StoreConfig, StoreError};
use crate::ports::{BlobStore, ShardStoreApi};
use parking_lot::RwLock;
use shared_wire::DeleteStatus;
use tracing::{debug, warn};

/// The Shard Store service.
pub struct ShardStoreService<B: BlobStore> {
    blobs: RwLock<B>,
    config: StoreConfig,
}

impl<B: BlobStore> ShardStoreService<B> {
    /// Create a service over `blobs`.
    pub fn new(blobs: B, config: StoreConfig) -> Self {
        Self {
            blobs: RwLock::new(blobs),
            config,
        }
    }

    /// Number of blobs currently held.
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    /// True when the store holds nothing.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

impl<B: BlobStore> ShardStoreApi for ShardStoreService<B> {
    fn store(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        if bytes.len() > self.config.max_blob_size {
            return Err(StoreError::BlobTooLarge {
                size: bytes.len(),
                max: self.config.max_blob_size,
            });
        }

        let size = bytes.len();
        self.blobs.write().put(key.to_string(), bytes)?;
        debug!(key, bytes = size, "[ts-01] Stored blob");
        Ok(())
    }

    fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.blobs.read().get(key)
    }

    fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        self.blobs.read().keys()
    }

    fn delete(&self, key: &str) -> Result<DeleteStatus, StoreError> {
        match self.blobs.write().delete(key) {
            Ok(true) => {
                debug!(key, "[ts-01] Deleted blob");
                Ok(DeleteStatus::Deleted)
            }
            Ok(false) => Ok(DeleteStatus::NotFound),
            Err(e) => {
                warn!(key, error = %e, "[ts-01] Delete failed");
                Ok(DeleteStatus::Failed)
            }
        }
    }

    fn config(&self) -> &StoreConfig {
        &self.config
    }
}

//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the Shard Store service.

use crate::domain::StoreError;

/// Abstract interface for blob persistence.
///
/// Production: `FileBackedBlobStore`
/// Testing: `InMemoryBlobStore`
pub trait BlobStore: Send + Sync {
    /// Get a blob by key.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Insert or replace a blob.
    fn put(&mut self, key: String, value: Vec<u8>) -> Result<(), StoreError>;

    /// Delete a blob, returning whether it existed.
    fn delete(&mut self, key: &str) -> Result<bool, StoreError>;

    /// All keys in lexicographic order.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Number of blobs held.
    fn len(&self) -> usize;

    /// True when no blobs are held.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

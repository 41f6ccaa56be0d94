//! # Domain Entities
//!
//! Store configuration.

use shared_wire::MAX_STORE_FRAME_LEN;

/// Default upper bound for one blob (512 MiB).
pub const DEFAULT_MAX_BLOB_SIZE: usize = 512 * 1024 * 1024;

/// Shard store configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Largest blob accepted by `store`. Never above the 4-byte frame limit.
    pub max_blob_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_blob_size: DEFAULT_MAX_BLOB_SIZE,
        }
    }
}

impl StoreConfig {
    /// Create a config, clamping the blob limit to what the wire can carry.
    pub fn new(max_blob_size: usize) -> Self {
        Self {
            max_blob_size: max_blob_size.min(MAX_STORE_FRAME_LEN as usize),
        }
    }

    /// Create config for testing.
    pub fn for_testing() -> Self {
        Self::new(64 * 1024)
    }
}

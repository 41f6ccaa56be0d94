//! # Inbound Ports
//!
//! What a shard store can do, independent of the wire.

use crate::domain::{StoreConfig, StoreError};
use shared_wire::DeleteStatus;

/// Shard store API - inbound port.
///
/// Missing keys are reported as `None`; only the protocol handler collapses
/// that into a zero length.
pub trait ShardStoreApi: Send + Sync {
    /// Write or overwrite the blob under `key`.
    fn store(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;

    /// Read the blob under `key`.
    fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// All keys currently held, in lexicographic order.
    fn list_keys(&self) -> Result<Vec<String>, StoreError>;

    /// Remove the blob under `key`.
    fn delete(&self, key: &str) -> Result<DeleteStatus, StoreError>;

    /// Active configuration.
    fn config(&self) -> &StoreConfig;
}

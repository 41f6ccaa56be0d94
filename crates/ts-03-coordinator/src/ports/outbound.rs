//! # Outbound Ports
//!
//! The coordinator's view of one shard store. Three instances of the same
//! client type are held, one per shard index.

use crate::domain::ShardClientError;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_wire::DeleteStatus;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use ts_02_shard_router::StoreAddress;

/// Shard store client - outbound port.
#[async_trait]
pub trait ShardStoreClient: Send + Sync {
    /// Write or overwrite the blob under `key`.
    async fn store(&self, key: &str, bytes: &[u8]) -> Result<(), ShardClientError>;

    /// Read the blob under `key`. An absent key reads as empty.
    async fn retrieve(&self, key: &str) -> Result<Vec<u8>, ShardClientError>;

    /// All keys held by the store.
    async fn list_keys(&self) -> Result<Vec<String>, ShardClientError>;

    /// Delete the blob under `key`.
    async fn delete(&self, key: &str) -> Result<DeleteStatus, ShardClientError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

/// In-process shard store for testing.
///
/// Clones share the same inventory, so a test can keep one handle while the
/// coordinator owns another.
#[derive(Clone)]
pub struct MockShardStoreClient {
    address: StoreAddress,
    blobs: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
    reachable: Arc<AtomicBool>,
    delay: Option<Duration>,
}

impl MockShardStoreClient {
    /// Empty, reachable store.
    pub fn new(address: StoreAddress) -> Self {
        Self {
            address,
            blobs: Arc::new(Mutex::new(BTreeMap::new())),
            reachable: Arc::new(AtomicBool::new(true)),
            delay: None,
        }
    }

    /// Make every call sleep first.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Simulate the store going down or coming back.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Blob currently held under `key`.
    pub fn blob(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.lock().get(key).cloned()
    }

    /// Seed a blob directly.
    pub fn insert(&self, key: &str, bytes: &[u8]) {
        self.blobs.lock().insert(key.to_string(), bytes.to_vec());
    }

    /// Number of blobs held.
    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    /// True when no blobs are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn enter(&self) -> Result<(), ShardClientError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ShardClientError::Connect {
                address: self.address.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
            })
        }
    }
}

#[async_trait]
impl ShardStoreClient for MockShardStoreClient {
    async fn store(&self, key: &str, bytes: &[u8]) -> Result<(), ShardClientError> {
        self.enter().await?;
        self.insert(key, bytes);
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Vec<u8>, ShardClientError> {
        self.enter().await?;
        Ok(self.blob(key).unwrap_or_default())
    }

    async fn list_keys(&self) -> Result<Vec<String>, ShardClientError> {
        self.enter().await?;
        Ok(self.blobs.lock().keys().cloned().collect())
    }

    async fn delete(&self, key: &str) -> Result<DeleteStatus, ShardClientError> {
        self.enter().await?;
        Ok(match self.blobs.lock().remove(key) {
            Some(_) => DeleteStatus::Deleted,
            None => DeleteStatus::NotFound,
        })
    }
}

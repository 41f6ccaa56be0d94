//! # Shard Router
//!
//! Binds the pure algorithms to the configured store addresses. A router is
//! immutable once built and is shared between connection tasks by `Arc`.

use crate::algorithms::derive_key;
use crate::domain::{RouterError, ShardIndex, StoreAddress, SHARD_COUNT};

/// Where a shard index is served from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteTarget<'a> {
    /// Address of the owning store.
    pub address: &'a StoreAddress,
    /// Position of the store in configuration order.
    pub store_index: usize,
}

/// Key and owner of one shard of a specific file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShardPlacement {
    /// Shard position within the file.
    pub index: ShardIndex,
    /// Derived store key.
    pub key: String,
    /// Owning store.
    pub address: StoreAddress,
}

/// Configuration-bound routing table (one store per shard index).
#[derive(Clone, Debug)]
pub struct ShardRouter {
    stores: [StoreAddress; SHARD_COUNT],
}

impl ShardRouter {
    /// Build a router from exactly three store addresses in shard order.
    pub fn new(stores: Vec<StoreAddress>) -> Result<Self, RouterError> {
        for store in &stores {
            store.validate()?;
        }
        let got = stores.len();
        let stores: [StoreAddress; SHARD_COUNT] =
            stores.try_into().map_err(|_| RouterError::StoreCount {
                expected: SHARD_COUNT,
                got,
            })?;
        Ok(Self { stores })
    }

    /// Resolve the store owning a raw shard index.
    ///
    /// Indices outside `0..3` are rejected even though the coordinator only
    /// ever produces valid ones.
    pub fn route(&self, shard_index: usize) -> Result<RouteTarget<'_>, RouterError> {
        Ok(self.route_shard(ShardIndex::new(shard_index)?))
    }

    /// Resolve the store owning a validated shard index.
    pub fn route_shard(&self, index: ShardIndex) -> RouteTarget<'_> {
        RouteTarget {
            address: &self.stores[index.get()],
            store_index: index.get(),
        }
    }

    /// Store key for one shard of `file_name`.
    pub fn derive_key(&self, file_name: &str, index: ShardIndex) -> String {
        derive_key(file_name, index)
    }

    /// Keys and owners of all three shards of `file_name`, in index order.
    pub fn placements(&self, file_name: &str) -> [ShardPlacement; SHARD_COUNT] {
        ShardIndex::ALL.map(|index| ShardPlacement {
            index,
            key: derive_key(file_name, index),
            address: self.route_shard(index).address.clone(),
        })
    }

    /// Configured stores in shard order.
    pub fn stores(&self) -> &[StoreAddress] {
        &self.stores
    }
}

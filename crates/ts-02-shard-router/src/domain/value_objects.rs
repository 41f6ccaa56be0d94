//! # Domain Value Objects
//!
//! Immutable value types for shard routing.

use super::errors::RouterError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of shards every file is split into.
pub const SHARD_COUNT: usize = 3;

/// Index of a shard within its file, always in `0..SHARD_COUNT`.
///
/// Construction is the only place an out-of-range index can be rejected, so
/// every other API taking a `ShardIndex` is total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShardIndex(u8);

impl ShardIndex {
    /// Every shard index in reconstruction order.
    pub const ALL: [ShardIndex; SHARD_COUNT] = [ShardIndex(0), ShardIndex(1), ShardIndex(2)];

    /// Validate a raw index.
    pub fn new(index: usize) -> Result<Self, RouterError> {
        if index < SHARD_COUNT {
            Ok(Self(index as u8))
        } else {
            Err(RouterError::InvalidShardIndex(index))
        }
    }

    /// Zero-based position.
    pub fn get(self) -> usize {
        self.0 as usize
    }

    /// One-based position, as used in key suffixes and listings.
    pub fn ordinal(self) -> usize {
        self.get() + 1
    }
}

impl TryFrom<usize> for ShardIndex {
    type Error = RouterError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}

impl fmt::Display for ShardIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Network location of one shard store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreAddress {
    /// Host name or IP literal.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl StoreAddress {
    /// Create an address without validation.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Reject addresses that can never be connected to.
    pub fn validate(&self) -> Result<(), RouterError> {
        if self.host.trim().is_empty() {
            return Err(RouterError::InvalidAddress {
                address: self.to_string(),
                reason: "empty host",
            });
        }
        if self.port == 0 {
            return Err(RouterError::InvalidAddress {
                address: self.to_string(),
                reason: "port 0",
            });
        }
        Ok(())
    }
}

impl fmt::Display for StoreAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

//! # Domain Errors
//!
//! Error types for the Shard Router.

use thiserror::Error;

/// Routing error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// Shard index outside `0..SHARD_COUNT`.
    #[error("Invalid shard index: {0} (expected 0..3)")]
    InvalidShardIndex(usize),

    /// Router built with the wrong number of stores.
    #[error("Expected {expected} shard stores, got {got}")]
    StoreCount {
        /// Required store count
        expected: usize,
        /// Supplied store count
        got: usize,
    },

    /// Store address is unusable.
    #[error("Invalid store address {address}: {reason}")]
    InvalidAddress {
        /// Offending address
        address: String,
        /// Why it was refused
        reason: &'static str,
    },
}

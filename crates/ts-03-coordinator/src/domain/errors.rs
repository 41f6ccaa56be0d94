//! # Domain Errors
//!
//! Error types for the Coordinator.

use shared_wire::{DeleteStatus, WireError};
use thiserror::Error;

/// Failure of one call to one shard store.
#[derive(Debug, Error)]
pub enum ShardClientError {
    /// The store could not be reached.
    #[error("Cannot connect to shard store {address}: {source}")]
    Connect {
        /// Store address
        address: String,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// The call did not finish within the configured shard timeout.
    #[error("Shard store {address} timed out during {op}")]
    Timeout {
        /// Store address
        address: String,
        /// Store command in flight
        op: &'static str,
    },

    /// Framing failure after the connection was established.
    #[error("Wire error: {0}")]
    Wire(#[from] WireError),

    /// The store answered a delete with anything but success.
    #[error("Store refused to delete {key}: {status:?}")]
    DeleteRejected {
        /// Shard key
        key: String,
        /// Parsed reply
        status: DeleteStatus,
    },
}

/// Coordinator error types.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Client declared an unusable upload length.
    #[error("Invalid upload length {declared} (max {max})")]
    InvalidLength {
        /// Length as read from the wire
        declared: i64,
        /// Largest accepted length
        max: u64,
    },

    /// Client session framing failure.
    #[error("Wire error: {0}")]
    Wire(#[from] WireError),
}

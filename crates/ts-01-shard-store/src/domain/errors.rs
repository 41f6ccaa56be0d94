//! # Domain Errors
//!
//! Error types for the Shard Store.

use shared_wire::WireError;
use std::path::PathBuf;
use thiserror::Error;

/// Shard store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Blob exceeds the configured maximum.
    #[error("Blob too large: {size} bytes (max {max})")]
    BlobTooLarge {
        /// Offered size
        size: usize,
        /// Configured maximum
        max: usize,
    },

    /// Reading or writing the backing file failed.
    #[error("Persistence error: {message}")]
    Persistence {
        /// Underlying failure
        message: String,
    },

    /// Another process holds the data file.
    #[error("Data file already in use ({})", path.display())]
    Locked {
        /// Lock file path
        path: PathBuf,
    },

    /// Malformed request on the wire.
    #[error("Wire error: {0}")]
    Wire(#[from] WireError),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Persistence {
            message: e.to_string(),
        }
    }
}

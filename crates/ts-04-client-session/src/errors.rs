//! # Session Errors

use shared_wire::WireError;
use std::path::PathBuf;
use thiserror::Error;

/// Client session error types.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The coordinator could not be reached.
    #[error("Cannot connect to coordinator {address}: {source}")]
    Connect {
        /// Coordinator address as given
        address: String,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// Framing failure on the session stream.
    #[error("Wire error: {0}")]
    Wire(#[from] WireError),

    /// Local file could not be read or written. Nothing was sent.
    #[error("Local file error ({}): {source}", path.display())]
    LocalFile {
        /// Offending path
        path: PathBuf,
        /// Underlying filesystem error
        #[source]
        source: std::io::Error,
    },

    /// Coordinator announced an unusable download length.
    #[error("Invalid download length {declared} (max {max})")]
    InvalidLength {
        /// Length as read from the wire
        declared: i64,
        /// Largest accepted length
        max: u64,
    },

    /// Stream ended before the listing sentinel.
    #[error("Listing ended before the end marker")]
    UnexpectedEndOfListing,
}

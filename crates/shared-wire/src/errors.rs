//! # Wire Errors
//!
//! Failures while encoding or decoding frames.

use std::io;
use thiserror::Error;

/// Errors produced by the framing layer.
#[derive(Debug, Error)]
pub enum WireError {
    /// Underlying stream failure (includes premature end of stream).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// String does not fit the 2-byte length prefix.
    #[error("String too long for wire: {len} bytes (max {max})")]
    StringTooLong {
        /// Encoded byte length
        len: usize,
        /// Largest encodable length
        max: usize,
    },

    /// String frame did not contain valid UTF-8.
    #[error("Invalid UTF-8 in string frame")]
    InvalidUtf8,

    /// Declared length is negative or above the accepted maximum.
    #[error("Invalid declared length {declared} (max {max})")]
    InvalidLength {
        /// Length as read from the wire
        declared: i64,
        /// Largest accepted length
        max: u64,
    },
}

impl WireError {
    /// True when the peer closed the stream before a full frame arrived.
    ///
    /// Used by session loops to tell an orderly disconnect from a fault.
    pub fn is_disconnect(&self) -> bool {
        match self {
            WireError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}

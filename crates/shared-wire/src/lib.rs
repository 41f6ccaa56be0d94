//! # Shared Wire Crate
//!
//! Framing and protocol vocabulary for the Tri-Shard wire formats.
//!
//! ## Frames
//!
//! | Frame | Encoding |
//! |-------|----------|
//! | string | `u16` big-endian byte length, then UTF-8 bytes |
//! | client length | `i64` big-endian (coordinator ⇄ client) |
//! | store length | `i32` big-endian (coordinator ⇄ shard store) |
//! | blob | raw bytes, length given by the preceding length frame |
//!
//! The two length widths are deliberately different: they match the existing
//! deployments on each side of the coordinator.
//!
//! ## Design Principles
//!
//! - **Bounded reads**: every declared length is checked against a caller
//!   supplied maximum before a buffer is allocated.
//! - **Structured outcomes**: status strings are produced and parsed only here;
//!   the rest of the workspace works with enums.

pub mod codec;
pub mod commands;
pub mod errors;
pub mod status;

pub use codec::*;
pub use commands::{ClientCommand, StoreCommand};
pub use errors::WireError;
pub use status::*;

//! # Algorithms Module
//!
//! Partitioning and key derivation.

pub mod key_derivation;
pub mod partition;

pub use key_derivation::derive_key;
pub use partition::{reassemble, shard_sizes, split};

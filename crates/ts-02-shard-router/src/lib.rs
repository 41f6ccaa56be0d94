//! # TS-02 Shard Router
//!
//! Deterministic mapping from a logical file to its three shards.
//!
//! **Subsystem ID:** 02
//! **Architecture:** Pure domain (no I/O)
//!
//! ## Purpose
//!
//! - Partition a byte buffer into three contiguous shards
//!   (`floor(L/3)`, `floor(L/3)`, remainder)
//! - Derive the store key of each shard (`<file>_part1` … `<file>_part3`)
//! - Resolve which shard store owns each shard index
//!
//! ## Module Structure
//!
//! ```text
//! ts-02-shard-router/
//! ├── domain/          # ShardIndex, StoreAddress, RouterError
//! ├── algorithms/      # partition + key derivation
//! └── router.rs        # ShardRouter (configuration-bound routing)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod domain;
pub mod router;

// Re-exports
pub use algorithms::{derive_key, reassemble, shard_sizes, split};
pub use domain::{RouterError, ShardIndex, StoreAddress, SHARD_COUNT};
pub use router::{RouteTarget, ShardPlacement, ShardRouter};

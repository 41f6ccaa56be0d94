//! # TS-01 Shard Store
//!
//! An independent key → blob store holding the shards routed to it.
//!
//! **Subsystem ID:** 01
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Each of the three stores is its own failure domain: it knows nothing about
//! files, the other stores or the coordinator. It serves four requests, one
//! per TCP connection:
//!
//! | Command | Request | Response |
//! |---------|---------|----------|
//! | `store` | key, `i32` length, bytes | none (connection close) |
//! | `retrieve` | key | `i32` length, bytes (0 when absent) |
//! | `ls` | - | `i32` count, keys |
//! | `remove` | key | status string |
//!
//! ## Module Structure
//!
//! ```text
//! ts-01-shard-store/
//! ├── domain/          # StoreConfig, StoreError
//! ├── ports/           # ShardStoreApi (inbound), BlobStore (outbound)
//! ├── adapters/        # in-memory + file-backed blob stores, TCP server
//! └── service.rs       # ShardStoreService
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{FileBackedBlobStore, InMemoryBlobStore, ShardStoreServer};
pub use domain::{StoreConfig, StoreError, DEFAULT_MAX_BLOB_SIZE};
pub use ports::{BlobStore, ShardStoreApi};
pub use service::ShardStoreService;

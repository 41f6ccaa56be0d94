//! # Adapters Layer (Hexagonal Architecture)
//!
//! Blob store implementations, data file locking and the TCP protocol handler.

#[cfg(feature = "locking")]
mod lock;
mod server;
mod storage;

#[cfg(feature = "locking")]
pub use lock::DataFileLock;
pub use server::ShardStoreServer;
pub use storage::{FileBackedBlobStore, InMemoryBlobStore};

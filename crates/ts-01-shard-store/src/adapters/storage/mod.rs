//! Storage Adapters
//!
//! Implementations of the `BlobStore` trait.

mod file;
mod memory;

pub use file::FileBackedBlobStore;
pub use memory::InMemoryBlobStore;

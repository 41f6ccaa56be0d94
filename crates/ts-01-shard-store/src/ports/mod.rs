//! # Ports
//!
//! Inbound API and outbound storage dependency.

pub mod inbound;
pub mod outbound;

pub use inbound::ShardStoreApi;
pub use outbound::BlobStore;

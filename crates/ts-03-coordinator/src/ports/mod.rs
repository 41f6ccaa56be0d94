//! # Ports
//!
//! Inbound coordinator API and the outbound shard store client.

pub mod inbound;
pub mod outbound;

pub use inbound::CoordinatorApi;
pub use outbound::{MockShardStoreClient, ShardStoreClient};

//! # Adapters Layer (Hexagonal Architecture)
//!
//! TCP shard store client and the client session server.

mod session_server;
mod tcp_client;

pub use session_server::SessionServer;
pub use tcp_client::TcpShardStoreClient;

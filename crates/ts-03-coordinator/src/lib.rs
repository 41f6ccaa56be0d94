//! # TS-03 Coordinator
//!
//! Turns whole-file client commands into three shard operations and folds
//! the results back into one answer.
//!
//! **Subsystem ID:** 03
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Data Flow
//!
//! ```text
//! ClientSession ──► SessionServer ──► Coordinator ──► ShardRouter
//!                                          │
//!                       ┌──────────────────┼──────────────────┐
//!                       ▼                  ▼                  ▼
//!                  ShardStore 1       ShardStore 2       ShardStore 3
//! ```
//!
//! ## Aggregation Rules
//!
//! | Operation | Succeeds when |
//! |-----------|---------------|
//! | upload | all three shard writes succeed |
//! | download | all three reads succeed and at least one shard is non-empty |
//! | ls | always; unreachable stores are marked unavailable |
//! | remove | all three stores report the shard deleted |
//!
//! The client only ever sees the aggregate. Per-shard detail is logged and
//! returned in-process as [`OperationReport`].
//!
//! ## Module Structure
//!
//! ```text
//! ts-03-coordinator/
//! ├── domain/          # CoordinatorConfig, FanOutMode, reports, errors
//! ├── ports/           # CoordinatorApi (inbound), ShardStoreClient (outbound)
//! ├── adapters/        # TcpShardStoreClient, SessionServer
//! └── service.rs       # Coordinator
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{SessionServer, TcpShardStoreClient};
pub use domain::{
    CoordinatorConfig, CoordinatorError, DownloadOutcome, FanOutMode, OperationReport,
    ShardClientError, ShardOp, ShardReport, StoreListing, DEFAULT_MAX_FILE_SIZE,
};
pub use ports::{CoordinatorApi, MockShardStoreClient, ShardStoreClient};
pub use service::Coordinator;

/// Coordinator talking to real shard stores.
pub type TcpCoordinator = Coordinator<TcpShardStoreClient>;

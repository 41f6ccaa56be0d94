//! # Tri-Shard Node Runtime
//!
//! Configuration loading and role wiring for the `ts-node` binary.
//!
//! ## Roles
//!
//! ```text
//!              ┌────────────────────────┐
//!  clients ──► │  ts-node coordinator   │  SessionServer + Coordinator
//!              └──────────┬─────────────┘
//!          ┌──────────────┼──────────────┐
//!          ▼              ▼              ▼
//!   ts-node store   ts-node store   ts-node store    ShardStoreServer
//!     (shard 0)       (shard 1)       (shard 2)
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (file, then environment overrides)
//! 2. Validate
//! 3. Initialize telemetry
//! 4. Bind and serve the selected role
//! 5. On ctrl-c, stop accepting and exit

pub mod container;
pub mod runtime;

pub use container::{ConfigError, NodeConfig};
pub use runtime::{NodeRuntime, Role};

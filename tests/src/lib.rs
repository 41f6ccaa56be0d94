//! # Tri-Shard Test Suite
//!
//! Cross-crate tests. Every test here runs real shard stores, a real
//! coordinator and a real client over loopback TCP.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # Cluster fixture: 3 stores + coordinator
//! └── integration/
//!     ├── flows.rs      # Happy-path client flows
//!     ├── failures.rs   # Unreachable stores, partial results
//!     ├── durability.rs # File-backed stores across restarts
//!     └── roundtrip.rs  # Randomised upload/download
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ts-tests
//! cargo test -p ts-tests integration::failures::
//! ```

pub mod harness;
pub mod integration;

pub use harness::{Cluster, StoreNode};

//! # Node Container
//!
//! Configuration and service construction for each role.

pub mod config;

pub use config::{ConfigError, NodeConfig, ServerConfig, StorageConfig, DEFAULT_CONFIG_PATH};

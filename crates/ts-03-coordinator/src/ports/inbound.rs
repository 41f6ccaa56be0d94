//! # Inbound Ports
//!
//! Whole-file operations offered to client sessions.

use crate::domain::{CoordinatorConfig, DownloadOutcome, OperationReport, StoreListing};
use async_trait::async_trait;

/// Coordinator API - inbound port.
///
/// Operations never fail as a whole; every shard outcome is carried in the
/// returned report and the caller decides what reaches the client.
#[async_trait]
pub trait CoordinatorApi: Send + Sync {
    /// Split `bytes` into three shards and store each one.
    async fn upload(&self, file_name: &str, bytes: &[u8]) -> OperationReport;

    /// Fetch all three shards and reassemble them.
    async fn download(&self, file_name: &str) -> DownloadOutcome;

    /// Keys held by each store, in store order.
    async fn list(&self) -> Vec<StoreListing>;

    /// Delete all three shards.
    async fn remove(&self, file_name: &str) -> OperationReport;

    /// Active configuration.
    fn config(&self) -> &CoordinatorConfig;
}

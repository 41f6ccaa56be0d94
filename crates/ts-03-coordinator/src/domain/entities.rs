//! # Domain Entities
//!
//! Configuration and per-shard result types.

use serde::Deserialize;
use std::time::Duration;
use ts_02_shard_router::{ShardIndex, StoreAddress};

/// Default upper bound for one uploaded file (1 GiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;

/// How the three shard calls of one operation are issued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanOutMode {
    /// One shard at a time in index order. Upload and download stop at the
    /// first failed shard.
    Sequential,
    /// All three shards concurrently; every shard is attempted.
    #[default]
    Parallel,
}

/// Coordinator configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Sequential or parallel fan-out.
    pub fan_out: FanOutMode,
    /// Largest upload accepted from a client.
    pub max_file_size: u64,
    /// Bound on each individual shard call. `None` waits indefinitely.
    pub shard_timeout: Option<Duration>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            fan_out: FanOutMode::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            shard_timeout: None,
        }
    }
}

impl CoordinatorConfig {
    /// Config with the given fan-out and defaults elsewhere.
    pub fn with_fan_out(fan_out: FanOutMode) -> Self {
        Self {
            fan_out,
            ..Self::default()
        }
    }

    /// Largest single shard a file within `max_file_size` can produce.
    ///
    /// Shards 1 and 2 hold `floor(n/3)` bytes and shard 3 the rest, so the
    /// last shard is the largest.
    pub fn max_shard_len(&self) -> u64 {
        self.max_file_size - 2 * (self.max_file_size / 3)
    }
}

/// Store command issued for a shard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShardOp {
    /// Write a shard.
    Store,
    /// Read a shard.
    Retrieve,
    /// Enumerate a store.
    List,
    /// Delete a shard.
    Remove,
}

impl ShardOp {
    /// Metric / log label.
    pub fn as_str(self) -> &'static str {
        match self {
            ShardOp::Store => "store",
            ShardOp::Retrieve => "retrieve",
            ShardOp::List => "ls",
            ShardOp::Remove => "remove",
        }
    }
}

/// Result of one shard call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShardReport {
    /// Shard position.
    pub index: ShardIndex,
    /// Derived store key.
    pub key: String,
    /// Store the call went to.
    pub address: StoreAddress,
    /// Reason for failure, `None` on success.
    pub failure: Option<String>,
}

impl ShardReport {
    /// Whether this shard call succeeded.
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Per-shard results of one whole-file operation.
///
/// With sequential fan-out a failed upload or download may hold fewer than
/// three reports; shards after the failure were never attempted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationReport {
    /// Which store command was fanned out.
    pub op: ShardOp,
    /// Reports in shard index order.
    pub shards: Vec<ShardReport>,
}

impl OperationReport {
    /// True iff all three shards were attempted and succeeded.
    pub fn is_success(&self) -> bool {
        self.shards.len() == ts_02_shard_router::SHARD_COUNT
            && self.shards.iter().all(ShardReport::is_success)
    }

    /// Zero-based indices of failed shards.
    pub fn failed_indices(&self) -> Vec<usize> {
        self.shards
            .iter()
            .filter(|report| !report.is_success())
            .map(|report| report.index.get())
            .collect()
    }
}

/// Result of a download fan-in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Reassembled file, `None` when not found or any shard failed.
    pub data: Option<Vec<u8>>,
    /// Per-shard results.
    pub report: OperationReport,
}

/// Keys held by one store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreListing {
    /// One-based position of the store.
    pub ordinal: usize,
    /// Store address.
    pub address: StoreAddress,
    /// Keys in store order, `None` when the store was unreachable.
    pub keys: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(index: usize, failure: Option<&str>) -> ShardReport {
        ShardReport {
            index: ShardIndex::new(index).unwrap(),
            key: format!("f_part{}", index + 1),
            address: StoreAddress::new("127.0.0.1", 5001 + index as u16),
            failure: failure.map(str::to_string),
        }
    }

    #[test]
    fn test_default_fan_out_is_parallel() {
        assert_eq!(CoordinatorConfig::default().fan_out, FanOutMode::Parallel);
    }

    #[test]
    fn test_fan_out_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            fan_out: FanOutMode,
        }
        let parsed: Wrapper = toml::from_str("fan_out = \"sequential\"").unwrap();
        assert_eq!(parsed.fan_out, FanOutMode::Sequential);
    }

    #[test]
    fn test_max_shard_len_is_last_shard_of_largest_file() {
        let shard_len = |max_file_size| {
            CoordinatorConfig {
                max_file_size,
                ..CoordinatorConfig::default()
            }
            .max_shard_len()
        };
        assert_eq!(shard_len(10), 4);
        assert_eq!(shard_len(9), 3);
        assert_eq!(shard_len(0), 0);
    }

    #[test]
    fn test_report_success_needs_all_three() {
        let full = OperationReport {
            op: ShardOp::Store,
            shards: vec![report(0, None), report(1, None), report(2, None)],
        };
        assert!(full.is_success());

        let partial = OperationReport {
            op: ShardOp::Store,
            shards: vec![report(0, None), report(1, Some("refused"))],
        };
        assert!(!partial.is_success());
        assert_eq!(partial.failed_indices(), vec![1]);
    }
}

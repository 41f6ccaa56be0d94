//! Prometheus metrics for Tri-Shard processes.
//!
//! All metrics follow the naming convention: `ts_<area>_<metric>_<unit>`
//!
//! Collectors count from process start whether or not they have been
//! registered; registration only makes them visible to [`encode_metrics`].

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, HistogramVec, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // COORDINATOR METRICS (Subsystem 3)
    // =========================================================================

    /// Per-shard operations issued by the coordinator
    pub static ref SHARD_OPS: IntCounterVec = IntCounterVec::new(
        Opts::new("ts_shard_ops_total", "Shard operations issued by the coordinator"),
        &["op", "outcome"]  // op: store/retrieve/ls/remove, outcome: ok/error
    ).expect("metric creation failed");

    /// Per-shard operation latency
    pub static ref SHARD_OP_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "ts_shard_op_duration_seconds",
            "Time spent on one shard operation"
        ).buckets(exponential_buckets(0.0005, 2.0, 14).expect("valid buckets")),
        &["op"]
    ).expect("metric creation failed");

    /// Client commands received
    pub static ref CLIENT_COMMANDS: IntCounterVec = IntCounterVec::new(
        Opts::new("ts_client_commands_total", "Client commands received"),
        &["command"]
    ).expect("metric creation failed");

    /// File bytes moved between clients and the coordinator
    pub static ref BYTES_TRANSFERRED: IntCounterVec = IntCounterVec::new(
        Opts::new("ts_bytes_transferred_total", "File bytes moved to or from clients"),
        &["direction"]  // direction: upload/download
    ).expect("metric creation failed");

    /// Open client sessions
    pub static ref CLIENT_SESSIONS_ACTIVE: IntGauge = IntGauge::new(
        "ts_client_sessions_active",
        "Number of currently open client sessions"
    ).expect("metric creation failed");

    // =========================================================================
    // SHARD STORE METRICS (Subsystem 1)
    // =========================================================================

    /// Requests served by a shard store
    pub static ref STORE_REQUESTS: IntCounterVec = IntCounterVec::new(
        Opts::new("ts_store_requests_total", "Requests served by the shard store"),
        &["command", "outcome"]
    ).expect("metric creation failed");
}

/// Handle for the registered metrics
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; collectors already registered are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Coordinator
        Box::new(SHARD_OPS.clone()),
        Box::new(SHARD_OP_DURATION.clone()),
        Box::new(CLIENT_COMMANDS.clone()),
        Box::new(BYTES_TRANSFERRED.clone()),
        Box::new(CLIENT_SESSIONS_ACTIVE.clone()),
        // Shard store
        Box::new(STORE_REQUESTS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all registered metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: Histogram) -> Self {
        Self {
            histogram,
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

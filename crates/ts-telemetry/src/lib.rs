//! # TS Telemetry
//!
//! Logging and metrics shared by every Tri-Shard process.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ts_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::for_subsystem("03", "coordinator");
//! let _guard = init_telemetry(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TS_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter directive |
//! | `TS_JSON_LOGS` | `false` (`true` in containers) | JSON formatted logs |
//! | `TS_CONSOLE_OUTPUT` | `true` | Emit logs to stdout |

#![warn(missing_docs)]

mod config;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, MetricsHandle, BYTES_TRANSFERRED,
    CLIENT_COMMANDS, CLIENT_SESSIONS_ACTIVE, SHARD_OPS, SHARD_OP_DURATION, STORE_REQUESTS,
};
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The tracing subscriber could not be installed.
    #[error("Failed to initialize tracing: {0}")]
    TracingInit(String),

    /// A Prometheus collector could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Install logging and register metrics.
///
/// Returns a guard that must be held for the lifetime of the process.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    init_tracing(config)?;
    Ok(TelemetryGuard { _metrics: metrics })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::debug!("Shutting down telemetry");
    }
}

/// Start timing for a labelled histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr, $label:expr) => {
        $crate::metrics::HistogramTimer::new($histogram.with_label_values(&[$label]))
    };
}

//! # ts-node
//!
//! Runs a Tri-Shard coordinator or shard store.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};

use node_runtime::{NodeConfig, NodeRuntime, Role};
use ts_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};

/// Tri-Shard node
#[derive(Parser, Debug)]
#[command(name = "ts-node")]
#[command(about = "Tri-Shard coordinator or shard store")]
struct Args {
    /// Config file (defaults to ./ts-node.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    role: RoleArg,
}

#[derive(Subcommand, Debug)]
enum RoleArg {
    /// Serve client sessions and fan out to the shard stores
    Coordinator {
        /// Override the listening port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Serve one shard store
    Store {
        /// Override the listening port
        #[arg(short, long)]
        port: Option<u16>,

        /// Persist blobs to this file instead of memory
        #[arg(long)]
        data_file: Option<PathBuf>,
    },
}

impl RoleArg {
    fn apply(&self, config: &mut NodeConfig) -> Role {
        match self {
            RoleArg::Coordinator { port } => {
                if let Some(port) = port {
                    config.server.port = *port;
                }
                Role::Coordinator
            }
            RoleArg::Store { port, data_file } => {
                if let Some(port) = port {
                    config.server.port = *port;
                }
                if let Some(path) = data_file {
                    config.storage.data_file = Some(path.clone());
                }
                Role::Store
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config =
        NodeConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    let role = args.role.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    // Initialize logging and metrics
    let (subsystem_id, subsystem_name) = role.subsystem();
    let _telemetry = init_telemetry(&TelemetryConfig::for_subsystem(subsystem_id, subsystem_name))
        .context("Failed to initialize telemetry")?;

    info!("===========================================");
    info!("  Tri-Shard Node v{}", env!("CARGO_PKG_VERSION"));
    info!("  Role: {}", subsystem_name);
    info!("===========================================");

    let runtime = Arc::new(NodeRuntime::new(config));
    let listener = runtime.bind().await?;

    // Ctrl-c flips the shutdown channel; servers stop accepting
    let signal_runtime = Arc::clone(&runtime);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => signal_runtime.shutdown(),
            Err(e) => warn!("Cannot listen for ctrl-c: {}", e),
        }
    });

    info!("Node is running. Press Ctrl+C to stop.");
    runtime.run(role, listener).await?;

    match encode_metrics() {
        Ok(metrics) => debug!("Final metrics:\n{}", metrics),
        Err(e) => warn!("Cannot encode metrics: {}", e),
    }
    info!("Shutdown complete");
    Ok(())
}

//! # Node Runtime
//!
//! Owns the configuration and the shutdown channel, and runs one role until
//! shutdown is signalled.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};
use ts_01_shard_store::{
    BlobStore, FileBackedBlobStore, InMemoryBlobStore, ShardStoreServer, ShardStoreService,
};
use ts_02_shard_router::StoreAddress;
use ts_03_coordinator::{Coordinator, SessionServer, TcpShardStoreClient};

use crate::container::NodeConfig;

/// What this process serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Client sessions and shard fan-out.
    Coordinator,
    /// One shard store.
    Store,
}

impl Role {
    /// Subsystem id and name for telemetry.
    pub fn subsystem(self) -> (&'static str, &'static str) {
        match self {
            Role::Coordinator => ("03", "coordinator"),
            Role::Store => ("01", "shard-store"),
        }
    }
}

/// The node runtime.
pub struct NodeRuntime {
    /// Immutable configuration, shared with every task.
    config: Arc<NodeConfig>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
}

impl NodeRuntime {
    /// Create a runtime for `config`.
    pub fn new(config: NodeConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            config: Arc::new(config),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Bind the configured listening address.
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = self.config.server.addr();
        TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))
    }

    /// Run `role` on `listener` until [`NodeRuntime::shutdown`] is called.
    pub async fn run(&self, role: Role, listener: TcpListener) -> Result<()> {
        match role {
            Role::Coordinator => self.run_coordinator(listener).await,
            Role::Store => self.run_store(listener).await,
        }
    }

    /// Serve client sessions.
    pub async fn run_coordinator(&self, listener: TcpListener) -> Result<()> {
        let router = Arc::new(self.config.router().context("Invalid shard store list")?);
        let coordinator = Arc::new(Coordinator::new(
            router,
            self.config.coordinator.clone(),
            |address| self.shard_client(address),
        ));

        let mut server = SessionServer::new(coordinator);
        if let Some(timeout) = self.config.server.drain_timeout {
            server = server.with_drain_timeout(timeout);
        }
        server
            .serve(listener, self.shutdown_rx.clone())
            .await
            .context("Coordinator stopped with error")
    }

    /// Client for one shard store, bounded by the largest shard an
    /// acceptable upload can produce.
    fn shard_client(&self, address: &StoreAddress) -> TcpShardStoreClient {
        TcpShardStoreClient::new(address.clone())
            .with_max_shard_len(self.config.coordinator.max_shard_len())
    }

    /// Serve one shard store, durable if a data file is configured.
    pub async fn run_store(&self, listener: TcpListener) -> Result<()> {
        match &self.config.storage.data_file {
            Some(path) => {
                let blobs = FileBackedBlobStore::open(path)
                    .with_context(|| format!("Failed to open data file {}", path.display()))?;
                self.serve_store(blobs, listener).await
            }
            None => {
                info!("[ts-01] No data file configured, blobs are kept in memory");
                self.serve_store(InMemoryBlobStore::new(), listener).await
            }
        }
    }

    async fn serve_store<B>(&self, blobs: B, listener: TcpListener) -> Result<()>
    where
        B: BlobStore + 'static,
    {
        let service = Arc::new(ShardStoreService::new(
            blobs,
            self.config.storage.store_config(),
        ));
        let mut server = ShardStoreServer::new(service);
        if let Some(timeout) = self.config.server.drain_timeout {
            server = server.with_drain_timeout(timeout);
        }
        server
            .serve(listener, self.shutdown_rx.clone())
            .await
            .context("Shard store stopped with error")
    }

    /// Signal every server loop to stop accepting and drain.
    pub fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
    }
}

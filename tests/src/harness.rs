//! # Cluster Fixture
//!
//! Starts three shard stores and a coordinator on ephemeral loopback ports.
//! Stores can be stopped individually to simulate an unreachable store.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use ts_01_shard_store::{
    BlobStore, InMemoryBlobStore, ShardStoreApi, ShardStoreServer, ShardStoreService,
    StoreConfig, StoreError,
};
use ts_02_shard_router::{ShardRouter, StoreAddress, SHARD_COUNT};
use ts_03_coordinator::{
    Coordinator, CoordinatorConfig, CoordinatorError, SessionServer, TcpShardStoreClient,
};
use ts_04_client_session::{ClientSession, SessionError};

/// One running shard store.
pub struct StoreNode<B: BlobStore + 'static> {
    /// Where the coordinator reaches this store.
    pub address: StoreAddress,
    /// The store's inventory, for direct inspection.
    pub service: Arc<ShardStoreService<B>>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<Result<(), StoreError>>>,
}

impl<B: BlobStore + 'static> StoreNode<B> {
    /// Serve `blobs` on an ephemeral loopback port.
    pub async fn start(blobs: B) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let local = listener.local_addr()?;
        let service = Arc::new(ShardStoreService::new(blobs, StoreConfig::default()));
        let (shutdown, rx) = watch::channel(false);

        let server = ShardStoreServer::new(Arc::clone(&service));
        let task = tokio::spawn(async move { server.serve(listener, rx).await });

        Ok(Self {
            address: StoreAddress::new(local.ip().to_string(), local.port()),
            service,
            shutdown,
            task: Some(task),
        })
    }

    /// Blob held under `key`, read straight from the inventory.
    pub fn blob(&self, key: &str) -> Option<Vec<u8>> {
        self.service.retrieve(key).ok().flatten()
    }

    /// Keys held by this store.
    pub fn keys(&self) -> Vec<String> {
        self.service.list_keys().unwrap_or_default()
    }

    /// Stop accepting and release the listening port.
    pub async fn stop(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Whether [`StoreNode::stop`] has been called.
    pub fn is_stopped(&self) -> bool {
        self.task.is_none()
    }
}

/// Three shard stores behind one coordinator.
pub struct Cluster<B: BlobStore + 'static = InMemoryBlobStore> {
    /// Stores in shard order.
    pub stores: Vec<StoreNode<B>>,
    coordinator_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<Result<(), CoordinatorError>>>,
}

impl Cluster<InMemoryBlobStore> {
    /// Cluster of volatile stores.
    pub async fn start(config: CoordinatorConfig) -> io::Result<Self> {
        Self::start_with(config, |_| InMemoryBlobStore::new()).await
    }
}

impl<B: BlobStore + 'static> Cluster<B> {
    /// Cluster whose store `i` serves `make(i)`.
    pub async fn start_with<F>(config: CoordinatorConfig, mut make: F) -> io::Result<Self>
    where
        F: FnMut(usize) -> B,
    {
        let mut stores = Vec::with_capacity(SHARD_COUNT);
        for i in 0..SHARD_COUNT {
            stores.push(StoreNode::start(make(i)).await?);
        }

        let addresses = stores.iter().map(|s| s.address.clone()).collect();
        let router = ShardRouter::new(addresses)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
        let max_shard_len = config.max_shard_len();
        let coordinator = Arc::new(Coordinator::new(Arc::new(router), config, |address| {
            TcpShardStoreClient::new(address.clone()).with_max_shard_len(max_shard_len)
        }));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let coordinator_addr = listener.local_addr()?;
        let (shutdown, rx) = watch::channel(false);
        let server = SessionServer::new(coordinator);
        let task = tokio::spawn(async move { server.serve(listener, rx).await });

        Ok(Self {
            stores,
            coordinator_addr,
            shutdown,
            task: Some(task),
        })
    }

    /// Coordinator address clients connect to.
    pub fn coordinator_addr(&self) -> SocketAddr {
        self.coordinator_addr
    }

    /// Open a new client session.
    pub async fn connect(&self) -> Result<ClientSession<TcpStream>, SessionError> {
        ClientSession::connect(self.coordinator_addr).await
    }

    /// Store at shard `index`.
    pub fn store(&self, index: usize) -> &StoreNode<B> {
        &self.stores[index]
    }

    /// Make shard `index`'s store unreachable.
    pub async fn stop_store(&mut self, index: usize) {
        self.stores[index].stop().await;
    }

    /// Stop the coordinator and every store still running.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        for store in &mut self.stores {
            if !store.is_stopped() {
                store.stop().await;
            }
        }
    }
}
